// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/bin/benchmark_repeatshot.rs - 重复推理性能测试
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use url::Url;

use shiwu::{
  FromUrl,
  input::ImageRef,
  model::{InferenceContext, OnnxClassifierBuilder},
  recognize::{Recognizer, RecognizerConfig},
  task::{RepeatShotTask, Task},
};
use tracing::info;

/// Shiwu 推理性能测试参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型路径
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入图像
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 重复次数
  #[arg(long, default_value_t = 1000, value_name = "TIMES")]
  pub repeat: usize,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);

  let context = InferenceContext::new(OnnxClassifierBuilder::from_url(&args.model)?);
  let image = ImageRef::from_url(&args.input)?;
  let recognizer = Recognizer::new(Arc::new(context), RecognizerConfig::default());

  let report = RepeatShotTask::default()
    .with_repeat_times(args.repeat)
    .run_task(&recognizer, Some(&image))?;

  println!("{}", serde_json::to_string_pretty(&report)?);

  Ok(())
}
