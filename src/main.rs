// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use shiwu::{
  FromUrl,
  input::ImageRef,
  model::{InferenceContext, NoModel, OnnxClassifierBuilder},
  recognize::Recognizer,
  task::{OneShotTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("模型文件路径: {:?}", args.model.as_ref().map(|u| u.as_str()));
  info!("输入来源: {:?}", args.input.as_ref().map(|u| u.as_str()));

  let context = match &args.model {
    Some(url) => InferenceContext::new(OnnxClassifierBuilder::from_url(url)?),
    None => InferenceContext::new(NoModel),
  };
  let image = args.input.as_ref().map(ImageRef::from_url).transpose()?;

  let recognizer = Recognizer::new(Arc::new(context), args.recognizer_config());
  let summary = OneShotTask.run_task(&recognizer, image.as_ref())?;

  println!("{}", serde_json::to_string_pretty(&summary)?);

  Ok(())
}
