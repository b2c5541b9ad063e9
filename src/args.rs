// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use url::Url;

use shiwu::recognize::{DEFAULT_FALLBACK_COUNT, DEFAULT_QUANTITY, DEFAULT_TOP_K, RecognizerConfig};

/// Shiwu 食物识别参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型路径，例如 onnx:///opt/models/food.onnx?softmax=true
  /// 未指定时只使用模拟识别
  #[arg(long, value_name = "MODEL")]
  pub model: Option<Url>,

  /// 输入图像，例如 image:///tmp/meal.jpg 或 file:///tmp/meal.png
  #[arg(long, value_name = "SOURCE")]
  pub input: Option<Url>,

  /// 返回的识别结果数
  #[arg(long, default_value_t = DEFAULT_TOP_K, value_name = "K")]
  pub top_k: usize,

  /// 模拟识别时返回的条目数
  #[arg(long, default_value_t = DEFAULT_FALLBACK_COUNT, value_name = "COUNT")]
  pub fallback_count: usize,

  /// 每条结果的份量描述
  #[arg(long, default_value = DEFAULT_QUANTITY, value_name = "TEXT")]
  pub quantity: String,

  /// 模拟识别的随机种子
  #[arg(long, value_name = "SEED")]
  pub seed: Option<u64>,
}

impl Args {
  pub fn recognizer_config(&self) -> RecognizerConfig {
    RecognizerConfig::default()
      .with_top_k(self.top_k)
      .with_fallback_count(self.fallback_count)
      .with_quantity(self.quantity.clone())
      .with_seed(self.seed)
  }
}
