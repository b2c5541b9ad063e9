// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/recognize.rs - 识别流程编排
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

//! 识别流程：预处理 → 确保模型就绪 → 推理 → Top-K → 构造结果。
//!
//! 任一环节失败都会转入模拟识别，调用方总能拿到非空的结果列表。

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  input::{ImageRef, PreprocessError, preprocess},
  model::{InferenceContext, InferenceError, ModelLoadError, predict},
  rank::{RankError, top_k},
};

mod assemble;
mod fallback;

pub use self::assemble::{
  FoodItem, RECOGNIZED_ID_PREFIX, SIMULATED_ID_PREFIX, assemble, format_nutrition, total_calories,
};
pub use self::fallback::{DEFAULT_FALLBACK_COUNT, FallbackSimulator};

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_QUANTITY: &str = "1 serving";

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerConfig {
  /// 真实识别时返回的类别数
  pub top_k: usize,
  /// 模拟识别时返回的条目数
  pub fallback_count: usize,
  pub quantity: String,
  /// 模拟识别的随机种子，`None` 时使用系统熵
  pub seed: Option<u64>,
}

impl Default for RecognizerConfig {
  fn default() -> Self {
    Self {
      top_k: DEFAULT_TOP_K,
      fallback_count: DEFAULT_FALLBACK_COUNT,
      quantity: DEFAULT_QUANTITY.to_string(),
      seed: None,
    }
  }
}

impl RecognizerConfig {
  pub fn with_top_k(mut self, top_k: usize) -> Self {
    self.top_k = top_k;
    self
  }

  pub fn with_fallback_count(mut self, fallback_count: usize) -> Self {
    self.fallback_count = fallback_count;
    self
  }

  pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
    self.quantity = quantity.into();
    self
  }

  pub fn with_seed(mut self, seed: Option<u64>) -> Self {
    self.seed = seed;
    self
  }
}

#[derive(Error, Debug)]
pub enum RecognitionError {
  #[error("预处理错误: {0}")]
  Preprocess(#[from] PreprocessError),
  #[error("模型加载错误: {0}")]
  ModelLoad(#[from] ModelLoadError),
  #[error("推理错误: {0}")]
  Inference(#[from] InferenceError),
  #[error("排序错误: {0}")]
  Rank(#[from] RankError),
}

#[derive(Debug)]
pub enum FallbackReason {
  NoImage,
  ModelUnavailable,
  Pipeline(RecognitionError),
}

impl std::fmt::Display for FallbackReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FallbackReason::NoImage => f.write_str("没有输入图像"),
      FallbackReason::ModelUnavailable => f.write_str("模型不可用"),
      FallbackReason::Pipeline(e) => write!(f, "{}", e),
    }
  }
}

/// 一次识别的结果，区分真实识别与模拟识别
#[derive(Debug)]
pub enum Recognition {
  Recognized(Vec<FoodItem>),
  Simulated {
    items: Vec<FoodItem>,
    reason: FallbackReason,
  },
}

impl Recognition {
  pub fn items(&self) -> &[FoodItem] {
    match self {
      Recognition::Recognized(items) => items.as_slice(),
      Recognition::Simulated { items, .. } => items.as_slice(),
    }
  }

  pub fn into_items(self) -> Vec<FoodItem> {
    match self {
      Recognition::Recognized(items) => items,
      Recognition::Simulated { items, .. } => items,
    }
  }

  pub fn is_simulated(&self) -> bool {
    matches!(self, Recognition::Simulated { .. })
  }
}

/// 供界面展示的识别汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionSummary {
  pub items: Vec<FoodItem>,
  pub total_calories: f32,
  pub simulated: bool,
}

impl From<Recognition> for RecognitionSummary {
  fn from(recognition: Recognition) -> Self {
    let simulated = recognition.is_simulated();
    let items = recognition.into_items();
    Self {
      total_calories: total_calories(&items),
      items,
      simulated,
    }
  }
}

pub struct Recognizer {
  context: Arc<InferenceContext>,
  config: RecognizerConfig,
  simulator: Mutex<FallbackSimulator>,
}

impl Recognizer {
  pub fn new(context: Arc<InferenceContext>, config: RecognizerConfig) -> Self {
    let simulator = match config.seed {
      Some(seed) => FallbackSimulator::seeded(seed),
      None => FallbackSimulator::from_entropy(),
    }
    .with_quantity(config.quantity.clone());

    Self {
      context,
      config,
      simulator: Mutex::new(simulator),
    }
  }

  pub fn context(&self) -> &InferenceContext {
    &self.context
  }

  pub fn config(&self) -> &RecognizerConfig {
    &self.config
  }

  /// 识别图像中的食物，失败时返回模拟结果
  pub fn recognize(&self, image: Option<&ImageRef>) -> Vec<FoodItem> {
    self.recognize_outcome(image).into_items()
  }

  pub fn summarize(&self, image: Option<&ImageRef>) -> RecognitionSummary {
    self.recognize_outcome(image).into()
  }

  pub fn recognize_outcome(&self, image: Option<&ImageRef>) -> Recognition {
    let Some(image) = image else {
      return self.fallback(FallbackReason::NoImage);
    };

    if self.context.is_failed() {
      return self.fallback(FallbackReason::ModelUnavailable);
    }

    let now = std::time::Instant::now();
    match self.run_pipeline(image) {
      Ok(items) => {
        info!("识别完成，耗时: {:.2?}, 结果数: {}", now.elapsed(), items.len());
        Recognition::Recognized(items)
      }
      Err(e) => {
        warn!("识别失败，改用模拟识别: {}", e);
        self.fallback(FallbackReason::Pipeline(e))
      }
    }
  }

  fn run_pipeline(&self, image: &ImageRef) -> Result<Vec<FoodItem>, RecognitionError> {
    debug!("预处理图像: {}", image);
    let tensor = preprocess(image)?;
    let model = self.context.ensure_model_loaded()?;
    let probs = predict(&model, tensor)?;
    let ranked = top_k(&probs, self.config.top_k)?;
    debug!("Top-{} 结果: {:?}", self.config.top_k, ranked);
    Ok(assemble(&ranked, &self.config))
  }

  /// 直接生成模拟结果
  pub fn simulate(&self) -> Vec<FoodItem> {
    let count = self.config.fallback_count.max(1);
    self
      .simulator
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .simulate(count)
  }

  fn fallback(&self, reason: FallbackReason) -> Recognition {
    info!("使用模拟识别: {}", reason);
    Recognition::Simulated {
      items: self.simulate(),
      reason,
    }
  }
}
