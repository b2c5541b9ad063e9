// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/model.rs - 模型
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

use thiserror::Error;
use tracing::{debug, error};

use crate::{catalog::FoodLabel, frame::FoodTensor};

pub trait Model {
  type Input;
  type Output;
  type Error;

  /// 推理会消费输入张量，调用结束后不保留任何中间结果
  fn infer(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 食物分类模型
pub type FoodModel =
  dyn Model<Input = FoodTensor, Output = ProbabilityVector, Error = InferenceError> + Send + Sync;

#[derive(Error, Debug)]
pub enum InferenceError {
  #[error("输出形状不匹配: 期望 {expected}, 实际 {actual}")]
  ShapeMismatch { expected: usize, actual: usize },
  #[error("第 {index} 个输出分数不是有限值: {value}")]
  NonFiniteScore { index: usize, value: f32 },
  #[error("推理运行时错误: {0}")]
  Runtime(String),
}

/// 每个类别一个分数，下标与 [`FoodLabel::ALL`] 对齐
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
  pub fn new(scores: Vec<f32>) -> Self {
    Self(scores)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.0
  }

  /// 第一个 NaN 或无穷大分数的下标与取值
  pub fn first_non_finite(&self) -> Option<(usize, f32)> {
    self
      .0
      .iter()
      .copied()
      .enumerate()
      .find(|(_, v)| !v.is_finite())
  }

  /// 拒绝含 NaN 或无穷大的输出
  pub fn ensure_finite(self) -> Result<Self, InferenceError> {
    match self.first_non_finite() {
      Some((index, value)) => {
        error!("模型输出第 {} 个分数无效: {}", index, value);
        Err(InferenceError::NonFiniteScore { index, value })
      }
      None => Ok(self),
    }
  }

  /// 数值稳定的 softmax，用于模型本身未做归一化的情况。
  ///
  /// 含非有限值或为空时原样返回，由 [`ProbabilityVector::ensure_finite`] 负责拒绝。
  pub fn softmax(mut self) -> Self {
    if self.0.is_empty() || self.first_non_finite().is_some() {
      return self;
    }
    let max = self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for v in self.0.iter_mut() {
      *v = (*v - max).exp();
      sum += *v;
    }
    if sum > 0.0 {
      self.0.iter_mut().for_each(|v| *v /= sum);
    }
    self
  }
}

impl From<Vec<f32>> for ProbabilityVector {
  fn from(scores: Vec<f32>) -> Self {
    Self(scores)
  }
}

/// 已加载模型的共享句柄
#[derive(Clone)]
pub struct ModelHandle {
  model: Arc<FoodModel>,
}

impl ModelHandle {
  pub fn new(model: Box<FoodModel>) -> Self {
    Self {
      model: Arc::from(model),
    }
  }

  pub fn same_as(&self, other: &ModelHandle) -> bool {
    Arc::ptr_eq(&self.model, &other.model)
  }
}

impl std::fmt::Debug for ModelHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ModelHandle")
      .field("model", &Arc::as_ptr(&self.model))
      .finish()
  }
}

/// 对单张图像执行一次前向推理
pub fn predict(model: &ModelHandle, tensor: FoodTensor) -> Result<ProbabilityVector, InferenceError> {
  debug!("执行模型推理");
  let probs = model.model.infer(tensor)?;

  if probs.len() != FoodLabel::COUNT {
    error!(
      "模型输出长度为 {}, 类别表长度为 {}",
      probs.len(),
      FoodLabel::COUNT
    );
    return Err(InferenceError::ShapeMismatch {
      expected: FoodLabel::COUNT,
      actual: probs.len(),
    });
  }

  probs.ensure_finite()
}

mod context;
pub use self::context::{InferenceContext, LoadState, ModelLoadError, ModelLoader, NoModel};

#[cfg(feature = "model_onnx")]
mod onnx;
#[cfg(feature = "model_onnx")]
pub use self::onnx::{OnnxClassifier, OnnxClassifierBuilder, OnnxError};
