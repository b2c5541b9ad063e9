// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/model/onnx.rs - ONNX 分类模型
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info};
use tract_onnx::prelude::*;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{FoodTensor, MODEL_INPUT_SIZE, RGB_CHANNELS},
  model::{FoodModel, InferenceError, Model, ModelLoadError, ModelLoader, ProbabilityVector},
};

const ONNX_INPUT_SHAPE: [usize; 4] = [
  1,
  MODEL_INPUT_SIZE as usize,
  MODEL_INPUT_SIZE as usize,
  RGB_CHANNELS,
];

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

#[derive(Error, Debug)]
pub enum OnnxError {
  #[error("模型路径必须使用 {expected} 方案, 实际为 {actual}")]
  SchemeMismatch { expected: String, actual: String },
  #[error("模型路径错误: {0}")]
  ModelPathError(#[from] std::string::FromUtf8Error),
  #[error("模型文件不存在: {0}")]
  MissingModel(String),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
}

impl From<OnnxError> for ModelLoadError {
  fn from(err: OnnxError) -> Self {
    match err {
      OnnxError::MissingModel(path) => ModelLoadError::MissingResource(path),
      other => ModelLoadError::Runtime(other.to_string()),
    }
  }
}

pub struct OnnxClassifier {
  plan: OnnxPlan,
  softmax: bool,
}

#[derive(Debug, Clone)]
pub struct OnnxClassifierBuilder {
  model_path: PathBuf,
  softmax: bool,
}

impl FromUrlWithScheme for OnnxClassifierBuilder {
  const SCHEME: &'static str = "onnx";
}

impl FromUrl for OnnxClassifierBuilder {
  type Error = OnnxError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OnnxError::SchemeMismatch {
        expected: Self::SCHEME.to_string(),
        actual: url.scheme().to_string(),
      });
    }

    let softmax = url
      .query_pairs()
      .any(|(k, v)| k == "softmax" && (v == "true" || v == "1"));

    Ok(OnnxClassifierBuilder {
      model_path: PathBuf::from(urlencoding::decode(url.path())?.into_owned()),
      softmax,
    })
  }
}

impl OnnxClassifierBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    Self {
      model_path: model_path.into(),
      softmax: false,
    }
  }

  /// 模型输出未经 softmax 时打开
  pub fn softmax(mut self, softmax: bool) -> Self {
    self.softmax = softmax;
    self
  }

  pub fn build(self) -> Result<OnnxClassifier, OnnxError> {
    info!("加载模型文件: {}", self.model_path.display());
    let metadata = std::fs::metadata(&self.model_path)
      .map_err(|_| OnnxError::MissingModel(self.model_path.display().to_string()))?;
    debug!(
      "模型文件大小: {:.2} MB",
      metadata.len() as f64 / (1024.0 * 1024.0)
    );

    let plan = tract_onnx::onnx()
      .model_for_path(&self.model_path)
      .and_then(|model| model.with_input_fact(0, f32::fact(ONNX_INPUT_SHAPE).into()))
      .and_then(|model| model.into_optimized())
      .and_then(|model| model.into_runnable())
      .map_err(|e| {
        error!("模型解析失败: {:#}", e);
        OnnxError::ModelInvalid(format!("{:#}", e))
      })?;
    info!("模型加载完成");

    Ok(OnnxClassifier {
      plan,
      softmax: self.softmax,
    })
  }
}

impl ModelLoader for OnnxClassifierBuilder {
  fn load(&self) -> Result<Box<FoodModel>, ModelLoadError> {
    let model = self.clone().build()?;
    Ok(Box::new(model))
  }
}

impl OnnxClassifier {
  fn postprocess(&self, outputs: TVec<TValue>) -> Result<ProbabilityVector, InferenceError> {
    let output = outputs
      .first()
      .ok_or_else(|| InferenceError::Runtime("模型没有输出".to_string()))?;
    let view = output
      .to_array_view::<f32>()
      .map_err(|e| InferenceError::Runtime(format!("{:#}", e)))?;
    debug!("模型输出形状: {:?}", view.shape());

    let probs = ProbabilityVector::new(view.iter().copied().collect()).ensure_finite()?;
    if self.softmax {
      Ok(probs.softmax())
    } else {
      Ok(probs)
    }
  }
}

impl Model for OnnxClassifier {
  type Input = FoodTensor;
  type Output = ProbabilityVector;
  type Error = InferenceError;

  fn infer(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
    let batch: Tensor = tract_ndarray::Array4::from_shape_vec(
      (
        ONNX_INPUT_SHAPE[0],
        ONNX_INPUT_SHAPE[1],
        ONNX_INPUT_SHAPE[2],
        ONNX_INPUT_SHAPE[3],
      ),
      input.into_vec(),
    )
    .map_err(|e| InferenceError::Runtime(format!("无法构造输入批次: {}", e)))?
    .into();

    let outputs = self
      .plan
      .run(tvec!(batch.into_tvalue()))
      .map_err(|e| InferenceError::Runtime(format!("{:#}", e)))?;

    self.postprocess(outputs)
  }
}
