// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/model/context.rs - 推理上下文与模型加载
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

use std::sync::{
  Mutex, MutexGuard, PoisonError,
  atomic::{AtomicUsize, Ordering},
};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
  catalog::FoodLabel,
  frame::FoodTensor,
  model::{FoodModel, InferenceError, ModelHandle, predict},
};

#[derive(Error, Debug)]
pub enum ModelLoadError {
  #[error("模型资源缺失: {0}")]
  MissingResource(String),
  #[error("推理运行时初始化失败: {0}")]
  Runtime(String),
  #[error("模型输出类别数为 {actual}, 类别表为 {expected}")]
  ClassCountMismatch { expected: usize, actual: usize },
  #[error("模型预热失败: {0}")]
  WarmUp(InferenceError),
  #[error("模型不可用（上次加载失败: {0}）")]
  Unavailable(String),
}

/// 从随包资源中构建模型
pub trait ModelLoader: Send + Sync {
  fn load(&self) -> Result<Box<FoodModel>, ModelLoadError>;
}

/// 未配置模型时使用，加载总是失败
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModel;

impl ModelLoader for NoModel {
  fn load(&self) -> Result<Box<FoodModel>, ModelLoadError> {
    Err(ModelLoadError::MissingResource("未配置模型".to_string()))
  }
}

#[derive(Debug, Clone, Default)]
pub enum LoadState {
  #[default]
  Unloaded,
  Ready(ModelHandle),
  Failed(String),
}

/// 持有模型句柄的推理上下文，由宿主构造一次后按引用传入识别流程
pub struct InferenceContext {
  loader: Box<dyn ModelLoader>,
  state: Mutex<LoadState>,
  load_attempts: AtomicUsize,
}

impl InferenceContext {
  pub fn new(loader: impl ModelLoader + 'static) -> Self {
    Self {
      loader: Box::new(loader),
      state: Mutex::new(LoadState::Unloaded),
      load_attempts: AtomicUsize::new(0),
    }
  }

  fn lock(&self) -> MutexGuard<'_, LoadState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// 首次调用时加载并预热模型，之后直接返回缓存的句柄。
  ///
  /// 加载过程中持有锁，并发的首次调用会等待同一次加载完成。
  /// 加载失败后不会自动重试，需显式调用 [`InferenceContext::reload`]。
  pub fn ensure_model_loaded(&self) -> Result<ModelHandle, ModelLoadError> {
    let mut state = self.lock();
    match &*state {
      LoadState::Ready(handle) => return Ok(handle.clone()),
      LoadState::Failed(reason) => return Err(ModelLoadError::Unavailable(reason.clone())),
      LoadState::Unloaded => {}
    }
    self.load_locked(&mut state)
  }

  /// 无论当前状态如何，重新执行一次加载
  pub fn reload(&self) -> Result<ModelHandle, ModelLoadError> {
    let mut state = self.lock();
    warn!("重新加载模型");
    self.load_locked(&mut state)
  }

  /// 查询已加载的句柄，不触发加载
  pub fn handle(&self) -> Option<ModelHandle> {
    match &*self.lock() {
      LoadState::Ready(handle) => Some(handle.clone()),
      _ => None,
    }
  }

  pub fn state(&self) -> LoadState {
    self.lock().clone()
  }

  pub fn is_failed(&self) -> bool {
    matches!(&*self.lock(), LoadState::Failed(_))
  }

  /// 已执行的加载次数
  pub fn load_attempts(&self) -> usize {
    self.load_attempts.load(Ordering::SeqCst)
  }

  fn load_locked(&self, state: &mut LoadState) -> Result<ModelHandle, ModelLoadError> {
    let attempt = self.load_attempts.fetch_add(1, Ordering::SeqCst) + 1;
    info!("加载模型（第 {} 次）", attempt);
    let now = std::time::Instant::now();

    match self.load_and_warm_up() {
      Ok(handle) => {
        info!("模型加载并预热完成，耗时: {:.2?}", now.elapsed());
        *state = LoadState::Ready(handle.clone());
        Ok(handle)
      }
      Err(e) => {
        error!("模型加载失败: {}", e);
        *state = LoadState::Failed(e.to_string());
        Err(e)
      }
    }
  }

  fn load_and_warm_up(&self) -> Result<ModelHandle, ModelLoadError> {
    let handle = ModelHandle::new(self.loader.load()?);

    debug!("使用全零张量预热模型");
    match predict(&handle, FoodTensor::default()) {
      Ok(_) => Ok(handle),
      Err(InferenceError::ShapeMismatch { actual, .. }) => {
        Err(ModelLoadError::ClassCountMismatch {
          expected: FoodLabel::COUNT,
          actual,
        })
      }
      Err(e) => Err(ModelLoadError::WarmUp(e)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Model, ProbabilityVector};
  use std::sync::Arc;
  use std::time::Duration;

  struct Uniform(usize);

  impl Model for Uniform {
    type Input = FoodTensor;
    type Output = ProbabilityVector;
    type Error = InferenceError;

    fn infer(&self, _input: FoodTensor) -> Result<ProbabilityVector, InferenceError> {
      Ok(ProbabilityVector::new(vec![1.0 / self.0 as f32; self.0]))
    }
  }

  struct CountingLoader {
    calls: Arc<AtomicUsize>,
    classes: usize,
    fail: bool,
    delay: Duration,
  }

  impl CountingLoader {
    fn new(classes: usize) -> Self {
      Self {
        calls: Arc::new(AtomicUsize::new(0)),
        classes,
        fail: false,
        delay: Duration::ZERO,
      }
    }
  }

  impl ModelLoader for CountingLoader {
    fn load(&self) -> Result<Box<FoodModel>, ModelLoadError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      std::thread::sleep(self.delay);
      if self.fail {
        return Err(ModelLoadError::MissingResource("model.onnx".into()));
      }
      Ok(Box::new(Uniform(self.classes)))
    }
  }

  #[test]
  fn second_ensure_reuses_the_same_handle() {
    let context = InferenceContext::new(CountingLoader::new(FoodLabel::COUNT));
    assert!(context.handle().is_none());

    let first = context.ensure_model_loaded().unwrap();
    let second = context.ensure_model_loaded().unwrap();
    assert!(first.same_as(&second));
    assert_eq!(context.load_attempts(), 1);
    assert!(context.handle().is_some_and(|h| h.same_as(&first)));
  }

  #[test]
  fn concurrent_first_calls_load_once() {
    let mut loader = CountingLoader::new(FoodLabel::COUNT);
    loader.delay = Duration::from_millis(50);
    let calls = loader.calls.clone();
    let context = InferenceContext::new(loader);

    let handles: Vec<ModelHandle> = std::thread::scope(|s| {
      let workers: Vec<_> = (0..8)
        .map(|_| s.spawn(|| context.ensure_model_loaded().unwrap()))
        .collect();
      workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(context.load_attempts(), 1);
    assert!(handles.iter().all(|h| h.same_as(&handles[0])));
  }

  #[test]
  fn failure_is_sticky_until_reload() {
    let mut loader = CountingLoader::new(FoodLabel::COUNT);
    loader.fail = true;
    let calls = loader.calls.clone();
    let context = InferenceContext::new(loader);

    assert!(matches!(
      context.ensure_model_loaded(),
      Err(ModelLoadError::MissingResource(_))
    ));
    assert!(context.is_failed());
    assert!(matches!(
      context.ensure_model_loaded(),
      Err(ModelLoadError::Unavailable(_))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(context.reload().is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(context.load_attempts(), 2);
  }

  #[test]
  fn no_model_always_fails() {
    let context = InferenceContext::new(NoModel);
    assert!(matches!(
      context.ensure_model_loaded(),
      Err(ModelLoadError::MissingResource(_))
    ));
    assert!(context.is_failed());
  }

  #[test]
  fn class_count_mismatch_is_caught_at_warm_up() {
    let context = InferenceContext::new(CountingLoader::new(101));
    assert!(matches!(
      context.ensure_model_loaded(),
      Err(ModelLoadError::ClassCountMismatch {
        expected: 28,
        actual: 101
      })
    ));
    assert!(matches!(context.state(), LoadState::Failed(_)));
  }
}
