// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/task.rs - 识别任务
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

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
  input::{ImageRef, preprocess},
  model::predict,
  rank::top_k,
  recognize::{RecognitionSummary, Recognizer},
};

pub trait Task: Sized {
  type Output;
  type Error;
  fn run_task(self, recognizer: &Recognizer, image: Option<&ImageRef>) -> Result<Self::Output, Self::Error>;
}

pub struct OneShotTask;

impl Task for OneShotTask {
  type Output = RecognitionSummary;
  type Error = anyhow::Error;

  fn run_task(self, recognizer: &Recognizer, image: Option<&ImageRef>) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let now = std::time::Instant::now();
    let summary = recognizer.summarize(image);
    info!(
      "识别完成，耗时: {:.2?}, 总热量: {} 千卡{}",
      now.elapsed(),
      summary.total_calories,
      if summary.simulated { "（模拟）" } else { "" }
    );
    Ok(summary)
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
  pub runs: usize,
  pub mean: Duration,
  pub min: Duration,
  pub max: Duration,
}

/// 对同一张图像重复推理并统计耗时，前两次视为预热不计入
pub struct RepeatShotTask {
  repeat_times: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self { repeat_times: 1000 }
  }
}

impl RepeatShotTask {
  const WARM_RUNS: usize = 2;

  pub fn with_repeat_times(mut self, repeat_times: usize) -> Self {
    self.repeat_times = repeat_times;
    self
  }
}

impl Task for RepeatShotTask {
  type Output = BenchmarkReport;
  type Error = anyhow::Error;

  fn run_task(self, recognizer: &Recognizer, image: Option<&ImageRef>) -> Result<Self::Output, Self::Error> {
    if self.repeat_times <= Self::WARM_RUNS {
      anyhow::bail!("重复次数必须大于 {}", Self::WARM_RUNS);
    }
    let image = image.ok_or_else(|| anyhow::anyhow!("没有输入图像"))?;

    info!("开始任务...");
    let model = recognizer.context().ensure_model_loaded()?;
    let tensor = preprocess(image)?;
    info!("输入图像预处理成功，开始推理...");

    let mut times = Vec::with_capacity(self.repeat_times);
    for i in 0..self.repeat_times {
      let input = tensor.clone();
      let now = std::time::Instant::now();
      let probs = predict(&model, input)?;
      let elapsed = now.elapsed();
      let best = top_k(&probs, 1)?;
      info!("({})推理完成，耗时: {:.2?}, 最佳类别: {:?}", i, elapsed, best.first().map(|c| c.label));
      times.push(elapsed);
    }

    let measured = &times[Self::WARM_RUNS..];
    let report = BenchmarkReport {
      runs: measured.len(),
      mean: measured.iter().sum::<Duration>() / measured.len() as u32,
      min: measured.iter().min().copied().unwrap_or_default(),
      max: measured.iter().max().copied().unwrap_or_default(),
    };
    warn!("平均推理时间: {:.2?}", report.mean);

    Ok(report)
  }
}
