// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/rank.rs - Top-K 排序
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

use std::cmp::Ordering;

use thiserror::Error;

use crate::{catalog::FoodLabel, model::ProbabilityVector};

#[derive(Error, Debug, PartialEq)]
pub enum RankError {
  #[error("参数无效: k = {k}, 分数个数 = {len}")]
  InvalidArgument { k: usize, len: usize },
  #[error("未知类别下标: {0}")]
  UnknownClass(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedClass {
  pub label: FoodLabel,
  pub score: f32,
}

impl RankedClass {
  pub fn index(&self) -> usize {
    self.label.index()
  }
}

// NaN 视为最低分
fn rank_key(score: f32) -> f32 {
  if score.is_nan() { f32::NEG_INFINITY } else { score }
}

/// 按分数降序取前 k 个类别，分数相同时下标小的在前
pub fn top_k(probs: &ProbabilityVector, k: usize) -> Result<Vec<RankedClass>, RankError> {
  let scores = probs.as_slice();
  if k == 0 || k > scores.len() {
    return Err(RankError::InvalidArgument {
      k,
      len: scores.len(),
    });
  }

  let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
  indexed.sort_by(|a, b| match rank_key(b.1).total_cmp(&rank_key(a.1)) {
    Ordering::Equal => a.0.cmp(&b.0),
    other => other,
  });

  indexed
    .into_iter()
    .take(k)
    .map(|(index, score)| {
      FoodLabel::from_index(index)
        .map(|label| RankedClass { label, score })
        .ok_or(RankError::UnknownClass(index))
    })
    .collect()
}
