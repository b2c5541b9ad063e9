// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/recognize/fallback.rs - 模拟识别
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

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{
  catalog::FoodLabel,
  recognize::{
    DEFAULT_QUANTITY,
    assemble::{FoodItem, SIMULATED_ID_PREFIX, next_item_id},
  },
};

pub const DEFAULT_FALLBACK_COUNT: usize = 2;

/// 模型或图像不可用时生成随机但格式完整的识别结果
#[derive(Debug, Clone)]
pub struct FallbackSimulator<R = StdRng> {
  rng: R,
  quantity: String,
}

impl FallbackSimulator<StdRng> {
  pub fn seeded(seed: u64) -> Self {
    Self::from_rng(StdRng::seed_from_u64(seed))
  }

  pub fn from_entropy() -> Self {
    Self::from_rng(StdRng::from_entropy())
  }
}

impl<R: Rng> FallbackSimulator<R> {
  pub fn from_rng(rng: R) -> Self {
    Self {
      rng,
      quantity: DEFAULT_QUANTITY.to_string(),
    }
  }

  pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
    self.quantity = quantity.into();
    self
  }

  /// 有放回地随机抽取 `count` 个类别，置信度均匀分布在 `[0.5, 1.0]`
  pub fn simulate(&mut self, count: usize) -> Vec<FoodItem> {
    let items: Vec<FoodItem> = (0..count)
      .map(|_| {
        let label = FoodLabel::ALL[self.rng.gen_range(0..FoodLabel::COUNT)];
        let confidence: f32 = self.rng.gen_range(0.5..=1.0);
        FoodItem::new(
          next_item_id(SIMULATED_ID_PREFIX),
          label,
          confidence,
          &self.quantity,
        )
      })
      .collect();
    debug!("模拟识别结果: {:?}", items);
    items
  }
}
