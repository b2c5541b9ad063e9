// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/recognize/assemble.rs - 识别结果构造
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

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;

use crate::{catalog::FoodLabel, rank::RankedClass, recognize::RecognizerConfig};

pub const RECOGNIZED_ID_PREFIX: &str = "recognized";
pub const SIMULATED_ID_PREFIX: &str = "simulated";

static ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_item_id(prefix: &str) -> String {
  let seq = ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
  format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), seq)
}

/// 识别出的一份食物
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodItem {
  pub id: String,
  pub label: FoodLabel,
  pub name: String,
  pub calories: f32,
  pub protein: f32,
  pub carbs: f32,
  pub fat: f32,
  pub quantity: String,
  pub confidence: f32,
}

impl FoodItem {
  pub(crate) fn new(id: String, label: FoodLabel, confidence: f32, quantity: &str) -> Self {
    let nutrition = label.nutrition();
    Self {
      id,
      label,
      name: label.localized_name().to_string(),
      calories: nutrition.calories,
      protein: nutrition.protein,
      carbs: nutrition.carbs,
      fat: nutrition.fat,
      quantity: quantity.to_string(),
      confidence,
    }
  }

  pub fn is_simulated(&self) -> bool {
    self.id.starts_with(SIMULATED_ID_PREFIX)
  }
}

/// 按排序结果依次生成带营养信息的食物记录
pub fn assemble(ranked: &[RankedClass], config: &RecognizerConfig) -> Vec<FoodItem> {
  ranked
    .iter()
    .map(|class| {
      FoodItem::new(
        next_item_id(RECOGNIZED_ID_PREFIX),
        class.label,
        class.score,
        &config.quantity,
      )
    })
    .collect()
}

pub fn total_calories(items: &[FoodItem]) -> f32 {
  items.iter().map(|item| item.calories).sum()
}

/// 保留一位小数
pub fn format_nutrition(value: f32) -> String {
  format!("{:.1}", value)
}
