// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/catalog.rs - 食物类别与营养成分表
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

//! 模型可识别的食物类别。
//!
//! 类别顺序与随包发布的模型输出维度一一对应，更换模型时必须同步更新本表。

use serde::Serialize;

/// 每份食物的营养成分
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutritionFacts {
  /// 热量（千卡）
  pub calories: f32,
  /// 蛋白质（克）
  pub protein: f32,
  /// 碳水化合物（克）
  pub carbs: f32,
  /// 脂肪（克）
  pub fat: f32,
}

const fn facts(calories: f32, protein: f32, carbs: f32, fat: f32) -> NutritionFacts {
  NutritionFacts {
    calories,
    protein,
    carbs,
    fat,
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FoodLabel {
  Apple,
  Banana,
  Bread,
  Broccoli,
  Pizza,
  Cake,
  Carrot,
  Cheese,
  Chicken,
  Coffee,
  Fish,
  Egg,
  FrenchFries,
  Grapes,
  IceCream,
  Milk,
  Orange,
  Pasta,
  Burger,
  Potato,
  Rice,
  Salad,
  Sandwich,
  Steak,
  Sushi,
  Tomato,
  Water,
  Yogurt,
}

impl FoodLabel {
  pub const COUNT: usize = 28;

  /// 按模型输出顺序排列的全部类别
  pub const ALL: [FoodLabel; Self::COUNT] = [
    FoodLabel::Apple,
    FoodLabel::Banana,
    FoodLabel::Bread,
    FoodLabel::Broccoli,
    FoodLabel::Pizza,
    FoodLabel::Cake,
    FoodLabel::Carrot,
    FoodLabel::Cheese,
    FoodLabel::Chicken,
    FoodLabel::Coffee,
    FoodLabel::Fish,
    FoodLabel::Egg,
    FoodLabel::FrenchFries,
    FoodLabel::Grapes,
    FoodLabel::IceCream,
    FoodLabel::Milk,
    FoodLabel::Orange,
    FoodLabel::Pasta,
    FoodLabel::Burger,
    FoodLabel::Potato,
    FoodLabel::Rice,
    FoodLabel::Salad,
    FoodLabel::Sandwich,
    FoodLabel::Steak,
    FoodLabel::Sushi,
    FoodLabel::Tomato,
    FoodLabel::Water,
    FoodLabel::Yogurt,
  ];

  pub fn index(self) -> usize {
    self as usize
  }

  pub fn from_index(index: usize) -> Option<Self> {
    Self::ALL.get(index).copied()
  }

  pub fn as_str(self) -> &'static str {
    match self {
      FoodLabel::Apple => "apple",
      FoodLabel::Banana => "banana",
      FoodLabel::Bread => "bread",
      FoodLabel::Broccoli => "broccoli",
      FoodLabel::Pizza => "pizza",
      FoodLabel::Cake => "cake",
      FoodLabel::Carrot => "carrot",
      FoodLabel::Cheese => "cheese",
      FoodLabel::Chicken => "chicken",
      FoodLabel::Coffee => "coffee",
      FoodLabel::Fish => "fish",
      FoodLabel::Egg => "egg",
      FoodLabel::FrenchFries => "french_fries",
      FoodLabel::Grapes => "grapes",
      FoodLabel::IceCream => "ice_cream",
      FoodLabel::Milk => "milk",
      FoodLabel::Orange => "orange",
      FoodLabel::Pasta => "pasta",
      FoodLabel::Burger => "burger",
      FoodLabel::Potato => "potato",
      FoodLabel::Rice => "rice",
      FoodLabel::Salad => "salad",
      FoodLabel::Sandwich => "sandwich",
      FoodLabel::Steak => "steak",
      FoodLabel::Sushi => "sushi",
      FoodLabel::Tomato => "tomato",
      FoodLabel::Water => "water",
      FoodLabel::Yogurt => "yogurt",
    }
  }

  /// 界面显示用的本地化名称
  pub fn localized_name(self) -> &'static str {
    match self {
      FoodLabel::Apple => "Яблоко",
      FoodLabel::Banana => "Банан",
      FoodLabel::Bread => "Хлеб",
      FoodLabel::Broccoli => "Брокколи",
      FoodLabel::Pizza => "Пицца",
      FoodLabel::Cake => "Торт",
      FoodLabel::Carrot => "Морковь",
      FoodLabel::Cheese => "Сыр",
      FoodLabel::Chicken => "Курица",
      FoodLabel::Coffee => "Кофе",
      FoodLabel::Fish => "Рыба",
      FoodLabel::Egg => "Яйцо",
      FoodLabel::FrenchFries => "Картофель фри",
      FoodLabel::Grapes => "Виноград",
      FoodLabel::IceCream => "Мороженое",
      FoodLabel::Milk => "Молоко",
      FoodLabel::Orange => "Апельсин",
      FoodLabel::Pasta => "Паста",
      FoodLabel::Burger => "Бургер",
      FoodLabel::Potato => "Картофель",
      FoodLabel::Rice => "Рис",
      FoodLabel::Salad => "Салат",
      FoodLabel::Sandwich => "Сэндвич",
      FoodLabel::Steak => "Стейк",
      FoodLabel::Sushi => "Суши",
      FoodLabel::Tomato => "Помидор",
      FoodLabel::Water => "Вода",
      FoodLabel::Yogurt => "Йогурт",
    }
  }

  pub fn nutrition(self) -> NutritionFacts {
    match self {
      FoodLabel::Apple => facts(95.0, 0.5, 25.0, 0.3),
      FoodLabel::Banana => facts(105.0, 1.3, 27.0, 0.4),
      FoodLabel::Bread => facts(265.0, 9.0, 49.0, 3.2),
      FoodLabel::Broccoli => facts(55.0, 3.7, 11.2, 0.6),
      FoodLabel::Pizza => facts(285.0, 12.0, 36.0, 10.0),
      FoodLabel::Cake => facts(340.0, 5.0, 55.0, 12.0),
      FoodLabel::Carrot => facts(50.0, 1.2, 12.0, 0.3),
      FoodLabel::Cheese => facts(402.0, 25.0, 2.4, 33.0),
      FoodLabel::Chicken => facts(239.0, 27.0, 0.0, 14.0),
      FoodLabel::Coffee => facts(2.0, 0.3, 0.0, 0.0),
      FoodLabel::Fish => facts(206.0, 22.0, 0.0, 12.0),
      FoodLabel::Egg => facts(155.0, 13.0, 1.1, 11.0),
      FoodLabel::FrenchFries => facts(365.0, 4.0, 48.0, 17.0),
      FoodLabel::Grapes => facts(69.0, 0.6, 18.0, 0.2),
      FoodLabel::IceCream => facts(207.0, 3.5, 24.0, 11.0),
      FoodLabel::Milk => facts(149.0, 8.0, 12.0, 8.0),
      FoodLabel::Orange => facts(62.0, 1.2, 15.0, 0.2),
      FoodLabel::Pasta => facts(158.0, 6.0, 31.0, 0.9),
      FoodLabel::Burger => facts(540.0, 25.0, 40.0, 29.0),
      FoodLabel::Potato => facts(161.0, 4.3, 37.0, 0.2),
      FoodLabel::Rice => facts(130.0, 2.7, 28.0, 0.3),
      FoodLabel::Salad => facts(152.0, 1.2, 3.3, 15.0),
      FoodLabel::Sandwich => facts(290.0, 15.0, 29.0, 13.0),
      FoodLabel::Steak => facts(271.0, 26.0, 0.0, 19.0),
      FoodLabel::Sushi => facts(349.0, 7.8, 71.0, 0.6),
      FoodLabel::Tomato => facts(18.0, 0.9, 3.9, 0.2),
      FoodLabel::Water => facts(0.0, 0.0, 0.0, 0.0),
      FoodLabel::Yogurt => facts(150.0, 12.0, 17.0, 3.8),
    }
  }
}

impl std::fmt::Display for FoodLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn index_round_trips_through_all() {
    for (i, label) in FoodLabel::ALL.iter().enumerate() {
      assert_eq!(label.index(), i);
      assert_eq!(FoodLabel::from_index(i), Some(*label));
    }
    assert_eq!(FoodLabel::from_index(FoodLabel::COUNT), None);
  }

  #[test]
  fn fixed_positions_match_bundled_model() {
    assert_eq!(FoodLabel::from_index(0), Some(FoodLabel::Apple));
    assert_eq!(FoodLabel::from_index(4), Some(FoodLabel::Pizza));
    assert_eq!(FoodLabel::from_index(10), Some(FoodLabel::Fish));
  }

  #[test]
  fn nutrition_is_non_negative_and_water_is_the_only_zero_calorie_class() {
    let mut zero_calorie = Vec::new();
    for label in FoodLabel::ALL {
      let n = label.nutrition();
      assert!(n.calories >= 0.0 && n.protein >= 0.0 && n.carbs >= 0.0 && n.fat >= 0.0);
      if n.calories == 0.0 {
        zero_calorie.push(label);
      }
    }
    assert_eq!(zero_calorie, vec![FoodLabel::Water]);
  }

  #[test]
  fn label_strings_are_unique() {
    let mut names: Vec<_> = FoodLabel::ALL.iter().map(|l| l.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), FoodLabel::COUNT);
    assert_eq!(FoodLabel::from_index(12).map(|l| l.to_string()), Some("french_fries".to_string()));
  }
}
