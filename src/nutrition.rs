// 该文件是 Shanshi （膳食） 项目的一部分。
// src/nutrition.rs - 营养量折算与汇总
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;

use serde::Serialize;

use crate::quantity::ResolvedQuantity;
use crate::table::{NutritionTable, UnitKind};

/// 四舍五入到一位小数，0.05 向远离零方向进位
pub fn round1(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

/// 单项食物按确认数量折算后的营养量，各字段已舍入到一位小数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledNutrition {
  pub calories: f64,
  pub protein: f64,
  pub fat: f64,
  pub carbs: f64,
  pub quantity: f64,
  pub unit: UnitKind,
}

/// 整餐营养总量
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionTotal {
  pub calories: f64,
  pub protein: f64,
  pub fat: f64,
  pub carbs: f64,
}

/// 按确认数量折算每项营养并汇总。
/// 总量由未舍入的折算值累加后只舍入一次，
/// 若先逐项舍入再相加，误差会随项数累积。
pub fn compute(
  table: &NutritionTable,
  quantities: &[ResolvedQuantity],
) -> (BTreeMap<String, ScaledNutrition>, NutritionTotal) {
  let mut items = BTreeMap::new();
  let mut total = NutritionTotal::default();

  for entry in quantities {
    let Some(record) = table.get(&entry.name) else {
      continue;
    };

    let scale = record.unit.scale(entry.quantity);
    let calories = record.calories * scale;
    let protein = record.protein * scale;
    let fat = record.fat * scale;
    let carbs = record.carbs * scale;

    total.calories += calories;
    total.protein += protein;
    total.fat += fat;
    total.carbs += carbs;

    items.insert(
      entry.name.clone(),
      ScaledNutrition {
        calories: round1(calories),
        protein: round1(protein),
        fat: round1(fat),
        carbs: round1(carbs),
        quantity: entry.quantity,
        unit: record.unit,
      },
    );
  }

  total.calories = round1(total.calories);
  total.protein = round1(total.protein);
  total.fat = round1(total.fat);
  total.carbs = round1(total.carbs);

  (items, total)
}
