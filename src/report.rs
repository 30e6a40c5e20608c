// 该文件是 Shanshi （膳食） 项目的一部分。
// src/report.rs - 分析报告的组装与校验
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;

use serde::Serialize;

use crate::nutrition::{NutritionTotal, ScaledNutrition};
use crate::quality::QualityVerdict;

/// 单次分析的最终报告，序列化后即对外的 JSON 契约
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub quality: Option<QualityVerdict>,
  #[serde(rename = "nutritional_summary")]
  pub items: BTreeMap<String, ScaledNutrition>,
  pub total: NutritionTotal,
  #[serde(rename = "annotated_image_url", skip_serializing_if = "Option::is_none")]
  pub image_ref: Option<String>,
}

pub fn assemble(
  quality: Option<QualityVerdict>,
  items: BTreeMap<String, ScaledNutrition>,
  total: NutritionTotal,
  image_ref: Option<String>,
) -> Report {
  Report {
    quality,
    items,
    total,
    image_ref,
  }
}

impl Report {
  /// 校验总量与分项之和的偏差是否在容差内。
  /// 分项值各自舍入过一次，总量另行舍入，两边最多差出半个最小刻度。
  pub fn consistent(&self, tolerance: f64) -> bool {
    let mut calories = 0.0;
    let mut protein = 0.0;
    let mut fat = 0.0;
    let mut carbs = 0.0;

    for item in self.items.values() {
      calories += item.calories;
      protein += item.protein;
      fat += item.fat;
      carbs += item.carbs;
    }

    (calories - self.total.calories).abs() <= tolerance
      && (protein - self.total.protein).abs() <= tolerance
      && (fat - self.total.fat).abs() <= tolerance
      && (carbs - self.total.carbs).abs() <= tolerance
  }
}
