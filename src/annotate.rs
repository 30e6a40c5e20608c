// 该文件是 Shanshi （膳食） 项目的一部分。
// src/annotate.rs - 标注场景组装
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use crate::detect::LabeledBox;
use crate::nutrition::NutritionTotal;
use crate::quality::QualityVerdict;
use crate::table::NutritionTable;

/// 单个检测框及其随框文字，第一行为类别与置信度，随后为营养摘要
#[derive(Debug, Clone, PartialEq)]
pub struct BoxAnnotation {
  pub bbox: [i32; 4],
  pub lines: Vec<String>,
}

/// 一张图的全部标注内容。只描述画什么，不关心怎么画，
/// 具体的像素绘制交给输出端。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationScene {
  pub boxes: Vec<BoxAnnotation>,
  pub banner: Vec<String>,
}

impl AnnotationScene {
  /// 由检测框组装场景。参考表之外的类别照样画框，
  /// 营养行退化为占位文字。
  pub fn compose(
    boxes: &[LabeledBox],
    table: &NutritionTable,
    quality: Option<&QualityVerdict>,
  ) -> Self {
    let boxes = boxes
      .iter()
      .map(|item| {
        let mut lines = vec![format!("{} ({:.2})", item.name, item.confidence)];
        match table.get(&item.name) {
          Some(record) => lines.push(format!(
            "{}kcal | P:{}g F:{}g C:{}g",
            record.calories, record.protein, record.fat, record.carbs
          )),
          None => lines.push("Nutritional Info: N/A".to_string()),
        }
        BoxAnnotation {
          bbox: item.bbox,
          lines,
        }
      })
      .collect();

    let banner = quality
      .map(|verdict| {
        vec![format!(
          "Food Quality: {} ({:.2})",
          verdict.label.to_string().to_uppercase(),
          verdict.confidence
        )]
      })
      .unwrap_or_default();

    AnnotationScene { boxes, banner }
  }

  /// 追加总热量横幅，在数量确认完成后调用
  pub fn with_total(mut self, total: &NutritionTotal) -> Self {
    self
      .banner
      .push(format!("Total Calories: {:.1} kcal", total.calories));
    self
  }
}
