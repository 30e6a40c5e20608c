// 该文件是 Shanshi （膳食） 项目的一部分。
// src/detect.rs - 检测结果聚合
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::table::{ClassMap, NutritionTable};

/// 默认置信度阈值
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// 检测模型输出的单个检测框，坐标为像素值
#[derive(Debug, Clone, PartialEq)]
pub struct DetectBox {
  pub class_id: u32,
  pub confidence: f32,
  pub bbox: [i32; 4], // [x1, y1, x2, y2]
}

/// 已解析类别名的检测框，供标注使用
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledBox {
  pub name: String,
  pub confidence: f32,
  pub bbox: [i32; 4],
}

/// 聚合结果：参考表内各类食物的出现次数，
/// 以及全部过阈值的检测框（含未登记类别，留给标注用）
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
  pub counts: BTreeMap<String, u32>,
  pub boxes: Vec<LabeledBox>,
}

/// 阈值过滤后没有任何可识别的食物
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未检测到可识别的食物")]
pub struct NoFoodDetected;

/// 按置信度阈值过滤检测框并按类别计数。
/// 低于阈值的检测框直接丢弃；过阈值但不在参考表内的
/// 类别（含 Unknown）保留在 `boxes` 中但不参与计数。
pub fn aggregate(
  boxes: &[DetectBox],
  threshold: f32,
  classes: &ClassMap,
  table: &NutritionTable,
) -> Result<Aggregation, NoFoodDetected> {
  let mut aggregation = Aggregation::default();

  for detect in boxes {
    if detect.confidence < threshold {
      debug!(
        "忽略低置信度检测框: 类别 {}, 置信度 {:.2}",
        detect.class_id, detect.confidence
      );
      continue;
    }

    let name = classes.name_or_unknown(detect.class_id);
    aggregation.boxes.push(LabeledBox {
      name: name.to_string(),
      confidence: detect.confidence,
      bbox: detect.bbox,
    });

    if table.contains(name) {
      *aggregation.counts.entry(name.to_string()).or_insert(0) += 1;
    }
  }

  if aggregation.counts.is_empty() {
    return Err(NoFoodDetected);
  }

  debug!(
    "聚合完成: {} 类食物, {} 个检测框",
    aggregation.counts.len(),
    aggregation.boxes.len()
  );

  Ok(aggregation)
}
