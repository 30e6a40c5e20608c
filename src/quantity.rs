// 该文件是 Shanshi （膳食） 项目的一部分。
// src/quantity.rs - 两阶段数量确认
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;

use tracing::warn;

use crate::table::{NutritionTable, UnitKind};

/// 按克计量的食物默认按 100 克估算
pub const DEFAULT_GRAMS: f64 = 100.0;

/// 确认后的数量，`name` 必然存在于参考表中，`quantity` 为非负有限值
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuantity {
  pub name: String,
  pub quantity: f64,
}

/// 阶段一：由聚合计数给出默认数量，交调用方展示与修改。
/// 按份计量的默认为检测到的个数，按克计量的一律默认 100 克，
/// 检测个数只是粗略线索，对重量没有参考意义。
pub fn propose(table: &NutritionTable, counts: &BTreeMap<String, u32>) -> BTreeMap<String, f64> {
  counts
    .iter()
    .filter_map(|(name, count)| {
      let record = table.get(name)?;
      let quantity = match record.unit {
        UnitKind::Count => *count as f64,
        UnitKind::Gram => DEFAULT_GRAMS,
      };
      Some((name.clone(), quantity))
    })
    .collect()
}

/// 不经修改直接采纳阶段一的默认数量
pub fn accept_proposal(proposal: &BTreeMap<String, f64>) -> Vec<ResolvedQuantity> {
  proposal
    .iter()
    .map(|(name, quantity)| ResolvedQuantity {
      name: name.clone(),
      quantity: *quantity,
    })
    .collect()
}

/// 阶段二：合并调用方提交的原始数量字符串。
/// 只处理参考表内且在提交表中出现的类别；解析失败、空白
/// 或为负的值整项跳过，单个字段填错不应拖垮整次计算。
pub fn resolve(
  table: &NutritionTable,
  submitted: &BTreeMap<String, String>,
) -> Vec<ResolvedQuantity> {
  let mut resolved = Vec::new();

  for (name, _) in table.iter() {
    let Some(raw) = submitted.get(name) else {
      continue;
    };

    match raw.trim().parse::<f64>() {
      Ok(quantity) if quantity.is_finite() && quantity >= 0.0 => {
        resolved.push(ResolvedQuantity {
          name: name.clone(),
          quantity,
        });
      }
      _ => {
        warn!("忽略无效数量: {} = {:?}", name, raw);
      }
    }
  }

  resolved
}
