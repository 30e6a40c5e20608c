// 该文件是 Shanshi （膳食） 项目的一部分。
// src/table.rs - 营养参考表
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// 未在类别表中登记的类别一律使用该标签
pub const UNKNOWN_LABEL: &str = "Unknown";

/// 食物数量的计量方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
  /// 按克计量，参考值以每 100 克为基准
  Gram,
  /// 按份计量，参考值以每份为基准
  Count,
}

impl UnitKind {
  /// 由确认后的数量得到营养缩放系数
  pub fn scale(&self, quantity: f64) -> f64 {
    match self {
      UnitKind::Count => quantity,
      UnitKind::Gram => quantity / 100.0,
    }
  }
}

/// 单种食物的营养参考值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
  /// 热量（千卡）
  pub calories: f64,
  /// 蛋白质（克）
  pub protein: f64,
  /// 脂肪（克）
  pub fat: f64,
  /// 碳水化合物（克）
  pub carbs: f64,
  /// 计量方式，JSON 中沿用 "type" 键
  #[serde(rename = "type")]
  pub unit: UnitKind,
}

/// 内置营养参考表（按克的以每 100 克计，按份的以每份计）
const BUILTIN_RECORDS: [(&str, NutritionRecord); 7] = [
  (
    "Rice",
    NutritionRecord {
      calories: 200.0,
      protein: 4.0,
      fat: 0.5,
      carbs: 45.0,
      unit: UnitKind::Gram,
    },
  ),
  (
    "Curry",
    NutritionRecord {
      calories: 180.0,
      protein: 5.0,
      fat: 9.0,
      carbs: 20.0,
      unit: UnitKind::Gram,
    },
  ),
  (
    "Chapati",
    NutritionRecord {
      calories: 120.0,
      protein: 3.0,
      fat: 3.0,
      carbs: 20.0,
      unit: UnitKind::Count,
    },
  ),
  (
    "Boiled Egg",
    NutritionRecord {
      calories: 70.0,
      protein: 6.0,
      fat: 5.0,
      carbs: 1.0,
      unit: UnitKind::Count,
    },
  ),
  (
    "Mixed Veg",
    NutritionRecord {
      calories: 150.0,
      protein: 4.0,
      fat: 7.0,
      carbs: 16.0,
      unit: UnitKind::Gram,
    },
  ),
  (
    "Chavvali",
    NutritionRecord {
      calories: 160.0,
      protein: 8.0,
      fat: 2.0,
      carbs: 30.0,
      unit: UnitKind::Gram,
    },
  ),
  (
    "Watana",
    NutritionRecord {
      calories: 140.0,
      protein: 7.0,
      fat: 1.0,
      carbs: 25.0,
      unit: UnitKind::Gram,
    },
  ),
];

#[derive(Error, Debug)]
pub enum TableError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 营养参考表：类别名到参考值的映射。
/// 进程启动时构造一次，之后只读，可放入 Arc 共享。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutritionTable {
  entries: BTreeMap<String, NutritionRecord>,
}

impl NutritionTable {
  /// 内置参考表
  pub fn builtin() -> Self {
    let entries = BUILTIN_RECORDS
      .iter()
      .map(|(name, record)| (name.to_string(), *record))
      .collect();
    NutritionTable { entries }
  }

  /// 从 JSON 文本加载，格式与内置表一致：
  /// `{"Rice": {"calories": 200, "protein": 4, "fat": 0.5, "carbs": 45, "type": "gram"}, ...}`
  pub fn from_json_str(text: &str) -> Result<Self, TableError> {
    let table: NutritionTable = serde_json::from_str(text)?;
    Ok(table)
  }

  /// 从 JSON 文件加载参考表
  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let table = Self::from_json_str(&text)?;
    info!("加载营养参考表: {}, 共 {} 项", path.as_ref().display(), table.len());
    Ok(table)
  }

  pub fn get(&self, name: &str) -> Option<&NutritionRecord> {
    self.entries.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &NutritionRecord)> {
    self.entries.iter()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// 检测模型的类别表：类别编号到类别名
#[derive(Debug, Clone)]
pub struct ClassMap {
  names: Vec<String>,
}

impl ClassMap {
  /// 内置类别表，与内置参考表对应，按字母序排列（训练时的类别顺序）
  pub fn builtin() -> Self {
    let names = [
      "Boiled Egg",
      "Chapati",
      "Chavvali",
      "Curry",
      "Mixed Veg",
      "Rice",
      "Watana",
    ];
    ClassMap {
      names: names.iter().map(|s| s.to_string()).collect(),
    }
  }

  /// 从 JSON 字符串数组加载类别表，下标即类别编号
  pub fn from_json_str(text: &str) -> Result<Self, TableError> {
    let names: Vec<String> = serde_json::from_str(text)?;
    Ok(ClassMap { names })
  }

  /// 从 JSON 文件加载类别表
  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let map = Self::from_json_str(&text)?;
    info!("加载类别表: {}, 共 {} 类", path.as_ref().display(), map.len());
    Ok(map)
  }

  pub fn name_of(&self, class_id: u32) -> Option<&str> {
    self.names.get(class_id as usize).map(String::as_str)
  }

  /// 未登记的类别编号返回 [`UNKNOWN_LABEL`]
  pub fn name_or_unknown(&self, class_id: u32) -> &str {
    self.name_of(class_id).unwrap_or(UNKNOWN_LABEL)
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}
