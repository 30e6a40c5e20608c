// 该文件是 Shanshi （膳食） 项目的一部分。
// src/input/score_file.rs - 品质分类得分文件的解析
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::quality::ClassificationOutcome;

#[derive(Error, Debug)]
pub enum ScoreFileError {
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON error: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 解析品质分类得分，格式为标签到得分的 JSON 对象，
/// 例如 `{"good": 0.93, "stale": 0.07}`。空对象视为无判定。
pub fn parse_scores(text: &str) -> Result<ClassificationOutcome, ScoreFileError> {
  let scores: BTreeMap<String, f32> = serde_json::from_str(text)?;
  Ok(ClassificationOutcome::from_scores(scores))
}

pub fn read_score_file(path: impl AsRef<Path>) -> Result<ClassificationOutcome, ScoreFileError> {
  let path = path.as_ref();
  let outcome = parse_scores(&std::fs::read_to_string(path)?)?;
  info!("从 {} 读取品质得分", path.display());
  Ok(outcome)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn top_score_wins() {
    let outcome = parse_scores(r#"{"good": 0.93, "stale": 0.07}"#).unwrap();
    assert_eq!(
      outcome,
      ClassificationOutcome::Present {
        label: "good".to_string(),
        confidence: 0.93
      }
    );
  }

  #[test]
  fn empty_object_is_absent() {
    let outcome = parse_scores("{}").unwrap();
    assert_eq!(outcome, ClassificationOutcome::Absent);
  }

  #[test]
  fn non_object_input_is_rejected() {
    assert!(parse_scores("[1, 2]").is_err());
    assert!(parse_scores("not json").is_err());
  }
}
