// 该文件是 Shanshi （膳食） 项目的一部分。
// src/input/detection_file.rs - 检测结果转储文件的解析
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use crate::detect::DetectBox;

#[derive(Error, Debug)]
pub enum DetectionFileError {
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("line {line}: expected 6 comma separated fields, found {found}")]
  FieldCount { line: usize, found: usize },
  #[error("line {line}: invalid field {field:?}: {reason}")]
  InvalidField {
    line: usize,
    field: String,
    reason: String,
  },
}

fn parse_field<T>(raw: &str, line: usize) -> Result<T, DetectionFileError>
where
  T: FromStr,
  T::Err: Display,
{
  raw.parse().map_err(|err: T::Err| DetectionFileError::InvalidField {
    line,
    field: raw.to_string(),
    reason: err.to_string(),
  })
}

/// 解析检测转储文本。每行六个逗号分隔的字段，依次为
/// 类别编号、置信度与边框坐标 x1, y1, x2, y2；空行跳过。
pub fn parse_detections(text: &str) -> Result<Vec<DetectBox>, DetectionFileError> {
  let mut boxes = Vec::new();

  for (index, raw) in text.lines().enumerate() {
    let line = index + 1;
    let raw = raw.trim();
    if raw.is_empty() {
      continue;
    }

    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() != 6 {
      return Err(DetectionFileError::FieldCount {
        line,
        found: fields.len(),
      });
    }

    let class_id = parse_field::<u32>(fields[0], line)?;
    let confidence = parse_field::<f32>(fields[1], line)?;
    let mut bbox = [0i32; 4];
    for (slot, field) in bbox.iter_mut().zip(&fields[2..]) {
      *slot = parse_field::<i32>(field, line)?;
    }

    boxes.push(DetectBox {
      class_id,
      confidence,
      bbox,
    });
  }

  Ok(boxes)
}

pub fn read_detection_file(path: impl AsRef<Path>) -> Result<Vec<DetectBox>, DetectionFileError> {
  let path = path.as_ref();
  let boxes = parse_detections(&std::fs::read_to_string(path)?)?;
  info!("从 {} 读取 {} 条检测结果", path.display(), boxes.len());
  Ok(boxes)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_lines_and_skips_blanks() {
    let text = "5, 0.90, 10, 20, 110, 220\n\n1, 0.30, 5, 5, 50, 50\n";
    let boxes = parse_detections(text).unwrap();

    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0].class_id, 5);
    assert_eq!(boxes[0].confidence, 0.9);
    assert_eq!(boxes[0].bbox, [10, 20, 110, 220]);
    assert_eq!(boxes[1].class_id, 1);
  }

  #[test]
  fn field_count_error_names_the_line() {
    let text = "5, 0.90, 10, 20, 110, 220\n1, 0.30, 5, 5\n";
    let err = parse_detections(text).unwrap_err();
    match err {
      DetectionFileError::FieldCount { line, found } => {
        assert_eq!(line, 2);
        assert_eq!(found, 4);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn bad_number_error_names_the_field() {
    let text = "5, high, 10, 20, 110, 220\n";
    let err = parse_detections(text).unwrap_err();
    match err {
      DetectionFileError::InvalidField { line, field, .. } => {
        assert_eq!(line, 1);
        assert_eq!(field, "high");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn empty_text_yields_no_boxes() {
    assert!(parse_detections("").unwrap().is_empty());
    assert!(parse_detections("\n  \n").unwrap().is_empty());
  }
}
