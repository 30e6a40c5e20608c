// 该文件是 Shanshi （膳食） 项目的一部分。
// src/output/report_record.rs - 报告目录留档输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Utc};
use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::report::Report;
use crate::{FromUrl, FromUrlWithScheme, output::Render};

#[derive(Error, Debug)]
pub enum ReportRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 把每次分析的报告按日期归档到目录树
/// `<目录>/<年>/<月>/<日>/<时-分-秒>-<序号>.json`，
/// 附带标注图时图像与报告同名存放。
pub struct ReportRecordOutput {
  directory: PathBuf,
  compact: bool,
  record_counters: Arc<Mutex<u16>>,
}

impl FromUrlWithScheme for ReportRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for ReportRecordOutput {
  type Error = ReportRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(ReportRecordOutputError::SchemeMismatch);
    }

    let compact = uri.query_pairs().any(|(k, _)| k == "compact");

    Ok(ReportRecordOutput {
      directory: PathBuf::from(uri.path()),
      compact,
      record_counters: Arc::new(Mutex::new(0)),
    })
  }
}

impl ReportRecordOutput {
  fn record_id(&self) -> u16 {
    let mut counter = self.record_counters.lock().unwrap();
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn record_path(&self) -> Result<PathBuf, ReportRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.json",
      now.format("%H-%M-%S"),
      self.record_id()
    )))
  }

  fn write_report(&self, path: &PathBuf, report: &Report) -> Result<(), ReportRecordOutputError> {
    let json = if self.compact {
      serde_json::to_string(report)?
    } else {
      serde_json::to_string_pretty(report)?
    };
    std::fs::write(path, json)?;
    info!("报告留档: {}", path.display());
    Ok(())
  }
}

impl Render<(), Report> for ReportRecordOutput {
  type Error = ReportRecordOutputError;

  fn render_result(&self, _frame: &(), result: &Report) -> Result<(), Self::Error> {
    let path = self.record_path()?;
    self.write_report(&path, result)
  }
}

impl Render<RgbImage, Report> for ReportRecordOutput {
  type Error = ReportRecordOutputError;

  fn render_result(&self, frame: &RgbImage, result: &Report) -> Result<(), Self::Error> {
    let path = self.record_path()?;
    self.write_report(&path, result)?;
    frame.save(path.with_extension("png"))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::nutrition::NutritionTotal;
  use std::collections::BTreeMap;
  use std::path::Path;
  use url::Url;

  fn sample_report() -> Report {
    crate::report::assemble(None, BTreeMap::new(), NutritionTotal::default(), None)
  }

  fn collect_files(dir: &Path, found: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
      for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
          collect_files(&path, found);
        } else {
          found.push(path);
        }
      }
    }
  }

  #[test]
  fn rejects_foreign_scheme() {
    let url = Url::parse("file:/tmp/records").unwrap();
    assert!(matches!(
      ReportRecordOutput::from_url(&url),
      Err(ReportRecordOutputError::SchemeMismatch)
    ));
  }

  #[test]
  fn compact_flag_comes_from_query() {
    let url = Url::parse("folder:/tmp/records?compact").unwrap();
    let output = ReportRecordOutput::from_url(&url).unwrap();
    assert!(output.compact);

    let url = Url::parse("folder:/tmp/records").unwrap();
    let output = ReportRecordOutput::from_url(&url).unwrap();
    assert!(!output.compact);
  }

  #[test]
  fn writes_dated_json_record() {
    let base = std::env::temp_dir().join(format!("shanshi-record-{}", std::process::id()));
    std::fs::remove_dir_all(&base).ok();

    let url = Url::parse(&format!("folder:{}", base.display())).unwrap();
    let output = ReportRecordOutput::from_url(&url).unwrap();
    output.render_result(&(), &sample_report()).unwrap();

    let mut files = Vec::new();
    collect_files(&base, &mut files);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "json");

    let text = std::fs::read_to_string(&files[0]).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(parsed.get("nutritional_summary").is_some());
    assert!(parsed.get("total").is_some());

    std::fs::remove_dir_all(&base).ok();
  }

  #[test]
  fn image_record_shares_the_stem() {
    let base = std::env::temp_dir().join(format!("shanshi-record-img-{}", std::process::id()));
    std::fs::remove_dir_all(&base).ok();

    let url = Url::parse(&format!("folder:{}", base.display())).unwrap();
    let output = ReportRecordOutput::from_url(&url).unwrap();
    let image = RgbImage::new(8, 8);
    output.render_result(&image, &sample_report()).unwrap();

    let mut files = Vec::new();
    collect_files(&base, &mut files);
    files.sort();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].with_extension(""), files[1].with_extension(""));

    std::fs::remove_dir_all(&base).ok();
  }
}
