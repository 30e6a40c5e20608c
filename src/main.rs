// 该文件是 Shanshi （膳食） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use shanshi::{
  FromUrl,
  input::{ImageFileInput, read_detection_file, read_score_file},
  output::{Render, ReportRecordOutput, SaveImageFileOutput},
  pipeline::{Pipeline, PipelineOptions},
  quality::ClassificationOutcome,
  quantity,
  table::{ClassMap, NutritionTable},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("检测结果文件: {}", args.detections.display());
  info!("置信度阈值: {}", args.confidence);

  let table = match &args.table {
    Some(path) => NutritionTable::from_json_file(path)
      .with_context(|| format!("无法加载营养参考表 {}", path.display()))?,
    None => NutritionTable::builtin(),
  };
  let classes = match &args.classes {
    Some(path) => ClassMap::from_json_file(path)
      .with_context(|| format!("无法加载类别表 {}", path.display()))?,
    None => ClassMap::builtin(),
  };

  let boxes = read_detection_file(&args.detections)
    .with_context(|| format!("无法读取检测结果 {}", args.detections.display()))?;
  let outcome = match &args.quality {
    Some(path) => read_score_file(path)
      .with_context(|| format!("无法读取品质得分 {}", path.display()))?,
    None => ClassificationOutcome::Absent,
  };

  let options = PipelineOptions {
    confidence_threshold: args.confidence,
    include_quality: !args.skip_quality,
    persist_report: args.report.is_some(),
  };
  let pipeline = Pipeline::with_options(table, classes, options);

  let analysis = pipeline.analyze(&boxes, &outcome)?;

  let annotated_sink = args
    .annotated
    .as_ref()
    .map(SaveImageFileOutput::from_url)
    .transpose()?;
  let image_ref = annotated_sink.as_ref().map(|sink| sink.path().to_string());

  // 数量全部采用默认值，需要逐项确认时用 shanshi-confirm
  let quantities = quantity::accept_proposal(&analysis.proposal);
  let report = pipeline.finish(&quantities, analysis.quality, image_ref);
  let scene = analysis.scene.with_total(&report.total);

  if let Some(sink) = &annotated_sink {
    let source = args
      .image
      .as_ref()
      .context("保存标注图需要同时提供 --image")?;
    let image = ImageFileInput::from_url(source)?.into_rgb();
    sink.render_result(&image, &scene)?;
  }

  println!("{}", serde_json::to_string_pretty(&report)?);

  if pipeline.options().persist_report
    && let Some(url) = &args.report
  {
    let record = ReportRecordOutput::from_url(url)?;
    record.render_result(&(), &report)?;
  }

  Ok(())
}
