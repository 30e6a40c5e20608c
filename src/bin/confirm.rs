// 该文件是 Shanshi （膳食） 项目的一部分。
// src/bin/confirm.rs - 交互式两阶段分析
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use shanshi::{
  FromUrl,
  input::{ImageFileInput, read_detection_file, read_score_file},
  output::{Render, ReportRecordOutput, SaveImageFileOutput},
  pipeline::{Pipeline, PipelineOptions},
  quality::ClassificationOutcome,
  table::{ClassMap, NutritionTable, UnitKind},
};

/// 先展示检测结果与默认数量，逐项确认后给出营养报告
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测结果转储文件路径
  #[arg(long, value_name = "FILE")]
  pub detections: PathBuf,

  /// 品质分类得分 JSON 文件路径
  #[arg(long, value_name = "FILE")]
  pub quality: Option<PathBuf>,

  /// 营养参考表 JSON 文件路径（缺省使用内置表）
  #[arg(long, value_name = "FILE")]
  pub table: Option<PathBuf>,

  /// 类别名称表 JSON 文件路径（缺省使用内置表）
  #[arg(long, value_name = "FILE")]
  pub classes: Option<PathBuf>,

  /// 待标注的原始图像来源
  #[arg(long, value_name = "SOURCE")]
  pub image: Option<Url>,

  /// 标注图像输出位置
  #[arg(long, value_name = "OUTPUT")]
  pub annotated: Option<Url>,

  /// 报告留档目录
  #[arg(long, value_name = "OUTPUT")]
  pub report: Option<Url>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

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
    persist_report: args.report.is_some(),
    ..PipelineOptions::default()
  };
  let pipeline = Pipeline::with_options(table, classes, options);

  let analysis = pipeline.analyze(&boxes, &outcome)?;

  println!("检测到的食物:");
  for (name, count) in &analysis.counts {
    println!("  {name} x{count}");
  }
  if let Some(verdict) = &analysis.quality {
    println!("品质判定: {} ({:.2})", verdict.label, verdict.confidence);
  }

  let annotated_sink = args
    .annotated
    .as_ref()
    .map(SaveImageFileOutput::from_url)
    .transpose()?;
  let image_ref = annotated_sink.as_ref().map(|sink| sink.path().to_string());

  // 阶段一预览图，确认数量时可以对照着看
  let image = match &annotated_sink {
    Some(sink) => {
      let source = args
        .image
        .as_ref()
        .context("保存标注图需要同时提供 --image")?;
      let image = ImageFileInput::from_url(source)?.into_rgb();
      sink.render_result(&image, &analysis.scene)?;
      println!("标注预览已保存: {}", sink.path());
      Some(image)
    }
    None => None,
  };

  // 逐项确认，直接回车保留默认值
  let mut submitted = BTreeMap::new();
  let stdin = std::io::stdin();
  for (name, default) in &analysis.proposal {
    let unit = pipeline
      .table()
      .get(name)
      .map(|record| match record.unit {
        UnitKind::Gram => "克",
        UnitKind::Count => "份",
      })
      .unwrap_or("");
    print!("{name}（{unit}）数量 [默认 {default}]: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    stdin.read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
      submitted.insert(name.clone(), default.to_string());
    } else {
      submitted.insert(name.clone(), trimmed.to_string());
    }
  }

  let quantities = pipeline.resolve(&submitted);
  let report = pipeline.finish(&quantities, analysis.quality, image_ref);
  let scene = analysis.scene.clone().with_total(&report.total);

  if let (Some(sink), Some(image)) = (&annotated_sink, &image) {
    sink.render_result(image, &scene)?;
    println!("最终标注图已保存: {}", sink.path());
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
