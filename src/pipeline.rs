// 该文件是 Shanshi （膳食） 项目的一部分。
// src/pipeline.rs - 分析流程编排
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::annotate::AnnotationScene;
use crate::detect::{self, DetectBox, NoFoodDetected};
use crate::nutrition;
use crate::quality::{self, ClassificationOutcome, QualityVerdict};
use crate::quantity::{self, ResolvedQuantity};
use crate::report::{self, Report};
use crate::table::{ClassMap, NutritionTable};

/// 分项和与总量允许的最大偏差
const TOTAL_TOLERANCE: f64 = 0.1;

/// 流程可调参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
  /// 低于该置信度的检测框整个丢弃
  pub confidence_threshold: f32,
  /// 是否在报告中给出品质判定
  pub include_quality: bool,
  /// 是否要求调用方落盘留档
  pub persist_report: bool,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    PipelineOptions {
      confidence_threshold: detect::DEFAULT_CONFIDENCE_THRESHOLD,
      include_quality: true,
      persist_report: false,
    }
  }
}

/// 阶段一的分析结果，等待数量确认
#[derive(Debug, Clone)]
pub struct Analysis {
  /// 参考表内各类食物的检出个数
  pub counts: BTreeMap<String, u32>,
  /// 各类食物的默认数量，可被阶段二覆盖
  pub proposal: BTreeMap<String, f64>,
  pub quality: Option<QualityVerdict>,
  /// 未含总热量横幅的标注场景
  pub scene: AnnotationScene,
}

/// 从检测结果到营养报告的完整流程。
/// 构造后内部状态不再变化，可以随意在线程间共享。
#[derive(Debug, Clone)]
pub struct Pipeline {
  table: Arc<NutritionTable>,
  classes: Arc<ClassMap>,
  options: PipelineOptions,
}

impl Pipeline {
  pub fn new(table: NutritionTable, classes: ClassMap) -> Self {
    Self::with_options(table, classes, PipelineOptions::default())
  }

  pub fn with_options(table: NutritionTable, classes: ClassMap, options: PipelineOptions) -> Self {
    Pipeline {
      table: Arc::new(table),
      classes: Arc::new(classes),
      options,
    }
  }

  pub fn table(&self) -> &NutritionTable {
    &self.table
  }

  pub fn options(&self) -> &PipelineOptions {
    &self.options
  }

  /// 阶段一：聚合检测框、判定品质并给出默认数量
  pub fn analyze(
    &self,
    boxes: &[DetectBox],
    outcome: &ClassificationOutcome,
  ) -> Result<Analysis, NoFoodDetected> {
    let aggregation = detect::aggregate(
      boxes,
      self.options.confidence_threshold,
      &self.classes,
      &self.table,
    )?;
    info!("识别到 {} 类食物", aggregation.counts.len());

    let quality = self
      .options
      .include_quality
      .then(|| quality::assess(outcome));
    let proposal = quantity::propose(&self.table, &aggregation.counts);
    let scene = AnnotationScene::compose(&aggregation.boxes, &self.table, quality.as_ref());

    Ok(Analysis {
      counts: aggregation.counts,
      proposal,
      quality,
      scene,
    })
  }

  /// 阶段二：解析调用方提交的数量修正
  pub fn resolve(&self, submitted: &BTreeMap<String, String>) -> Vec<ResolvedQuantity> {
    quantity::resolve(&self.table, submitted)
  }

  /// 按确认数量折算营养并组装报告
  pub fn finish(
    &self,
    quantities: &[ResolvedQuantity],
    quality: Option<QualityVerdict>,
    image_ref: Option<String>,
  ) -> Report {
    let (items, total) = nutrition::compute(&self.table, quantities);
    info!("合计热量 {:.1} kcal", total.calories);

    let report = report::assemble(quality, items, total, image_ref);
    if !report.consistent(TOTAL_TOLERANCE) {
      warn!("分项之和与总量的偏差超出 {TOTAL_TOLERANCE}");
    }
    report
  }

  /// 一次走完全流程，数量全部采用默认值
  pub fn run(
    &self,
    boxes: &[DetectBox],
    outcome: &ClassificationOutcome,
    image_ref: Option<String>,
  ) -> Result<Report, NoFoodDetected> {
    let analysis = self.analyze(boxes, outcome)?;
    let quantities = quantity::accept_proposal(&analysis.proposal);
    Ok(self.finish(&quantities, analysis.quality, image_ref))
  }
}
