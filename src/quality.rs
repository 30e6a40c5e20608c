// 该文件是 Shanshi （膳食） 项目的一部分。
// src/quality.rs - 外观品质判定
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use serde::{Serialize, Serializer};
use tracing::debug;

/// 判定为合格所需的最低置信度，须严格大于该值
const GOOD_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// 品质分类模型的输出。
/// 模型可能根本没有给出概率分布，此时为 `Absent`。
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
  Present { label: String, confidence: f32 },
  Absent,
}

impl ClassificationOutcome {
  /// 从标签概率分布中取最高概率的标签。
  /// 空分布（或全是非有限值）归为 `Absent`。
  pub fn from_scores<I, S>(scores: I) -> Self
  where
    I: IntoIterator<Item = (S, f32)>,
    S: Into<String>,
  {
    let mut best: Option<(String, f32)> = None;
    for (label, score) in scores {
      if !score.is_finite() {
        continue;
      }
      match &best {
        Some((_, top)) if score <= *top => {}
        _ => best = Some((label.into(), score)),
      }
    }

    match best {
      Some((label, confidence)) => ClassificationOutcome::Present { label, confidence },
      None => ClassificationOutcome::Absent,
    }
  }
}

/// 二元品质标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityLabel {
  Good,
  Bad,
}

impl std::fmt::Display for QualityLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      QualityLabel::Good => write!(f, "Good"),
      QualityLabel::Bad => write!(f, "Bad"),
    }
  }
}

fn round2_f32<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_f32((value * 100.0).round() / 100.0)
}

/// 品质判定结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityVerdict {
  pub label: QualityLabel,
  #[serde(serialize_with = "round2_f32")]
  pub confidence: f32,
}

/// 判定规则：标签为 "good"（不区分大小写）且置信度严格大于 0.5
/// 才判定合格，其余一律不合格。没有可用输出时保守地判为不合格。
pub fn assess(outcome: &ClassificationOutcome) -> QualityVerdict {
  let verdict = match outcome {
    ClassificationOutcome::Present { label, confidence } => {
      let good =
        label.eq_ignore_ascii_case("good") && *confidence > GOOD_CONFIDENCE_THRESHOLD;
      QualityVerdict {
        label: if good { QualityLabel::Good } else { QualityLabel::Bad },
        confidence: *confidence,
      }
    }
    ClassificationOutcome::Absent => QualityVerdict {
      label: QualityLabel::Bad,
      confidence: 0.0,
    },
  };

  debug!("品质判定: {} ({:.2})", verdict.label, verdict.confidence);
  verdict
}
