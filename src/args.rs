// 该文件是 Shanshi （膳食） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// Shanshi 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测结果转储文件路径
  /// 每行六个逗号分隔字段: 类别编号, 置信度, x1, y1, x2, y2
  #[arg(long, value_name = "FILE")]
  pub detections: PathBuf,

  /// 品质分类得分 JSON 文件路径，如 {"good": 0.93, "stale": 0.07}
  #[arg(long, value_name = "FILE")]
  pub quality: Option<PathBuf>,

  /// 营养参考表 JSON 文件路径（缺省使用内置表）
  #[arg(long, value_name = "FILE")]
  pub table: Option<PathBuf>,

  /// 类别名称表 JSON 文件路径（缺省使用内置表）
  #[arg(long, value_name = "FILE")]
  pub classes: Option<PathBuf>,

  /// 待标注的原始图像来源
  /// 支持格式: image:path/to/photo.jpg
  #[arg(long, value_name = "SOURCE")]
  pub image: Option<Url>,

  /// 标注图像输出位置
  /// 支持格式: image:path/to/annotated.png
  #[arg(long, value_name = "OUTPUT")]
  pub annotated: Option<Url>,

  /// 报告留档目录
  /// 支持格式: folder:path/to/records 或加 ?compact 存紧凑 JSON
  #[arg(long, value_name = "OUTPUT")]
  pub report: Option<Url>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// 跳过品质判定
  #[arg(long)]
  pub skip_quality: bool,
}
