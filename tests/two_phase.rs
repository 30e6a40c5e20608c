// 该文件是 Shanshi （膳食） 项目的一部分。
// tests/two_phase.rs - 两阶段分析流程的端到端测试
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;

use shanshi::detect::NoFoodDetected;
use shanshi::input::parse_detections;
use shanshi::pipeline::Pipeline;
use shanshi::quality::ClassificationOutcome;
use shanshi::table::{ClassMap, NutritionTable};

// 内置类别表按字母序: 0 Boiled Egg, 1 Chapati, 5 Rice
const DUMP: &str = "\
5, 0.90, 40, 60, 240, 300
5, 0.60, 260, 80, 420, 310
1, 0.30, 10, 10, 90, 90

0, 0.75, 100, 320, 200, 420
9, 0.80, 5, 5, 60, 60
";

fn builtin_pipeline() -> Pipeline {
  Pipeline::new(NutritionTable::builtin(), ClassMap::builtin())
}

fn good_outcome() -> ClassificationOutcome {
  ClassificationOutcome::from_scores([("good", 0.75f32), ("stale", 0.25f32)])
}

#[test]
fn analysis_counts_only_reference_classes() {
  let boxes = parse_detections(DUMP).unwrap();
  let analysis = builtin_pipeline().analyze(&boxes, &good_outcome()).unwrap();

  let mut expected = BTreeMap::new();
  expected.insert("Boiled Egg".to_string(), 1);
  expected.insert("Rice".to_string(), 2);
  assert_eq!(analysis.counts, expected);

  // 低于阈值的 Chapati 不画，未知类别仍随场景画出
  assert_eq!(analysis.scene.boxes.len(), 4);
  assert!(
    analysis
      .scene
      .boxes
      .iter()
      .any(|b| b.lines[0] == "Unknown (0.80)")
  );

  assert_eq!(analysis.proposal.get("Rice"), Some(&100.0));
  assert_eq!(analysis.proposal.get("Boiled Egg"), Some(&1.0));
}

#[test]
fn corrections_rescale_and_blanks_drop_items() {
  let boxes = parse_detections(DUMP).unwrap();
  let pipeline = builtin_pipeline();
  let analysis = pipeline.analyze(&boxes, &good_outcome()).unwrap();

  let mut submitted = BTreeMap::new();
  submitted.insert("Rice".to_string(), "250".to_string());
  submitted.insert("Boiled Egg".to_string(), "".to_string());
  let quantities = pipeline.resolve(&submitted);

  let report = pipeline.finish(
    &quantities,
    analysis.quality,
    Some("/tmp/two-phase.png".to_string()),
  );

  let json = serde_json::to_string(&report).unwrap();
  assert_eq!(
    json,
    concat!(
      r#"{"quality":{"label":"Good","confidence":0.75},"#,
      r#""nutritional_summary":{"Rice":{"calories":500.0,"protein":10.0,"fat":1.3,"#,
      r#""carbs":112.5,"quantity":250.0,"unit":"gram"}},"#,
      r#""total":{"calories":500.0,"protein":10.0,"fat":1.3,"carbs":112.5},"#,
      r#""annotated_image_url":"/tmp/two-phase.png"}"#
    )
  );
}

#[test]
fn negative_corrections_are_dropped() {
  let boxes = parse_detections(DUMP).unwrap();
  let pipeline = builtin_pipeline();
  pipeline.analyze(&boxes, &good_outcome()).unwrap();

  let mut submitted = BTreeMap::new();
  submitted.insert("Rice".to_string(), "-5".to_string());
  submitted.insert("Boiled Egg".to_string(), "2".to_string());
  let quantities = pipeline.resolve(&submitted);

  assert_eq!(quantities.len(), 1);
  assert_eq!(quantities[0].name, "Boiled Egg");

  let report = pipeline.finish(&quantities, None, None);
  assert_eq!(report.items.len(), 1);
  assert_eq!(report.total.calories, 140.0);
}

#[test]
fn one_shot_run_uses_default_quantities() {
  let boxes = parse_detections(DUMP).unwrap();
  let report = builtin_pipeline()
    .run(&boxes, &good_outcome(), None)
    .unwrap();

  // Rice 默认 100 克、Boiled Egg 默认 1 份
  assert_eq!(report.total.calories, 270.0);
  assert!(report.consistent(0.1));
  assert!(report.image_ref.is_none());
}

#[test]
fn unknown_only_scene_is_no_food() {
  let dump = "9, 0.90, 0, 0, 50, 50\n5, 0.10, 0, 0, 20, 20\n";
  let boxes = parse_detections(dump).unwrap();
  let result = builtin_pipeline().run(&boxes, &ClassificationOutcome::Absent, None);
  assert_eq!(result, Err(NoFoodDetected));
}

#[test]
fn custom_tables_flow_through() {
  let table = NutritionTable::from_json_str(
    r#"{
      "Idli": {"calories": 60, "protein": 2, "fat": 0.4, "carbs": 12, "type": "count"},
      "Sambar": {"calories": 85, "protein": 4, "fat": 2.5, "carbs": 12, "type": "gram"}
    }"#,
  )
  .unwrap();
  let classes = ClassMap::from_json_str(r#"["Idli", "Sambar"]"#).unwrap();
  let pipeline = Pipeline::new(table, classes);

  let dump = "0, 0.90, 0, 0, 50, 50\n0, 0.85, 60, 0, 110, 50\n0, 0.80, 0, 60, 50, 110\n1, 0.55, 60, 60, 200, 200\n";
  let boxes = parse_detections(dump).unwrap();
  let report = pipeline
    .run(&boxes, &ClassificationOutcome::Absent, None)
    .unwrap();

  let idli = report.items.get("Idli").unwrap();
  assert_eq!(idli.calories, 180.0);
  assert_eq!(idli.fat, 1.2);
  assert_eq!(idli.quantity, 3.0);

  let sambar = report.items.get("Sambar").unwrap();
  assert_eq!(sambar.calories, 85.0);
  assert_eq!(sambar.quantity, 100.0);

  assert_eq!(report.total.calories, 265.0);
  assert_eq!(report.total.protein, 10.0);
  assert_eq!(report.total.fat, 3.7);
  assert_eq!(report.total.carbs, 48.0);
}

#[test]
fn absent_quality_reports_bad_with_zero_confidence() {
  let boxes = parse_detections(DUMP).unwrap();
  let report = builtin_pipeline()
    .run(&boxes, &ClassificationOutcome::Absent, None)
    .unwrap();

  let verdict = report.quality.unwrap();
  assert_eq!(verdict.label.to_string(), "Bad");
  assert_eq!(verdict.confidence, 0.0);
}

#[cfg(all(feature = "read_image_file", feature = "save_image_file"))]
mod annotated_image {
  use super::*;
  use image::{Rgb, RgbImage};
  use shanshi::FromUrl;
  use shanshi::input::ImageFileInput;
  use shanshi::output::{Render, SaveImageFileOutput};
  use shanshi::quantity;
  use url::Url;

  #[test]
  fn annotated_image_lands_on_disk() {
    let base = std::env::temp_dir().join(format!("shanshi-two-phase-{}", std::process::id()));
    std::fs::create_dir_all(&base).unwrap();
    let input_path = base.join("plate.png");
    let output_path = base.join("annotated.png");

    RgbImage::new(480, 480).save(&input_path).unwrap();

    let boxes = parse_detections(DUMP).unwrap();
    let pipeline = builtin_pipeline();
    let analysis = pipeline.analyze(&boxes, &good_outcome()).unwrap();

    let sink_url = Url::parse(&format!("image:{}", output_path.display())).unwrap();
    let sink = SaveImageFileOutput::from_url(&sink_url).unwrap();

    let quantities = quantity::accept_proposal(&analysis.proposal);
    let report = pipeline.finish(
      &quantities,
      analysis.quality,
      Some(sink.path().to_string()),
    );
    let scene = analysis.scene.with_total(&report.total);

    let source_url = Url::parse(&format!("image:{}", input_path.display())).unwrap();
    let image = ImageFileInput::from_url(&source_url).unwrap().into_rgb();
    sink.render_result(&image, &scene).unwrap();

    let saved = image::open(&output_path).unwrap().into_rgb8();
    // 远离横幅文字的两个框底边应为绿色
    assert_eq!(saved.get_pixel(40, 300), &Rgb([0, 255, 0]));
    assert_eq!(saved.get_pixel(420, 310), &Rgb([0, 255, 0]));

    std::fs::remove_dir_all(&base).ok();
  }
}
