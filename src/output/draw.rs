// 该文件是 Shanshi （膳食） 项目的一部分。
// src/output/draw.rs - 标注场景绘制
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::annotate::{AnnotationScene, BoxAnnotation};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 20.0;
const BANNER_FONT_SIZE: f32 = 28.0;
const LABEL_TEXT_HEIGHT: i32 = 24;
const LABEL_CHAR_WIDTH: f32 = 11.0; // 每字符平均宽度（粗略估计）
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const BOX_COLOR: [u8; 3] = [0, 255, 0]; // 绿色边框与标签底色
const DETAIL_COLOR: [u8; 3] = [255, 255, 0]; // 黄色营养行
const BANNER_COLORS: [[u8; 3]; 2] = [[0, 0, 255], [255, 0, 0]]; // 品质蓝、总量红
const BANNER_ORIGIN: (i32, i32) = (10, 40);
const BANNER_LINE_STEP: i32 = 30;

pub struct Draw<'a> {
  font_size: f32,
  banner_font_size: f32,
  label_text_height: i32,
  label_char_width: f32,
  label_text_vertical_padding: i32,
  font: FontRef<'a>,
}

impl<'a> Default for Draw<'a> {
  fn default() -> Self {
    let font_data = include_bytes!("../../assets/font.ttf"); // default font
    let font = FontRef::try_from_slice(font_data).expect("无法加载嵌入的字体文件");

    Self {
      font_size: LABEL_FONT_SIZE,
      banner_font_size: BANNER_FONT_SIZE,
      label_text_height: LABEL_TEXT_HEIGHT,
      label_char_width: LABEL_CHAR_WIDTH,
      label_text_vertical_padding: LABEL_TEXT_VERTICAL_PADDING,
      font,
    }
  }
}

impl<'a> Draw<'a> {
  /// 把整个标注场景画到图像上
  pub fn render_scene(&self, image: &mut RgbImage, scene: &AnnotationScene) {
    for annotation in &scene.boxes {
      self.draw_box(image, annotation);
    }
    for (index, line) in scene.banner.iter().enumerate() {
      self.draw_banner_line(image, index, line);
    }
  }

  // 画一个检测框：首行文字放在框上方的底色条上，其余行放在框下方
  fn draw_box(&self, image: &mut RgbImage, annotation: &BoxAnnotation) {
    let (w, h) = (image.width() as i32, image.height() as i32);

    let x_min = annotation.bbox[0].clamp(0, w - 1);
    let y_min = annotation.bbox[1].clamp(0, h - 1);
    let x_max = annotation.bbox[2].clamp(0, w - 1);
    let y_max = annotation.bbox[3].clamp(0, h - 1);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    let box_width = (x_max - x_min + 1) as u32;
    let box_height = (y_max - y_min + 1) as u32;

    // 边框加粗为两像素
    let rect = Rect::at(x_min, y_min).of_size(box_width, box_height);
    draw_hollow_rect_mut(image, rect, Rgb(BOX_COLOR));
    if box_width > 2 && box_height > 2 {
      let inner = Rect::at(x_min + 1, y_min + 1).of_size(box_width - 2, box_height - 2);
      draw_hollow_rect_mut(image, inner, Rgb(BOX_COLOR));
    }

    let Some(label) = annotation.lines.first() else {
      return;
    };

    // 文本参数
    let scale = PxScale::from(self.font_size);
    let text_color = Rgb([255u8, 255u8, 255u8]); // 白色文本

    // 估算文本大小（粗略估计）
    let text_width = (label.len() as f32 * self.label_char_width) as i32;
    let text_height = self.label_text_height;

    // 确定标签背景位置（在边框上方）
    let label_x = x_min.max(0);
    let label_y = (y_min - text_height).max(0);

    // 确保标签不超出图像边界
    let max_width = (w - label_x).max(0);
    let label_width = text_width.min(max_width) as u32;
    let label_height = text_height as u32;

    // 仅在标签有空间时绘制
    if label_width > 0 && label_height > 0 {
      let rect = Rect::at(label_x, label_y).of_size(label_width, label_height);
      draw_filled_rect_mut(image, rect, Rgb(BOX_COLOR));

      draw_text_mut(
        image,
        text_color,
        label_x,
        label_y + self.label_text_vertical_padding,
        scale,
        &self.font,
        label,
      );
    }

    // 框下方的详情行
    let mut detail_y = y_max + self.label_text_vertical_padding;
    for line in annotation.lines.iter().skip(1) {
      if detail_y + text_height > h {
        break;
      }
      draw_text_mut(
        image,
        Rgb(DETAIL_COLOR),
        x_min,
        detail_y,
        scale,
        &self.font,
        line,
      );
      detail_y += text_height;
    }
  }

  fn draw_banner_line(&self, image: &mut RgbImage, index: usize, line: &str) {
    let color = BANNER_COLORS[index % BANNER_COLORS.len()];
    let y = BANNER_ORIGIN.1 + BANNER_LINE_STEP * index as i32;
    draw_text_mut(
      image,
      Rgb(color),
      BANNER_ORIGIN.0,
      y,
      PxScale::from(self.banner_font_size),
      &self.font,
      line,
    );
  }
}
