// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction overlays written to disk for troubleshooting

use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::PathBuf;
use thiserror::Error;

use super::image_utils::{decode_image_bytes, ImageError};
use crate::domain::{BoundingBox, Prediction};

const BORDER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BORDER_WIDTH: u32 = 3;

#[derive(Debug, Error)]
pub enum DebugImageError {
    #[error(transparent)]
    Decode(#[from] ImageError),

    #[error("Failed to create debug directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode debug image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Draws prediction boxes over the uploaded image and saves it as JPEG
#[derive(Debug, Clone)]
pub struct DebugRenderer {
    output_dir: PathBuf,
}

impl DebugRenderer {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Render `predictions` onto `image` as `output_dir/file_name`
    pub fn render(
        &self,
        image: &[u8],
        predictions: &[Prediction],
        file_name: &str,
    ) -> Result<PathBuf, DebugImageError> {
        let (img, _) = decode_image_bytes(image)?;
        let mut canvas = img.to_rgb8();
        for prediction in predictions {
            draw_box(&mut canvas, &prediction.bounding_box);
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        canvas.save_with_format(&path, ImageFormat::Jpeg)?;
        Ok(path)
    }
}

fn draw_box(canvas: &mut RgbImage, bounding_box: &BoundingBox) {
    let (width, height) = (canvas.width() as f32, canvas.height() as f32);
    let left = (bounding_box.xmin * width).round() as i32;
    let top = (bounding_box.ymin * height).round() as i32;
    let box_width = ((bounding_box.xmax - bounding_box.xmin) * width).round().max(1.0) as u32;
    let box_height = ((bounding_box.ymax - bounding_box.ymin) * height).round().max(1.0) as u32;

    for i in 0..BORDER_WIDTH {
        let rect = Rect::at(left - i as i32, top - i as i32)
            .of_size(box_width + 2 * i, box_height + 2 * i);
        draw_hollow_rect_mut(canvas, rect, BORDER_COLOR);
    }
}
