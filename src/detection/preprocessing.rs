// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox resize for YOLO input tensors

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Square input edge of the exported YOLOv8 model
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Gray used by Ultralytics for letterbox padding
const PAD_VALUE: u8 = 114;

/// Maps model-space coordinates back to the original image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub original_width: u32,
    pub original_height: u32,
}

impl Letterbox {
    pub fn to_original_x(&self, x: f32) -> f32 {
        ((x - self.pad_x) / self.scale).clamp(0.0, self.original_width as f32)
    }

    pub fn to_original_y(&self, y: f32) -> f32 {
        ((y - self.pad_y) / self.scale).clamp(0.0, self.original_height as f32)
    }
}

/// Resize preserving aspect ratio, pad centered to `size` x `size`, and emit
/// an NCHW tensor with values in [0, 1]
pub fn letterbox(image: &DynamicImage, size: u32) -> (Array4<f32>, Letterbox) {
    let (width, height) = image.dimensions();
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));

    let transform = if width == 0 || height == 0 {
        Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            original_width: width,
            original_height: height,
        }
    } else {
        let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
        let new_w = ((width as f32 * scale).round() as u32).clamp(1, size);
        let new_h = ((height as f32 * scale).round() as u32).clamp(1, size);
        let pad_x = (size - new_w) / 2;
        let pad_y = (size - new_h) / 2;

        let resized = image.resize_exact(new_w, new_h, FilterType::Triangle).to_rgb8();
        image::imageops::overlay(&mut canvas, &resized, pad_x as i64, pad_y as i64);

        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            original_width: width,
            original_height: height,
        }
    };

    let side = size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, transform)
}
