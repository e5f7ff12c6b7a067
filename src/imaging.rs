// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of uploaded vehicle photos (base64 payloads and raw multipart bytes)

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Default upload limit per image (10 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Formats accepted for uploads, as advertised by model-info
pub const SUPPORTED_INPUT_FORMATS: &[&str] = &["JPG", "JPEG", "PNG", "WEBP", "GIF", "BMP", "TIFF"];

#[derive(Debug, Error)]
pub enum ImageInputError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),
}

/// Metadata captured while decoding
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub size_bytes: usize,
}

/// Drop a `data:image/png;base64,` style prefix and surrounding whitespace
pub fn strip_data_url(payload: &str) -> &str {
    let trimmed = payload.trim();
    match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .unwrap_or(rest),
        None => trimmed,
    }
}

/// Decode a base64 image payload into RGB pixels
pub fn decode_base64_image(
    payload: &str,
    max_bytes: usize,
) -> Result<(DynamicImage, ImageInfo), ImageInputError> {
    let encoded = strip_data_url(payload);
    if encoded.is_empty() {
        return Err(ImageInputError::EmptyData);
    }

    // base64 inflates by 4/3; reject before allocating the decoded buffer
    if encoded.len() / 4 * 3 > max_bytes + 3 {
        return Err(ImageInputError::TooLarge(encoded.len() / 4 * 3, max_bytes));
    }

    let bytes = STANDARD.decode(encoded)?;
    decode_image_bytes(&bytes, max_bytes)
}

/// Decode raw image bytes into RGB pixels
pub fn decode_image_bytes(
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(DynamicImage, ImageInfo), ImageInputError> {
    if bytes.is_empty() {
        return Err(ImageInputError::EmptyData);
    }
    if bytes.len() > max_bytes {
        return Err(ImageInputError::TooLarge(bytes.len(), max_bytes));
    }

    let format = detect_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageInputError::DecodeFailed(e.to_string()))?;

    // The detector expects three channels; alpha and palettes are dropped here
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let info = ImageInfo {
        width: rgb.width(),
        height: rgb.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((rgb, info))
}

/// Sniff the container format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageInputError> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Ok(ImageFormat::Png),
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Ok(ImageFormat::WebP),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Ok(ImageFormat::Gif),
        [b'B', b'M', ..] => Ok(ImageFormat::Bmp),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),
        _ => Err(ImageInputError::UnsupportedFormat),
    }
}
