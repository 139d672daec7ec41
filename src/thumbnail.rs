// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Thumbnail generation for stored screenshots

use crate::error::Result;
use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;

/// Longest thumbnail side in pixels.
pub const MAX_DIMENSION: u32 = 200;

/// JPEG quality used for thumbnail bytes (0-100).
pub const JPEG_QUALITY: u8 = 70;

/// Produces the small preview bytes stored alongside each screenshot.
pub trait Thumbnailer: Send + Sync {
    fn generate(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Thumbnailer backed by the `image` crate. Downscales to fit
/// [`MAX_DIMENSION`] and re-encodes as JPEG.
pub struct ImageThumbnailer {
    max_dimension: u32,
    jpeg_quality: u8,
}

impl ImageThumbnailer {
    pub fn new() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

impl Default for ImageThumbnailer {
    fn default() -> Self {
        Self::new()
    }
}

impl Thumbnailer for ImageThumbnailer {
    fn generate(&self, data: &[u8]) -> Result<Vec<u8>> {
        let img = image::load_from_memory(data)?;

        // Only scale down, never up
        let img = if img.width() > self.max_dimension || img.height() > self.max_dimension {
            img.resize(
                self.max_dimension,
                self.max_dimension,
                image::imageops::FilterType::Triangle,
            )
        } else {
            img
        };

        // JPEG carries no alpha channel
        let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), self.jpeg_quality);
        rgb.write_with_encoder(encoder)?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 80, 120]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_large_image_is_scaled_down_preserving_aspect() {
        let thumb = ImageThumbnailer::new().generate(&png_bytes(400, 100)).unwrap();

        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 50);
    }

    #[test]
    fn test_small_image_keeps_its_size() {
        let thumb = ImageThumbnailer::new().generate(&png_bytes(50, 40)).unwrap();

        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.width(), 50);
        assert_eq!(decoded.height(), 40);
    }

    #[test]
    fn test_output_is_jpeg() {
        let thumb = ImageThumbnailer::new().generate(&png_bytes(300, 300)).unwrap();
        let format = image::guess_format(&thumb).unwrap();
        assert_eq!(format, image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_alpha_channel_is_dropped() {
        let img = image::RgbaImage::from_pixel(64, 64, image::Rgba([10, 20, 30, 128]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();

        let thumb = ImageThumbnailer::new().generate(&buffer).unwrap();
        assert!(!thumb.is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = ImageThumbnailer::new().generate(b"definitely not an image");
        assert!(result.is_err());
    }
}
