//! Shared test utilities: synthetic images encoded in memory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = jpeg_source(800, 600);
//! let result = engine.resize(&source, &TransformOptions::resize(400, 0)).unwrap();
//! assert_eq!(decoded_dimensions(&result.bytes), (400, 600));
//! ```

use crate::engine::ImageSource;
use image::{ImageEncoder, ImageFormat, RgbImage, RgbaImage};

/// Deterministic gradient; `seed` shifts the blue channel so parallel tests
/// can tell their outputs apart.
pub fn gradient(width: u32, height: u32, seed: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, seed])
    })
}

pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height, 128);
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

pub fn encode_png(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let img = gradient(width, height, seed);
    let mut bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// A PNG with a transparent right half.
pub fn encode_rgba_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        let alpha = if x < width / 2 { 255 } else { 0 };
        image::Rgba([200, 40, 40, alpha])
    });
    let mut bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    bytes
}

pub fn jpeg_source(width: u32, height: u32) -> ImageSource {
    ImageSource::new(encode_jpeg(width, height), "source.jpg")
}

pub fn png_source(width: u32, height: u32) -> ImageSource {
    ImageSource::new(encode_png(width, height, 128), "source.png")
}

/// Decode bytes (sniffing is fine here) and return their dimensions.
pub fn decoded_dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

pub fn sniffed_format(bytes: &[u8]) -> ImageFormat {
    image::guess_format(bytes).unwrap()
}
