//! Backend exposing the full capability set.
//!
//! Shares decode, limits and encode with [`RustBackend`](super::RustBackend)
//! through the pipeline, and adds:
//!
//! - **Rotate**: 90, 180 or 270 degrees clockwise. The canvas expands, so a
//!   quarter turn swaps width and height. Other angles are rejected.
//! - **Flip**: mirror along the axis in `TransformOptions::flip`.
//! - **Fit**: scale so the whole image fits inside the box, aspect preserved.

use super::backend::{EncodedImage, ImageEngine};
use super::error::EngineError;
use super::params::{ImageSource, Operation, TransformOptions};
use super::pipeline::{self, EngineSettings};

#[derive(Debug, Clone, Default)]
pub struct ExtendedBackend {
    settings: EngineSettings,
}

impl ExtendedBackend {
    pub fn new(max_buffer_size: i64) -> Self {
        Self::with_settings(EngineSettings::new(max_buffer_size))
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self { settings }
    }

    fn run(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
        operation: Operation,
    ) -> Result<EncodedImage, EngineError> {
        pipeline::run(&self.settings, source, options, operation)
    }
}

impl ImageEngine for ExtendedBackend {
    fn name(&self) -> &'static str {
        "extended"
    }

    fn resize(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        self.run(source, options, Operation::Resize)
    }

    fn thumbnail(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        self.run(source, options, Operation::Thumbnail)
    }

    fn rotate(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        self.run(source, options, Operation::Rotate)
    }

    fn flip(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        self.run(source, options, Operation::Flip)
    }

    fn fit(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        self.run(source, options, Operation::Fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Dimensions, ErrorKind, FlipAxis, TransformError};
    use crate::test_helpers::*;

    #[test]
    fn rotate_270_swaps_axes() {
        let backend = ExtendedBackend::default();
        let result = backend
            .rotate(&jpeg_source(80, 40), &TransformOptions::rotate(270))
            .unwrap();
        assert_eq!(result.dimensions, Dimensions::new(40, 80));
        assert_eq!(decoded_dimensions(&result.bytes), (40, 80));
    }

    #[test]
    fn rotate_180_keeps_canvas() {
        let backend = ExtendedBackend::default();
        let result = backend
            .rotate(&png_source(30, 10), &TransformOptions::rotate(180))
            .unwrap();
        let img = image::load_from_memory(&result.bytes).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (30, 10));
        // Bottom-right source pixel (x = 29, y = 9) lands top-left
        assert_eq!(img.get_pixel(0, 0)[0], 29);
        assert_eq!(img.get_pixel(0, 0)[1], 9);
    }

    #[test]
    fn rotate_arbitrary_angle_is_invalid_geometry() {
        let backend = ExtendedBackend::default();
        let err = backend
            .rotate(&png_source(10, 10), &TransformOptions::rotate(45))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Transform(TransformError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn flip_vertical_mirrors_rows() {
        let backend = ExtendedBackend::default();
        let result = backend
            .flip(&png_source(3, 5), &TransformOptions::flip(FlipAxis::Vertical))
            .unwrap();
        let img = image::load_from_memory(&result.bytes).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0)[1], 4);
    }

    #[test]
    fn flip_without_axis_is_rejected() {
        let backend = ExtendedBackend::default();
        let options = TransformOptions::new(Operation::Flip, 0, 0);
        let err = backend.flip(&png_source(3, 3), &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transform);
    }

    #[test]
    fn fit_preserves_aspect_inside_box() {
        let backend = ExtendedBackend::default();
        let result = backend
            .fit(&jpeg_source(800, 600), &TransformOptions::fit(200, 200))
            .unwrap();
        assert_eq!(decoded_dimensions(&result.bytes), (200, 150));
    }

    #[test]
    fn fit_with_one_axis_unset_uses_source_axis_as_bound() {
        let backend = ExtendedBackend::default();
        // Box is 400x600 after fallback; 800x600 fits as 400x300
        let result = backend
            .fit(&jpeg_source(800, 600), &TransformOptions::fit(400, 0))
            .unwrap();
        assert_eq!(decoded_dimensions(&result.bytes), (400, 300));
    }
}
