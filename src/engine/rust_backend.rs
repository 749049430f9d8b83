//! Reference backend built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader::with_format` |
//! | Resize | `DynamicImage::resize_exact` (Lanczos3 unless configured) |
//! | Thumbnail | center `crop_imm` to the target aspect + `resize_exact` |
//! | Encode | source format, or `TransformOptions::format` |
//! | Rotate, Flip, Fit | not implemented |

use super::backend::{EncodedImage, ImageEngine};
use super::error::EngineError;
use super::params::{ImageSource, Operation, TransformOptions};
use super::pipeline::{self, EngineSettings};

/// Resize/thumbnail backend. Rotate, flip and fit always return
/// [`EngineError::MethodNotImplemented`].
#[derive(Debug, Clone, Default)]
pub struct RustBackend {
    settings: EngineSettings,
}

impl RustBackend {
    /// Backend with the given working-area ceiling; `<= 0` selects 8192.
    pub fn new(max_buffer_size: i64) -> Self {
        Self::with_settings(EngineSettings::new(max_buffer_size))
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl ImageEngine for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn resize(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        pipeline::run(&self.settings, source, options, Operation::Resize)
    }

    fn thumbnail(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        pipeline::run(&self.settings, source, options, Operation::Thumbnail)
    }

    fn rotate(
        &self,
        _source: &ImageSource,
        _options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        Err(EngineError::not_implemented(self.name(), Operation::Rotate))
    }

    fn flip(
        &self,
        _source: &ImageSource,
        _options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        Err(EngineError::not_implemented(self.name(), Operation::Flip))
    }

    fn fit(
        &self,
        _source: &ImageSource,
        _options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        Err(EngineError::not_implemented(self.name(), Operation::Fit))
    }
}
