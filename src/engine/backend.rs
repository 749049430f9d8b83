//! Engine trait and shared result types.
//!
//! The [`ImageEngine`] trait fixes the capability set every backend exposes:
//! resize, thumbnail, rotate, flip and fit. A backend that does not support a
//! capability still implements the method and returns
//! [`EngineError::MethodNotImplemented`], so callers can branch on the gap at
//! runtime without inspecting error text.
//!
//! | Backend | resize | thumbnail | rotate | flip | fit |
//! |---|---|---|---|---|---|
//! | [`RustBackend`](super::rust_backend::RustBackend) | ✓ | ✓ | — | — | — |
//! | [`ExtendedBackend`](super::extended_backend::ExtendedBackend) | ✓ | ✓ | ✓ | ✓ | ✓ |

use super::error::EngineError;
use super::format::OutputFormat;
use super::geometry::Dimensions;
use super::params::{ImageSource, Operation, TransformOptions};
use super::pipeline;
use super::pipeline::EngineSettings;
use super::{ExtendedBackend, RustBackend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoded output of a successful transform. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub dimensions: Dimensions,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Trait for image engines.
///
/// Implementations hold only read-only configuration, so one instance can
/// serve concurrent calls; every buffer lives inside a single call.
pub trait ImageEngine: Send + Sync {
    /// Short backend name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Exact resize. A `0` axis takes the source size of that axis.
    fn resize(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError>;

    /// Scale to cover the box, then center-crop to exactly width×height.
    fn thumbnail(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError>;

    /// Rotate clockwise by `options.rotation` degrees.
    fn rotate(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError>;

    /// Mirror along `options.flip`.
    fn flip(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError>;

    /// Scale to fit inside the box, keeping the aspect ratio.
    fn fit(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError>;

    /// Read the source header without decoding pixels.
    fn identify(&self, source: &ImageSource) -> Result<Dimensions, EngineError> {
        pipeline::identify(source)
    }

    /// Dispatch on `options.operation`.
    fn transform(
        &self,
        source: &ImageSource,
        options: &TransformOptions,
    ) -> Result<EncodedImage, EngineError> {
        match options.operation {
            Operation::Resize => self.resize(source, options),
            Operation::Thumbnail => self.thumbnail(source, options),
            Operation::Rotate => self.rotate(source, options),
            Operation::Flip => self.flip(source, options),
            Operation::Fit => self.fit(source, options),
        }
    }
}

/// Backend selection for configuration and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Resize and thumbnail only.
    #[default]
    Rust,
    /// Every capability.
    Extended,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Extended => "extended",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rust" => Ok(Self::Rust),
            "extended" => Ok(Self::Extended),
            other => Err(format!("unknown backend '{other}' (expected rust or extended)")),
        }
    }
}

/// Build the engine for `kind`.
pub fn build_engine(kind: BackendKind, settings: EngineSettings) -> Box<dyn ImageEngine> {
    log::debug!(
        "building {kind} engine (max buffer {}px, output capacity {} bytes)",
        settings.max_buffer_size,
        settings.output_capacity
    );
    match kind {
        BackendKind::Rust => Box::new(RustBackend::with_settings(settings)),
        BackendKind::Extended => Box::new(ExtendedBackend::with_settings(settings)),
    }
}
