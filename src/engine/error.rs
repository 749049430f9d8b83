//! Error taxonomy for the transform pipeline.
//!
//! Every failure keeps the stage it happened in so a consuming layer can
//! choose a response without parsing messages:
//!
//! | Variant | Stage |
//! |---|---|
//! | [`EngineError::MethodNotImplemented`] | capability dispatch |
//! | [`EngineError::Decode`] | codec selection, bytes not in the chosen format, pixel decode |
//! | [`EngineError::Header`] | format signature matched but the header is unreadable or zero-sized |
//! | [`EngineError::Transform`] | working area, resize/crop, encode |

use super::params::Operation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{operation} is not implemented by the {backend} backend")]
    MethodNotImplemented {
        backend: &'static str,
        operation: Operation,
    },
    #[error("Failed to decode {format} source: {source}")]
    Decode {
        format: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to read {format} header: {reason}")]
    Header { format: String, reason: String },
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{width}x{height} exceeds the {max}px working area")]
    WorkingAreaExceeded { width: u32, height: u32, max: u32 },
    #[error("Encoded output exceeds the {capacity} byte output buffer")]
    OutputTooLarge { capacity: usize },
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Cannot encode {0} output")]
    UnsupportedOutput(String),
    #[error("Encode failed: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Encoder produced no output")]
    EmptyOutput,
}

/// Coarse classification of an [`EngineError`].
///
/// Callers branch on this instead of on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotImplemented,
    Decode,
    Header,
    Transform,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MethodNotImplemented { .. } => ErrorKind::NotImplemented,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Header { .. } => ErrorKind::Header,
            Self::Transform(_) => ErrorKind::Transform,
        }
    }

    /// True when the failure is the caller's input rather than the backend.
    ///
    /// Oversized output and encoder faults are backend-side; everything else
    /// can be fixed by changing the request.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Transform(TransformError::OutputTooLarge { .. })
            | Self::Transform(TransformError::Encode(_))
            | Self::Transform(TransformError::EmptyOutput) => false,
            _ => true,
        }
    }

    pub(crate) fn not_implemented(backend: &'static str, operation: Operation) -> Self {
        Self::MethodNotImplemented { backend, operation }
    }
}
