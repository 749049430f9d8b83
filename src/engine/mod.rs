//! Image transformation engines.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | decoder header via `ImageReader::into_decoder` |
//! | **Resize** | `resize_exact`, missing axes filled from the header |
//! | **Thumbnail** | center `crop_imm` to the target aspect + `resize_exact` |
//! | **Rotate / Flip** | `rotate90/180/270`, `fliph/flipv` |
//! | **Fit** | contain resize |
//!
//! The module is split into:
//! - **Geometry**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Sources and options describing a request
//! - **Format**: Extension → codec mapping and output negotiation
//! - **Buffer**: Working-area guard and capped output buffer
//! - **Pipeline**: The decode → transform → encode stages every backend shares
//! - **Backend**: [`ImageEngine`] trait + [`RustBackend`] + [`ExtendedBackend`]

pub mod backend;
pub mod buffer;
pub mod error;
pub mod extended_backend;
pub mod format;
mod geometry;
mod params;
pub mod pipeline;
pub mod rust_backend;

pub use backend::{BackendKind, EncodedImage, ImageEngine, build_engine};
pub use error::{EngineError, ErrorKind, TransformError};
pub use extended_backend::ExtendedBackend;
pub use format::{OutputFormat, supported_input_extensions};
pub use geometry::Dimensions;
pub use params::{Filter, FlipAxis, ImageSource, Operation, Quality, TransformOptions};
pub use pipeline::{DEFAULT_MAX_BUFFER_SIZE, DEFAULT_OUTPUT_CAPACITY, EngineSettings};
pub use rust_backend::RustBackend;
