//! # pixfit
//!
//! An image transformation engine. A caller hands over the bytes of an image
//! plus its filename, names an operation and a target size, and gets back
//! freshly encoded bytes in the same format (or a requested one).
//!
//! # Architecture: Decode → Transform → Encode
//!
//! Every operation runs the same three stages, entirely in memory:
//!
//! ```text
//! 1. Decode     bytes + extension  →  pixels    (codec chosen by extension)
//! 2. Transform  pixels             →  pixels    (resize / cover / contain / rotate / flip)
//! 3. Encode     pixels             →  bytes     (capped output buffer)
//! ```
//!
//! Header dimensions are read before any pixels are decoded, so a target or
//! source that would not fit the working area is rejected up front.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The [`engine::ImageEngine`] trait, both backends, and the shared pipeline |
//! | [`config`] | `pixfit.toml` loading, validation, and merging over stock defaults |
//! | [`batch`] | Bounded parallel transforms on a dedicated rayon pool |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Extension, Not Content
//!
//! The input codec is picked from the filename extension alone. A `.png` that
//! holds JPEG bytes fails to decode rather than being silently accepted. This
//! keeps the contract between caller and engine explicit: the filename is part
//! of the request.
//!
//! ## Two Backends
//!
//! [`engine::RustBackend`] implements resize and thumbnail and answers every
//! other operation with [`engine::EngineError::MethodNotImplemented`]. Callers
//! can probe for support without a side channel. [`engine::ExtendedBackend`]
//! implements all five operations on the same pipeline.
//!
//! ## Bounded Memory
//!
//! Each transform holds one working area, capped at `max_buffer_size` pixels
//! per axis, and one output buffer, capped at `output_capacity` bytes. Output
//! that would overflow fails with an error and is never truncated. The engine
//! does not limit how many transforms run at once; [`batch`] does.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding and encoding use the `image` crate, including its `rav1e`-backed
//! AVIF encoder. There are no system libraries to install.

pub mod batch;
pub mod config;
pub mod engine;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
