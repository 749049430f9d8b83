//! Parameter types for engine calls.
//!
//! These types describe *what* to do, not *how*. They are the interface
//! between callers (the CLI, the batch runner, an HTTP layer) and the
//! [`backend`](super::backend) that does the pixel work.
//!
//! ## Types
//!
//! - [`ImageSource`]: Encoded input bytes plus the filename whose extension picks the codec.
//! - [`TransformOptions`]: Requested geometry and operation; `0` on an axis means "use the source size".
//! - [`Operation`]: The capability being invoked.
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Filter`]: Resampling algorithm for resize/thumbnail/fit.
//! - [`FlipAxis`]: Mirror axis for flip.

use super::format::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Raw encoded image bytes and the filename they arrived with.
///
/// The extension of `filename` is trusted to name the codec. Content is never
/// sniffed: a `.png` name on JPEG bytes fails to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    bytes: Vec<u8>,
    filename: String,
}

impl ImageSource {
    pub fn new(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }

    /// Read a file from disk, keeping its name for codec selection.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { bytes, filename })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Lowercased filename extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// The capability set every engine exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Resize,
    Thumbnail,
    Rotate,
    Flip,
    Fit,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Resize,
        Operation::Thumbnail,
        Operation::Rotate,
        Operation::Flip,
        Operation::Fit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resize => "resize",
            Self::Thumbnail => "thumbnail",
            Self::Rotate => "rotate",
            Self::Flip => "flip",
            Self::Fit => "fit",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown operation '{s}'"))
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// The quality, clamped to 1-100 even when built directly as `Quality(n)`.
    pub fn value(self) -> u32 {
        self.0.clamp(1, 100)
    }

    /// The quality as the `u8` the JPEG and AVIF encoders take.
    pub fn encoder_value(self) -> u8 {
        u8::try_from(self.value()).unwrap_or(100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

/// Resampling filter, mapped onto [`image::imageops::FilterType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<Filter> for image::imageops::FilterType {
    fn from(filter: Filter) -> Self {
        use image::imageops::FilterType;
        match filter {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "triangle" | "linear" => Ok(Self::Triangle),
            "catmull-rom" | "cubic" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            other => Err(format!(
                "unknown filter '{other}' (expected nearest, triangle, catmull-rom, gaussian, lanczos3)"
            )),
        }
    }
}

/// Mirror axis for [`Operation::Flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    /// Mirror left/right.
    Horizontal,
    /// Mirror top/bottom.
    Vertical,
}

impl FromStr for FlipAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Ok(Self::Horizontal),
            "v" | "vertical" => Ok(Self::Vertical),
            other => Err(format!("unknown flip axis '{other}'")),
        }
    }
}

/// A requested transform.
///
/// `width`/`height` of `0` mean "take this axis from the source header".
/// The extra fields are only read by the operations they name: `rotation`
/// by rotate, `flip` by flip. `filter` falls back to the engine default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformOptions {
    pub width: u32,
    pub height: u32,
    pub operation: Operation,
    pub filter: Option<Filter>,
    /// Clockwise rotation in degrees.
    pub rotation: Option<u32>,
    pub flip: Option<FlipAxis>,
    /// Output format override. `None` keeps the source format.
    pub format: Option<OutputFormat>,
    /// Lossy encode quality. `None` uses the engine default.
    pub quality: Option<Quality>,
}

impl TransformOptions {
    pub fn new(operation: Operation, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            operation,
            ..Self::default()
        }
    }

    pub fn resize(width: u32, height: u32) -> Self {
        Self::new(Operation::Resize, width, height)
    }

    pub fn thumbnail(width: u32, height: u32) -> Self {
        Self::new(Operation::Thumbnail, width, height)
    }

    pub fn fit(width: u32, height: u32) -> Self {
        Self::new(Operation::Fit, width, height)
    }

    pub fn rotate(degrees: u32) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::new(Operation::Rotate, 0, 0)
        }
    }

    pub fn flip(axis: FlipAxis) -> Self {
        Self {
            flip: Some(axis),
            ..Self::new(Operation::Flip, 0, 0)
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn directly_built_quality_never_wraps() {
        assert_eq!(Quality(300).value(), 100);
        assert_eq!(Quality(300).encoder_value(), 100);
        assert_eq!(Quality(256).encoder_value(), 100);
        assert_eq!(Quality(0).encoder_value(), 1);
        assert_eq!(Quality::new(75).encoder_value(), 75);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn source_extension_is_lowercased() {
        let source = ImageSource::new(vec![1, 2, 3], "photos/Sunset.JPG");
        assert_eq!(source.extension().as_deref(), Some("jpg"));
        assert_eq!(source.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn source_without_extension() {
        let source = ImageSource::new(Vec::new(), "README");
        assert_eq!(source.extension(), None);
    }

    #[test]
    fn source_from_path_keeps_file_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cat.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let source = ImageSource::from_path(&path).unwrap();
        assert_eq!(source.filename(), "cat.png");
        assert_eq!(source.bytes(), b"not really a png");
    }

    #[test]
    fn operation_parses_case_insensitively() {
        assert_eq!("Thumbnail".parse::<Operation>(), Ok(Operation::Thumbnail));
        assert!("crop".parse::<Operation>().is_err());
    }

    #[test]
    fn filter_aliases() {
        assert_eq!("lanczos".parse::<Filter>(), Ok(Filter::Lanczos3));
        assert_eq!("cubic".parse::<Filter>(), Ok(Filter::CatmullRom));
        assert!("bicubic-ish".parse::<Filter>().is_err());
    }

    #[test]
    fn options_default_is_identity_resize() {
        let opts = TransformOptions::default();
        assert_eq!(opts.operation, Operation::Resize);
        assert_eq!((opts.width, opts.height), (0, 0));
        assert_eq!(opts.format, None);
    }

    #[test]
    fn options_deserialize_sparse_json() {
        let opts: TransformOptions =
            serde_json::from_str(r#"{"operation": "thumbnail", "width": 100, "height": 80}"#)
                .unwrap();
        assert_eq!(opts, TransformOptions::thumbnail(100, 80));
    }

    #[test]
    fn options_reject_unknown_fields() {
        let result: Result<TransformOptions, _> = serde_json::from_str(r#"{"widht": 100}"#);
        assert!(result.is_err());
    }
}
