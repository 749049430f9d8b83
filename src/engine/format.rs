//! Codec selection by filename extension.
//!
//! The extension is the only input: bytes are never sniffed. This keeps the
//! behavior predictable for callers that already know what they stored, at the
//! cost of failing (rather than guessing) when name and content disagree.

use super::error::TransformError;
use image::ImageFormat;
use image::error::{ImageError, ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
///
/// AVIF is excluded: the `image` crate's `"avif"` feature only enables the
/// encoder, yet `ImageFormat::reading_enabled()` reports `true` for it.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of input extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Map a (lowercased) extension to its decoder format.
pub fn input_format(extension: &str) -> Option<ImageFormat> {
    INPUT_CANDIDATES
        .iter()
        .find(|(ext, fmt)| *ext == extension && fmt.reading_enabled())
        .map(|(_, fmt)| *fmt)
}

/// Build the decode-stage error for an extension with no decoder.
pub(crate) fn unsupported_extension(extension: Option<&str>) -> ImageError {
    let hint = match extension {
        Some(ext) => ImageFormatHint::Name(ext.to_string()),
        None => ImageFormatHint::Unknown,
    };
    ImageError::Unsupported(UnsupportedError::from_format_and_kind(
        hint.clone(),
        UnsupportedErrorKind::Format(hint),
    ))
}

/// Formats the engine can encode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Tiff,
    Webp,
    Gif,
    Bmp,
    Avif,
}

impl OutputFormat {
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Tiff => Some(Self::Tiff),
            ImageFormat::WebP => Some(Self::Webp),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Avif => Some(Self::Avif),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Tiff => ImageFormat::Tiff,
            Self::Webp => ImageFormat::WebP,
            Self::Gif => ImageFormat::Gif,
            Self::Bmp => ImageFormat::Bmp,
            Self::Avif => ImageFormat::Avif,
        }
    }

    /// Canonical filename extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Avif => "avif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        self.image_format().to_mime_type()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "tif" | "tiff" => Ok(Self::Tiff),
            "webp" => Ok(Self::Webp),
            "gif" => Ok(Self::Gif),
            "bmp" => Ok(Self::Bmp),
            "avif" => Ok(Self::Avif),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Pick the encode format: the explicit override, or the source format.
pub fn resolve_output(
    source: ImageFormat,
    requested: Option<OutputFormat>,
) -> Result<OutputFormat, TransformError> {
    let format = match requested {
        Some(format) => format,
        None => OutputFormat::from_image_format(source)
            .ok_or_else(|| TransformError::UnsupportedOutput(format!("{source:?}")))?,
    };
    if !format.image_format().writing_enabled() {
        return Err(TransformError::UnsupportedOutput(format.to_string()));
    }
    Ok(format)
}
