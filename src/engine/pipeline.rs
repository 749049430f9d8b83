//! The transform pipeline shared by every backend.
//!
//! ```text
//! extension → decoder → header → normalize → working area → decode pixels
//!           → transform → encode into bounded output → written bytes
//! ```
//!
//! Backends decide *which* operations they expose; once an operation is
//! accepted, the stages below are identical. Each stage maps its failure to
//! its own [`EngineError`] variant, and nothing is retried.

use super::backend::EncodedImage;
use super::buffer::{OutputBuffer, WorkingArea};
use super::error::{EngineError, TransformError};
use super::format::{OutputFormat, input_format, resolve_output, unsupported_extension};
use super::geometry::{
    Dimensions, center_crop_origin, cover_crop, fit_dimensions, normalize_dimensions,
    quarter_turns, rotated_dimensions,
};
use super::params::{Filter, FlipAxis, ImageSource, Operation, Quality, TransformOptions};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageError, ImageFormat, ImageReader, ImageResult};
use std::borrow::Cow;
use std::io::Cursor;

/// Working-area ceiling (pixels per axis) when none is configured.
pub const DEFAULT_MAX_BUFFER_SIZE: u32 = 8192;

/// Output buffer ceiling: 50 MiB.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 50 * 1024 * 1024;

/// AVIF encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Fixed configuration of an engine. Read-only after construction, so an
/// engine can be shared across threads without locking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub max_buffer_size: u32,
    pub output_capacity: usize,
    pub filter: Filter,
    pub quality: Quality,
}

impl EngineSettings {
    /// Settings with the given working-area ceiling; `<= 0` selects the default.
    pub fn new(max_buffer_size: i64) -> Self {
        Self {
            max_buffer_size: effective_max_buffer_size(max_buffer_size),
            ..Self::default()
        }
    }

    pub fn with_output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
            filter: Filter::default(),
            quality: Quality::default(),
        }
    }
}

/// Resolve a configured working-area ceiling.
///
/// - `<= 0` → [`DEFAULT_MAX_BUFFER_SIZE`]
/// - larger than `u32::MAX` → `u32::MAX`
pub fn effective_max_buffer_size(configured: i64) -> u32 {
    if configured <= 0 {
        DEFAULT_MAX_BUFFER_SIZE
    } else {
        u32::try_from(configured).unwrap_or(u32::MAX)
    }
}

/// The pixel work one operation performs, resolved against the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Exact resize to the given size.
    Resize(Dimensions),
    /// Scale to cover, then center-crop to the given size.
    Cover(Dimensions),
    /// Scale to the given size, already computed to fit the requested box.
    Contain(Dimensions),
    /// Clockwise quarter turns (1..=3).
    Rotate(u8),
    Flip(FlipAxis),
}

impl Step {
    /// Resolve `operation` against the intrinsic size of the source.
    pub(crate) fn plan(
        operation: Operation,
        options: &TransformOptions,
        intrinsic: Dimensions,
    ) -> Result<Self, TransformError> {
        let requested = normalize_dimensions((options.width, options.height), intrinsic);
        match operation {
            Operation::Resize => Ok(Self::Resize(requested)),
            Operation::Thumbnail => Ok(Self::Cover(requested)),
            Operation::Fit => Ok(Self::Contain(fit_dimensions(intrinsic, requested))),
            Operation::Rotate => {
                let degrees = options.rotation.ok_or_else(|| {
                    TransformError::InvalidGeometry("rotate requires an angle".into())
                })?;
                Ok(Self::Rotate(quarter_turns(degrees)?))
            }
            Operation::Flip => options
                .flip
                .map(Self::Flip)
                .ok_or_else(|| TransformError::InvalidGeometry("flip requires an axis".into())),
        }
    }

    pub(crate) fn output_dimensions(self, intrinsic: Dimensions) -> Dimensions {
        match self {
            Self::Resize(target) | Self::Cover(target) | Self::Contain(target) => target,
            Self::Rotate(turns) => rotated_dimensions(intrinsic, turns),
            Self::Flip(_) => intrinsic,
        }
    }

    fn apply(self, img: DynamicImage, filter: FilterType) -> DynamicImage {
        let intrinsic = Dimensions::new(img.width(), img.height());
        match self {
            Self::Resize(target) | Self::Contain(target) => {
                if target == intrinsic {
                    img
                } else {
                    img.resize_exact(target.width, target.height, filter)
                }
            }
            Self::Cover(target) => {
                let crop = cover_crop(intrinsic, target);
                let cropped = if crop == intrinsic {
                    img
                } else {
                    let (x, y) = center_crop_origin(intrinsic, crop);
                    img.crop_imm(x, y, crop.width, crop.height)
                };
                if crop == target {
                    cropped
                } else {
                    cropped.resize_exact(target.width, target.height, filter)
                }
            }
            Self::Rotate(1) => img.rotate90(),
            Self::Rotate(2) => img.rotate180(),
            Self::Rotate(_) => img.rotate270(),
            Self::Flip(FlipAxis::Horizontal) => img.fliph(),
            Self::Flip(FlipAxis::Vertical) => img.flipv(),
        }
    }
}

/// Format name used in error messages.
fn format_label(source: &ImageSource) -> String {
    source.extension().unwrap_or_else(|| "unknown".to_string())
}

/// Stage 1: pick the codec by extension and open a decoder over the bytes.
fn open_decoder(
    source: &ImageSource,
) -> Result<(ImageFormat, impl ImageDecoder + '_), EngineError> {
    let extension = source.extension();
    let format = extension
        .as_deref()
        .and_then(input_format)
        .ok_or_else(|| EngineError::Decode {
            format: format_label(source),
            source: unsupported_extension(extension.as_deref()),
        })?;

    let decoder = ImageReader::with_format(Cursor::new(source.bytes()), format)
        .into_decoder()
        .map_err(|e| classify_open_error(source, format, e))?;
    Ok((format, decoder))
}

/// Bytes that carry the signature of the chosen format but fail to open have
/// a broken header. Without the signature they were never that format.
///
/// The signature only classifies the failure; it never picks the codec.
fn classify_open_error(source: &ImageSource, format: ImageFormat, err: ImageError) -> EngineError {
    if image::guess_format(source.bytes()).is_ok_and(|guessed| guessed == format) {
        EngineError::Header {
            format: format_label(source),
            reason: err.to_string(),
        }
    } else {
        EngineError::Decode {
            format: format_label(source),
            source: err,
        }
    }
}

/// Stage 2: intrinsic dimensions.
fn read_header(source: &ImageSource, decoder: &impl ImageDecoder) -> Result<Dimensions, EngineError> {
    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(EngineError::Header {
            format: format_label(source),
            reason: format!("degenerate dimensions {width}x{height}"),
        });
    }
    Ok(Dimensions::new(width, height))
}

/// Decode failures caused by the working-area limits are transform-stage
/// failures; anything else is a decode failure.
fn classify_decode_error(
    source: &ImageSource,
    err: ImageError,
    intrinsic: Dimensions,
    area: &WorkingArea,
) -> EngineError {
    match err {
        ImageError::Limits(_) => TransformError::WorkingAreaExceeded {
            width: intrinsic.width,
            height: intrinsic.height,
            max: area.max(),
        }
        .into(),
        other => EngineError::Decode {
            format: format_label(source),
            source: other,
        },
    }
}

/// Read only the header of `source`.
pub fn identify(source: &ImageSource) -> Result<Dimensions, EngineError> {
    let (_, decoder) = open_decoder(source)?;
    read_header(source, &decoder)
}

/// Run `operation` on `source` through every pipeline stage.
///
/// Capability checks happen before this call; the pipeline itself supports
/// every [`Operation`].
pub fn run(
    settings: &EngineSettings,
    source: &ImageSource,
    options: &TransformOptions,
    operation: Operation,
) -> Result<EncodedImage, EngineError> {
    let (format, mut decoder) = open_decoder(source)?;
    let intrinsic = read_header(source, &decoder)?;
    log::debug!(
        "{operation}: {} is {:?} {}x{}",
        source.filename(),
        format,
        intrinsic.width,
        intrinsic.height
    );

    let step = Step::plan(operation, options, intrinsic)?;
    let target = step.output_dimensions(intrinsic);
    let output_format = resolve_output(format, options.format)?;

    let area = WorkingArea::acquire(settings.max_buffer_size, intrinsic, target)?;
    decoder
        .set_limits(area.limits())
        .map_err(|e| classify_decode_error(source, e, intrinsic, &area))?;
    let img = DynamicImage::from_decoder(decoder)
        .map_err(|e| classify_decode_error(source, e, intrinsic, &area))?;

    let filter = options.filter.unwrap_or(settings.filter);
    let transformed = step.apply(img, filter.into());

    let mut out = OutputBuffer::with_capacity(settings.output_capacity);
    let quality = options.quality.unwrap_or(settings.quality);
    let encoded = encode(&transformed, output_format, quality, &mut out);
    // An encoder may swallow the write error; the flag still reports it.
    if out.overflowed() {
        return Err(TransformError::OutputTooLarge {
            capacity: out.capacity(),
        }
        .into());
    }
    encoded.map_err(TransformError::Encode)?;

    let bytes = out.into_bytes();
    if bytes.is_empty() {
        return Err(TransformError::EmptyOutput.into());
    }
    log::debug!(
        "{operation}: encoded {}x{} {} ({} bytes)",
        transformed.width(),
        transformed.height(),
        output_format,
        bytes.len()
    );

    Ok(EncodedImage {
        bytes,
        format: output_format,
        dimensions: Dimensions::new(transformed.width(), transformed.height()),
    })
}

/// Convert to a color type the target encoder accepts.
fn prepare_for_encode(img: &DynamicImage, format: OutputFormat) -> Cow<'_, DynamicImage> {
    use DynamicImage::{ImageLuma8, ImageRgb8, ImageRgba8};
    match (format, img) {
        (OutputFormat::Png | OutputFormat::Tiff, _) => Cow::Borrowed(img),
        (OutputFormat::Jpeg, ImageLuma8(_) | ImageRgb8(_)) => Cow::Borrowed(img),
        // JPEG has no alpha channel
        (OutputFormat::Jpeg, _) => Cow::Owned(ImageRgb8(img.to_rgb8())),
        (_, ImageRgb8(_) | ImageRgba8(_)) => Cow::Borrowed(img),
        _ if img.color().has_alpha() => Cow::Owned(ImageRgba8(img.to_rgba8())),
        _ => Cow::Owned(ImageRgb8(img.to_rgb8())),
    }
}

fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
    out: &mut OutputBuffer,
) -> ImageResult<()> {
    let img = prepare_for_encode(img, format);
    let q = quality.encoder_value();
    match format {
        OutputFormat::Jpeg => img.write_with_encoder(JpegEncoder::new_with_quality(out, q)),
        OutputFormat::Avif => {
            img.write_with_encoder(AvifEncoder::new_with_speed_quality(out, AVIF_SPEED, q))
        }
        other => img.write_to(out, other.image_format()),
    }
}
