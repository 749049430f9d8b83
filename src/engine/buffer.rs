//! Call-scoped memory for the transform pipeline.
//!
//! - [`WorkingArea`] bounds every pixel buffer the decode/resize stage may
//!   allocate. It is a guard: acquiring it checks the geometry against the
//!   ceiling, and dropping it releases the reservation on every exit path.
//! - [`OutputBuffer`] receives the encoded bytes. It grows on demand up to a
//!   fixed capacity and refuses writes past it, so oversized output fails
//!   loudly instead of being truncated.

use super::error::TransformError;
use super::geometry::Dimensions;
use std::io::{self, Cursor, Seek, SeekFrom, Write};

/// Bytes per pixel reserved for decoder allocations (16-bit RGBA).
const BYTES_PER_PIXEL: u64 = 8;

/// Reservation for the pixel frames of one transform.
#[derive(Debug)]
pub struct WorkingArea {
    max: u32,
}

impl WorkingArea {
    /// Reserve a working area of at most `max` pixels per axis for a
    /// transform from `source` to `target`.
    pub fn acquire(
        max: u32,
        source: Dimensions,
        target: Dimensions,
    ) -> Result<Self, TransformError> {
        let area = Self { max };
        area.ensure_fits(source)?;
        area.ensure_fits(target)?;
        log::debug!(
            "working area acquired: {}x{} -> {}x{} (max {}px)",
            source.width,
            source.height,
            target.width,
            target.height,
            max
        );
        Ok(area)
    }

    /// Check one frame against the ceiling.
    pub fn ensure_fits(&self, dims: Dimensions) -> Result<(), TransformError> {
        if dims.width > self.max || dims.height > self.max {
            return Err(TransformError::WorkingAreaExceeded {
                width: dims.width,
                height: dims.height,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Decoder limits matching this area.
    pub fn limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.max);
        limits.max_image_height = Some(self.max);
        limits.max_alloc = Some(
            u64::from(self.max)
                .saturating_mul(u64::from(self.max))
                .saturating_mul(BYTES_PER_PIXEL),
        );
        limits
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

impl Drop for WorkingArea {
    fn drop(&mut self) {
        log::trace!("working area released (max {}px)", self.max);
    }
}

/// Capacity-capped, seekable sink for encoders.
#[derive(Debug)]
pub struct OutputBuffer {
    cursor: Cursor<Vec<u8>>,
    capacity: usize,
    overflowed: bool,
}

impl OutputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cursor: Cursor::new(Vec::new()),
            capacity,
            overflowed: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether an encoder tried to write past the capacity.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// The written bytes, nothing more.
    pub fn into_bytes(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let end = (self.cursor.position() as usize).checked_add(buf.len());
        if end.is_none_or(|end| end > self.capacity) {
            self.overflowed = true;
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("output buffer capacity of {} bytes exceeded", self.capacity),
            ));
        }
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for OutputBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}
