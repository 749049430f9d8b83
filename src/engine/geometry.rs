//! Pure dimension math.
//!
//! Nothing here touches pixels or bytes, so every rule the pipeline applies to
//! geometry is unit testable on its own.

use super::error::TransformError;
use serde::Serialize;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn longer_edge(self) -> u32 {
        self.width.max(self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Fill in unspecified axes from the source header.
///
/// A `0` axis takes the intrinsic size of that axis. This is a fallback, not a
/// proportional computation: `400x0` on an `800x600` source yields `400x600`.
pub fn normalize_dimensions(requested: (u32, u32), intrinsic: Dimensions) -> Dimensions {
    let (width, height) = requested;
    Dimensions {
        width: if width == 0 { intrinsic.width } else { width },
        height: if height == 0 { intrinsic.height } else { height },
    }
}

/// Largest centered region of `source` with the aspect ratio of `target`.
///
/// Cropping this region and scaling it to `target` covers the box without
/// any intermediate frame larger than the source.
pub fn cover_crop(source: Dimensions, target: Dimensions) -> Dimensions {
    let src_aspect = source.width as f64 / source.height as f64;
    let tgt_aspect = target.width as f64 / target.height as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: keep full height, trim the sides
        let w = (source.height as f64 * tgt_aspect).round() as u32;
        Dimensions::new(w.clamp(1, source.width), source.height)
    } else {
        // Source is taller: keep full width, trim top and bottom
        let h = (source.width as f64 / tgt_aspect).round() as u32;
        Dimensions::new(source.width, h.clamp(1, source.height))
    }
}

/// Top-left corner of a `target` window centered inside `outer`.
pub fn center_crop_origin(outer: Dimensions, target: Dimensions) -> (u32, u32) {
    (
        outer.width.saturating_sub(target.width) / 2,
        outer.height.saturating_sub(target.height) / 2,
    )
}

/// Largest size with the source aspect ratio that fits inside `bounds`.
///
/// Never returns a zero axis, so extreme aspect ratios still produce an image.
pub fn fit_dimensions(source: Dimensions, bounds: Dimensions) -> Dimensions {
    let scale_w = bounds.width as f64 / source.width as f64;
    let scale_h = bounds.height as f64 / source.height as f64;
    let scale = scale_w.min(scale_h);

    let w = ((source.width as f64 * scale).round() as u32).clamp(1, bounds.width);
    let h = ((source.height as f64 * scale).round() as u32).clamp(1, bounds.height);
    Dimensions::new(w, h)
}

/// Quarter turns for a clockwise rotation; only right angles are supported.
pub fn quarter_turns(degrees: u32) -> Result<u8, TransformError> {
    match degrees % 360 {
        90 => Ok(1),
        180 => Ok(2),
        270 => Ok(3),
        other => Err(TransformError::InvalidGeometry(format!(
            "rotation must be 90, 180 or 270 degrees, got {other}"
        ))),
    }
}

/// Canvas size after rotating by `turns` quarter turns. The canvas expands:
/// odd turns swap the axes.
pub fn rotated_dimensions(source: Dimensions, turns: u8) -> Dimensions {
    if turns % 2 == 1 {
        Dimensions::new(source.height, source.width)
    } else {
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h)
    }

    // =========================================================================
    // normalize_dimensions
    // =========================================================================

    #[test]
    fn normalize_both_zero_is_identity() {
        assert_eq!(normalize_dimensions((0, 0), dims(800, 600)), dims(800, 600));
    }

    #[test]
    fn normalize_zero_height_falls_back_to_intrinsic() {
        // Not proportional: 400 wide keeps the full 600 height
        assert_eq!(normalize_dimensions((400, 0), dims(800, 600)), dims(400, 600));
    }

    #[test]
    fn normalize_zero_width_falls_back_to_intrinsic() {
        assert_eq!(normalize_dimensions((0, 300), dims(800, 600)), dims(800, 300));
    }

    #[test]
    fn normalize_keeps_explicit_values() {
        assert_eq!(normalize_dimensions((10, 20), dims(800, 600)), dims(10, 20));
    }

    // =========================================================================
    // cover_crop / center_crop_origin
    // =========================================================================

    #[test]
    fn cover_crop_wider_source_to_portrait_target() {
        // 800x600 → 400x500 (4:5): full height, width = 600 * 4/5 = 480
        assert_eq!(cover_crop(dims(800, 600), dims(400, 500)), dims(480, 600));
    }

    #[test]
    fn cover_crop_taller_source_to_landscape_target() {
        assert_eq!(cover_crop(dims(600, 800), dims(500, 400)), dims(600, 480));
    }

    #[test]
    fn cover_crop_same_aspect_ratio_keeps_source() {
        assert_eq!(cover_crop(dims(800, 600), dims(400, 300)), dims(800, 600));
    }

    #[test]
    fn cover_crop_panorama_to_square() {
        assert_eq!(cover_crop(dims(4000, 100), dims(300, 300)), dims(100, 100));
    }

    #[test]
    fn cover_crop_extreme_target_never_zero() {
        assert_eq!(cover_crop(dims(100, 100), dims(1, 10_000)), dims(1, 100));
    }

    #[test]
    fn crop_origin_is_centered() {
        assert_eq!(center_crop_origin(dims(800, 600), dims(600, 600)), (100, 0));
        assert_eq!(center_crop_origin(dims(100, 100), dims(100, 100)), (0, 0));
    }

    // =========================================================================
    // fit_dimensions
    // =========================================================================

    #[test]
    fn fit_landscape_into_square() {
        assert_eq!(fit_dimensions(dims(800, 600), dims(400, 400)), dims(400, 300));
    }

    #[test]
    fn fit_portrait_into_square() {
        assert_eq!(fit_dimensions(dims(600, 800), dims(400, 400)), dims(300, 400));
    }

    #[test]
    fn fit_upscales_small_sources() {
        assert_eq!(fit_dimensions(dims(100, 50), dims(400, 400)), dims(400, 200));
    }

    #[test]
    fn fit_extreme_aspect_never_zero() {
        assert_eq!(fit_dimensions(dims(10_000, 1), dims(100, 100)), dims(100, 1));
    }

    // =========================================================================
    // rotation
    // =========================================================================

    #[test]
    fn quarter_turns_accepts_right_angles() {
        assert_eq!(quarter_turns(90).unwrap(), 1);
        assert_eq!(quarter_turns(180).unwrap(), 2);
        assert_eq!(quarter_turns(270).unwrap(), 3);
        assert_eq!(quarter_turns(450).unwrap(), 1);
    }

    #[test]
    fn quarter_turns_rejects_other_angles() {
        assert!(quarter_turns(0).is_err());
        assert!(quarter_turns(45).is_err());
        assert!(quarter_turns(360).is_err());
    }

    #[test]
    fn rotation_expands_canvas_on_odd_turns() {
        assert_eq!(rotated_dimensions(dims(800, 600), 1), dims(600, 800));
        assert_eq!(rotated_dimensions(dims(800, 600), 2), dims(800, 600));
        assert_eq!(rotated_dimensions(dims(800, 600), 3), dims(600, 800));
    }

    proptest! {
        #[test]
        fn cover_crop_stays_inside_source(
            sw in 1u32..4000, sh in 1u32..4000,
            tw in 1u32..2000, th in 1u32..2000,
        ) {
            let crop = cover_crop(dims(sw, sh), dims(tw, th));
            prop_assert!(crop.width >= 1 && crop.width <= sw);
            prop_assert!(crop.height >= 1 && crop.height <= sh);
            prop_assert!(crop.width == sw || crop.height == sh);
        }

        #[test]
        fn fit_stays_within_bounds(
            sw in 1u32..4000, sh in 1u32..4000,
            bw in 1u32..2000, bh in 1u32..2000,
        ) {
            let fitted = fit_dimensions(dims(sw, sh), dims(bw, bh));
            prop_assert!(fitted.width >= 1 && fitted.width <= bw);
            prop_assert!(fitted.height >= 1 && fitted.height <= bh);
        }
    }
}
