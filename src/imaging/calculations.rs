//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Scale factors are kept as exact fractions (`bound / source`) rather than
//! floats, so `floor(W × ratio)` truncates exactly and the bounding axis lands
//! on its bound instead of one pixel short.

use super::params::Bounds;

/// A scale factor expressed as `num / den`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ratio {
    num: u64,
    den: u64,
}

impl Ratio {
    fn new(num: u32, den: u32) -> Self {
        Self {
            num: num as u64,
            den: den.max(1) as u64,
        }
    }

    /// The smaller of two ratios (compared by cross-multiplication).
    fn min(self, other: Ratio) -> Ratio {
        if self.num * other.den <= other.num * self.den {
            self
        } else {
            other
        }
    }

    /// `floor(value × ratio)`, never below 1.
    fn scale(self, value: u32) -> u32 {
        let scaled = (value as u64 * self.num) / self.den;
        scaled.clamp(1, u32::MAX as u64) as u32
    }
}

/// Calculate output dimensions for a source image and a bounding box.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Optional max width / max height
/// * `preserve_ratio` - Fit within the bounds (true) or stretch to them (false)
///
/// # Returns
/// * `(width, height)` - Output dimensions
///
/// Rules:
/// - No bounds: the source dimensions, unchanged.
/// - Stretch: the bounds taken literally; a missing bound keeps the source's
///   size on that axis.
/// - Fit: one uniform ratio, the smaller of the per-axis ratios when both
///   bounds are set, applied with truncation.
pub fn calculate_target_dimensions(
    source: (u32, u32),
    bounds: Bounds,
    preserve_ratio: bool,
) -> (u32, u32) {
    let (src_w, src_h) = source;

    if bounds.is_unbounded() {
        return source;
    }

    if !preserve_ratio {
        return (
            bounds.max_width.unwrap_or(src_w).max(1),
            bounds.max_height.unwrap_or(src_h).max(1),
        );
    }

    let ratio = match (bounds.max_width, bounds.max_height) {
        (None, Some(max_h)) => Ratio::new(max_h, src_h),
        (Some(max_w), None) => Ratio::new(max_w, src_w),
        (Some(max_w), Some(max_h)) => Ratio::new(max_w, src_w).min(Ratio::new(max_h, src_h)),
        (None, None) => return source,
    };

    (ratio.scale(src_w), ratio.scale(src_h))
}
