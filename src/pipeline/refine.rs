//! Mask refinement: square dilation followed by a Gaussian blur
//!
//! Dilation grows the foreground by a small halo so recoloring overshoots the
//! detected object slightly; the blur then turns the expanded hard edge into
//! a soft transition band. Dilation always runs before the blur.

use crate::{error::Result, types::SegmentationMask};
use image::GrayImage;
use imageproc::distance_transform::Norm;
use serde::{Deserialize, Serialize};

/// A dilate + blur setting pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskRefinement {
    /// Gaussian standard deviation in pixels, 0 disables the blur
    pub blur_radius: u32,

    /// Dilation radius; the structuring element is a square of side `2r+1`
    pub expand_pixels: u32,
}

impl Default for MaskRefinement {
    fn default() -> Self {
        Self {
            blur_radius: 2,
            expand_pixels: 3,
        }
    }
}

impl MaskRefinement {
    #[must_use]
    pub fn new(blur_radius: u32, expand_pixels: u32) -> Self {
        Self {
            blur_radius,
            expand_pixels,
        }
    }

    /// Apply this refinement
    pub fn apply(&self, mask: &SegmentationMask) -> Result<SegmentationMask> {
        refine_mask(mask, self.blur_radius, self.expand_pixels)
    }
}

/// Dilate by `expand_pixels`, then blur with `blur_radius`
///
/// # Errors
/// - The mask data does not fit its declared dimensions
pub fn refine_mask(
    mask: &SegmentationMask,
    blur_radius: u32,
    expand_pixels: u32,
) -> Result<SegmentationMask> {
    let mut gray = mask.to_image()?;
    if gray.width() == 0 || gray.height() == 0 {
        return Ok(mask.clone());
    }

    if expand_pixels > 0 {
        gray = dilate_square(&gray, expand_pixels);
    }

    if blur_radius > 0 {
        gray = imageproc::filter::gaussian_blur_f32(&gray, blur_radius as f32);
    }

    Ok(SegmentationMask::from_gray(gray))
}

/// One dilation with a `(2r+1)x(2r+1)` square structuring element
///
/// Chebyshev dilations compose additively, so radii above `u8::MAX` are
/// applied in steps.
#[must_use]
pub fn dilate_square(gray: &GrayImage, radius: u32) -> GrayImage {
    let mut remaining = radius;
    let mut current = gray.clone();
    while remaining > 0 {
        let step = remaining.min(u32::from(u8::MAX));
        current = imageproc::morphology::dilate(&current, Norm::LInf, step as u8);
        remaining -= step;
    }
    current
}
