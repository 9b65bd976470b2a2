//! Mask-weighted recoloring
//!
//! Each pixel is converted to luma, tinted toward the target color, blended
//! with the original by the intensity, and finally mixed back by the refined
//! mask weight. With a zero weight a pixel leaves untouched.

use crate::{
    error::{RecolorError, Result},
    pipeline::{
        refine::refine_mask,
        resize::{resize_for_processing, resize_to},
    },
    types::SegmentationMask,
    utils::Color,
};
use image::{DynamicImage, GenericImageView};

/// Dilation applied to the mask before recoloring
pub const RECOLOR_EXPAND_PIXELS: u32 = 1;

/// Recolor the masked object of `image`
///
/// Without a mask the image comes back unchanged together with `None`.
/// Internal failures are logged and yield the original image with the mask
/// that was passed in. On success the second value is the refined mask at
/// processing resolution.
#[must_use]
pub fn recolor(
    image: &DynamicImage,
    color: Color,
    intensity: f32,
    mask: Option<&SegmentationMask>,
    edge_smooth: u32,
    max_dimension: u32,
) -> (DynamicImage, Option<SegmentationMask>) {
    let Some(mask) = mask else {
        return (image.clone(), None);
    };

    match try_recolor(image, color, intensity, mask, edge_smooth, max_dimension) {
        Ok((recolored, refined)) => (recolored, Some(refined)),
        Err(e) => {
            tracing::warn!(error = %e, "Recolor failed, returning original image");
            (image.clone(), Some(mask.clone()))
        },
    }
}

/// Recolor without the passthrough on failure
///
/// # Errors
/// - Intensity is NaN or infinite
/// - The mask does not match the image at processing resolution
pub fn try_recolor(
    image: &DynamicImage,
    color: Color,
    intensity: f32,
    mask: &SegmentationMask,
    edge_smooth: u32,
    max_dimension: u32,
) -> Result<(DynamicImage, SegmentationMask)> {
    if !intensity.is_finite() {
        return Err(RecolorError::recolor(format!(
            "Intensity must be a finite number, got {intensity}"
        )));
    }
    let intensity = intensity.clamp(0.0, 1.0);
    let original_dimensions = image.dimensions();

    let (processing_image, scale) = resize_for_processing(image, max_dimension);
    let processing_dimensions = processing_image.dimensions();
    let processing_mask = if scale < 1.0 {
        mask.resize(processing_dimensions.0, processing_dimensions.1)?
    } else {
        mask.clone()
    };
    if processing_mask.dimensions != processing_dimensions {
        return Err(RecolorError::dimension_mismatch(
            processing_dimensions,
            processing_mask.dimensions,
        ));
    }

    let refined = refine_mask(&processing_mask, edge_smooth, RECOLOR_EXPAND_PIXELS)?;
    let blended = blend_recolor(&processing_image, color, intensity, &refined)?;

    let output = if scale < 1.0 {
        resize_to(&blended, original_dimensions)
    } else {
        blended
    };
    Ok((output, refined))
}

/// ITU-R 601-2 luma, rounded the way common imaging libraries do it
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Blend `image` toward `color` weighted by `intensity` and `weights`
///
/// `weights` must match the image dimensions. RGBA inputs keep their alpha
/// channel; every other color type is recolored as RGB.
///
/// # Errors
/// - `DimensionMismatch` when `weights` and `image` differ in size
pub fn blend_recolor(
    image: &DynamicImage,
    color: Color,
    intensity: f32,
    weights: &SegmentationMask,
) -> Result<DynamicImage> {
    let dimensions = image.dimensions();
    if weights.dimensions != dimensions
        || weights.data.len() != dimensions.0 as usize * dimensions.1 as usize
    {
        return Err(RecolorError::dimension_mismatch(
            dimensions,
            weights.dimensions,
        ));
    }

    let target = color.channels_f32();
    let keep = 1.0 - intensity;
    let mut rgba = image.to_rgba8();

    for (pixel, &weight) in rgba.pixels_mut().zip(&weights.data) {
        if weight == 0 {
            continue;
        }
        let m = f32::from(weight) / 255.0;
        let gray = f32::from(luma(pixel[0], pixel[1], pixel[2])) / 255.0;

        for (channel, target) in pixel.0.iter_mut().take(3).zip(target) {
            let original = f32::from(*channel);
            let blended = original * keep + gray * target * intensity;
            let mixed = original * (1.0 - m) + blended * m;
            *channel = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }

    if image.color().has_alpha() {
        Ok(DynamicImage::ImageRgba8(rgba))
    } else {
        Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[test]
    fn test_luma_of_primaries_and_gray() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(128, 128, 128), 128);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_no_mask_passthrough() {
        let image = solid(8, 8, [10, 20, 30]);
        let (out, mask) = recolor(&image, Color::new(255, 0, 0), 0.7, None, 2, 512);
        assert!(mask.is_none());
        assert_eq!(out.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_full_mask_full_intensity_on_gray() {
        let image = solid(100, 100, [128, 128, 128]);
        let mask = SegmentationMask::filled(100, 100, 255);
        let (out, refined) = recolor(&image, Color::new(255, 0, 0), 1.0, Some(&mask), 0, 512);

        assert_eq!(refined.unwrap().dimensions, (100, 100));
        let out = out.to_rgb8();
        for pixel in out.pixels() {
            assert_eq!(pixel.0, [128, 0, 0]);
        }
    }

    #[test]
    fn test_zero_weight_pixels_untouched() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(30, 30, |x, y| {
            Rgb([(x * 8) as u8, (y * 8) as u8, 200])
        }));
        let mut mask = SegmentationMask::filled(30, 30, 0);
        for y in 10..20 {
            for x in 10..20 {
                mask.data[(y * 30 + x) as usize] = 255;
            }
        }

        let (out, refined) = recolor(&image, Color::new(0, 255, 0), 0.9, Some(&mask), 1, 512);
        let refined = refined.unwrap();
        let (out, original) = (out.to_rgb8(), image.to_rgb8());

        let mut untouched = 0;
        for (x, y, pixel) in out.enumerate_pixels() {
            if refined.get(x, y) == Some(0) {
                assert_eq!(pixel, original.get_pixel(x, y), "pixel ({x}, {y})");
                untouched += 1;
            }
        }
        assert!(untouched > 0);
        assert_ne!(out.get_pixel(15, 15), original.get_pixel(15, 15));
    }

    #[test]
    fn test_fixed_halo_reaches_recolor_stage() {
        let image = solid(11, 11, [128, 128, 128]);
        let mut mask = SegmentationMask::filled(11, 11, 0);
        mask.data[5 * 11 + 5] = 255;

        let (out, refined) = recolor(&image, Color::new(255, 0, 0), 1.0, Some(&mask), 0, 512);
        assert_eq!(refined.unwrap().statistics().foreground_pixels, 9);

        for (x, y, pixel) in out.to_rgb8().enumerate_pixels() {
            let in_halo = (4..=6).contains(&x) && (4..=6).contains(&y);
            let expected = if in_halo { [128, 0, 0] } else { [128, 128, 128] };
            assert_eq!(pixel.0, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_zero_intensity_is_identity() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, 99])
        }));
        let mask = SegmentationMask::filled(16, 16, 255);
        let (out, _) = recolor(&image, Color::new(255, 215, 0), 0.0, Some(&mask), 2, 512);
        assert_eq!(out.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_intensity_is_clamped() {
        let image = solid(4, 4, [128, 128, 128]);
        let mask = SegmentationMask::filled(4, 4, 255);
        let (over, _) = recolor(&image, Color::new(255, 0, 0), 3.0, Some(&mask), 0, 512);
        let (full, _) = recolor(&image, Color::new(255, 0, 0), 1.0, Some(&mask), 0, 512);
        assert_eq!(over.to_rgb8(), full.to_rgb8());

        let (under, _) = recolor(&image, Color::new(255, 0, 0), -1.0, Some(&mask), 0, 512);
        assert_eq!(under.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_nan_intensity_returns_original_and_input_mask() {
        let image = solid(6, 6, [50, 60, 70]);
        let mask = SegmentationMask::filled(6, 6, 255);
        let (out, returned) = recolor(&image, Color::new(1, 2, 3), f32::NAN, Some(&mask), 2, 512);
        assert_eq!(out.to_rgb8(), image.to_rgb8());
        assert_eq!(returned, Some(mask));
    }

    #[test]
    fn test_mismatched_mask_returns_original() {
        let image = solid(20, 10, [50, 60, 70]);
        let mask = SegmentationMask::filled(10, 10, 255);
        let (out, returned) = recolor(&image, Color::new(255, 0, 0), 1.0, Some(&mask), 2, 512);
        assert_eq!(out.to_rgb8(), image.to_rgb8());
        assert_eq!(returned.as_ref(), Some(&mask));

        let err = try_recolor(&image, Color::new(255, 0, 0), 1.0, &mask, 2, 512).unwrap_err();
        assert!(matches!(err, RecolorError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_large_image_processed_at_bound_and_restored() {
        let image = solid(200, 100, [128, 128, 128]);
        let mask = SegmentationMask::filled(200, 100, 255);
        let (out, refined) = recolor(&image, Color::new(0, 0, 255), 1.0, Some(&mask), 0, 50);

        assert_eq!(out.dimensions(), (200, 100));
        assert_eq!(refined.unwrap().dimensions, (50, 25));
        let center = out.to_rgb8().get_pixel(100, 50).0;
        assert!(center[0] <= 1 && center[1] <= 1, "got {center:?}");
        assert!((i32::from(center[2]) - 128).abs() <= 2, "got {center:?}");
    }

    #[test]
    fn test_alpha_is_preserved() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([128, 128, 128, 77])));
        let mask = SegmentationMask::filled(8, 8, 255);
        let (out, _) = recolor(&image, Color::new(255, 0, 0), 1.0, Some(&mask), 0, 512);

        assert!(out.color().has_alpha());
        let out = out.to_rgba8();
        assert_eq!(out.get_pixel(3, 3).0, [128, 0, 0, 77]);
    }

    #[test]
    fn test_blend_rejects_mismatched_weights() {
        let image = solid(4, 4, [0, 0, 0]);
        let weights = SegmentationMask::filled(4, 3, 255);
        assert!(blend_recolor(&image, Color::new(1, 1, 1), 0.5, &weights).is_err());
    }
}
