//! Processing-size resizer
//!
//! Images are shrunk so their larger side fits a bound before the expensive
//! stages run; the scale factor lets callers restore the original size.

use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Target dimensions and scale when `(width, height)` exceeds `max_dimension`
///
/// Returns `None` when the larger side already fits. A `max_dimension` of 0
/// can never be met and is treated as no bound, so it also returns `None`.
/// Scaled sides are rounded to the nearest integer and never drop below one
/// pixel.
#[must_use]
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<((u32, u32), f32)> {
    let larger = width.max(height);
    if max_dimension == 0 || larger <= max_dimension {
        return None;
    }

    let scale = max_dimension as f32 / larger as f32;
    let scale_side = |side: u32| ((side as f32 * scale).round() as u32).max(1);
    Some(((scale_side(width), scale_side(height)), scale))
}

/// Shrink `image` so that its larger side is at most `max_dimension`
///
/// Images that already fit, or a `max_dimension` of 0, come back unchanged
/// with a scale of `1.0`.
/// Otherwise both sides are scaled by `max_dimension / max(width, height)`
/// and resampled with a Lanczos filter.
#[must_use]
pub fn resize_for_processing(image: &DynamicImage, max_dimension: u32) -> (DynamicImage, f32) {
    let (width, height) = image.dimensions();
    match scaled_dimensions(width, height, max_dimension) {
        None => (image.clone(), 1.0),
        Some(((new_width, new_height), scale)) => {
            tracing::debug!(
                from = %format!("{width}x{height}"),
                to = %format!("{new_width}x{new_height}"),
                scale,
                "Resizing for processing"
            );
            (
                image.resize_exact(new_width, new_height, FilterType::Lanczos3),
                scale,
            )
        },
    }
}

/// Resample `image` to exact dimensions with a Lanczos filter
#[must_use]
pub fn resize_to(image: &DynamicImage, dimensions: (u32, u32)) -> DynamicImage {
    if image.dimensions() == dimensions {
        return image.clone();
    }
    image.resize_exact(dimensions.0, dimensions.1, FilterType::Lanczos3)
}
