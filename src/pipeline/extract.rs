//! Object mask extraction
//!
//! The image is shrunk to processing size, handed to a matte provider as PNG,
//! and the returned alpha channel is binarized into a hard foreground mask.
//! Extraction never fails from the caller's point of view: any provider,
//! decode or shape problem yields a centered rectangular fallback mask.

use crate::{
    error::{RecolorError, Result},
    inference::{ForegroundMatteProvider, MattingOptions},
    pipeline::resize::resize_for_processing,
    types::{MaskExtraction, MaskSource, SegmentationMask},
};
use image::{imageops::FilterType, DynamicImage, GenericImageView, GrayImage, ImageFormat};
use instant::Instant;
use std::io::Cursor;

/// Alpha values strictly above this become foreground
pub const MASK_BINARIZE_THRESHOLD: u8 = 180;

/// Extract the foreground mask, substituting the fallback on failure
#[must_use]
pub fn extract_mask<P>(
    image: &DynamicImage,
    provider: &P,
    options: &MattingOptions,
    max_dimension: u32,
) -> SegmentationMask
where
    P: ForegroundMatteProvider + ?Sized,
{
    extract_mask_with_source(image, provider, options, max_dimension).mask
}

/// Like [`extract_mask`] but reports whether the fallback was used
#[must_use]
pub fn extract_mask_with_source<P>(
    image: &DynamicImage,
    provider: &P,
    options: &MattingOptions,
    max_dimension: u32,
) -> MaskExtraction
where
    P: ForegroundMatteProvider + ?Sized,
{
    match try_extract_mask(image, provider, options, max_dimension) {
        Ok(mask) => MaskExtraction {
            mask,
            source: MaskSource::Model,
        },
        Err(e) => {
            let (width, height) = image.dimensions();
            tracing::warn!(
                provider = provider.name(),
                error = %e,
                "Mask extraction failed, using centered fallback mask"
            );
            MaskExtraction {
                mask: fallback_mask(width, height),
                source: MaskSource::Fallback,
            }
        },
    }
}

/// Extraction without the fallback substitution
///
/// # Errors
/// - PNG encoding of the processing image
/// - Provider failures
/// - Undecodable provider output, or output whose size differs from the input
pub fn try_extract_mask<P>(
    image: &DynamicImage,
    provider: &P,
    options: &MattingOptions,
    max_dimension: u32,
) -> Result<SegmentationMask>
where
    P: ForegroundMatteProvider + ?Sized,
{
    let start = Instant::now();
    let original_dimensions = image.dimensions();
    let (processing_image, scale) = resize_for_processing(image, max_dimension);
    let processing_dimensions = processing_image.dimensions();

    let mut png = Vec::new();
    processing_image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    let matte_bytes = provider.matte(&png, options)?;
    let matte = image::load_from_memory(&matte_bytes).map_err(|e| {
        RecolorError::extraction(format!(
            "Provider '{}' returned an undecodable image: {e}",
            provider.name()
        ))
    })?;
    if matte.dimensions() != processing_dimensions {
        return Err(RecolorError::dimension_mismatch(
            processing_dimensions,
            matte.dimensions(),
        ));
    }

    let mut mask = binarize_alpha(&matte);
    if scale < 1.0 {
        mask = image::imageops::resize(
            &mask,
            original_dimensions.0,
            original_dimensions.1,
            FilterType::Lanczos3,
        );
    }

    tracing::debug!(
        provider = provider.name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Mask extracted"
    );
    Ok(SegmentationMask::from_gray(mask))
}

/// Alpha channel thresholded to {0, 255}
///
/// Images without an alpha channel are treated as fully opaque.
#[must_use]
pub fn binarize_alpha(matte: &DynamicImage) -> GrayImage {
    let rgba = matte.to_rgba8();
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let alpha = rgba.get_pixel(x, y)[3];
        image::Luma([if alpha > MASK_BINARIZE_THRESHOLD { 255 } else { 0 }])
    })
}

/// Centered rectangle covering the middle half of each axis
///
/// Rows `[h/4, h - h/4)` and columns `[w/4, w - w/4)` are 255, the rest 0.
#[must_use]
pub fn fallback_mask(width: u32, height: u32) -> SegmentationMask {
    let (x0, x1) = (width / 4, width - width / 4);
    let (y0, y1) = (height / 4, height - height / 4);
    SegmentationMask::from_gray(GrayImage::from_fn(width, height, |x, y| {
        let inside = (x0..x1).contains(&x) && (y0..y1).contains(&y);
        image::Luma([if inside { 255 } else { 0 }])
    }))
}
