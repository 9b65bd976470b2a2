//! Per-upload recolor session
//!
//! One uploaded image, one mask. The mask is extracted on first use and
//! reused for every later color until the image is replaced.

use crate::{
    error::Result,
    processor::ColorizerProcessor,
    types::{MaskExtraction, MaskSource, RecolorParams, RecolorResult, SegmentationMask},
    utils::Color,
};
use image::DynamicImage;
use instant::Instant;

/// An uploaded image with its lazily computed mask
#[derive(Debug, Clone)]
pub struct RecolorSession {
    processor: ColorizerProcessor,
    image: DynamicImage,
    mask: Option<MaskExtraction>,
}

impl RecolorSession {
    #[must_use]
    pub fn new(processor: ColorizerProcessor, image: DynamicImage) -> Self {
        Self {
            processor,
            image,
            mask: None,
        }
    }

    #[must_use]
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    #[must_use]
    pub fn processor(&self) -> &ColorizerProcessor {
        &self.processor
    }

    /// Cached mask, if one has been computed or supplied
    #[must_use]
    pub fn mask(&self) -> Option<&SegmentationMask> {
        self.mask.as_ref().map(|extraction| &extraction.mask)
    }

    /// Origin of the cached mask
    #[must_use]
    pub fn mask_source(&self) -> Option<MaskSource> {
        self.mask.as_ref().map(|extraction| extraction.source)
    }

    /// Use an externally supplied mask instead of extracting one
    pub fn set_mask(&mut self, mask: SegmentationMask) {
        self.mask = Some(MaskExtraction {
            mask,
            source: MaskSource::Cached,
        });
    }

    /// Start over with a new upload; the cached mask is dropped
    pub fn replace_image(&mut self, image: DynamicImage) {
        self.image = image;
        self.mask = None;
    }

    /// Cached extraction, computing it on first call
    pub fn ensure_mask(&mut self) -> &MaskExtraction {
        let processor = &self.processor;
        let image = &self.image;
        self.mask.get_or_insert_with(|| processor.extract_mask(image))
    }

    /// Recolor the session image with `color_hex`
    ///
    /// # Errors
    /// - `InvalidColor` when `color_hex` is malformed
    /// - `InvalidConfig` when `params` are out of range
    pub fn recolor(&mut self, color_hex: &str, params: &RecolorParams) -> Result<RecolorResult> {
        let color = Color::from_hex(color_hex)?;
        self.recolor_with_color(color, params)
    }

    /// [`Self::recolor`] with an already parsed color
    ///
    /// # Errors
    /// - `InvalidConfig` when `params` are out of range
    pub fn recolor_with_color(&mut self, color: Color, params: &RecolorParams) -> Result<RecolorResult> {
        params.validate()?;

        let extraction_start = Instant::now();
        let (extraction, first_use) = match self.mask.take() {
            Some(extraction) => (extraction, false),
            None => (self.processor.extract_mask(&self.image), true),
        };
        let extraction_ms = extraction_start.elapsed().as_millis() as u64;

        let source = if first_use {
            extraction.source
        } else {
            MaskSource::Cached
        };
        let result =
            self.processor
                .recolor_with_mask(&self.image, color, params, &extraction.mask, source);
        self.mask = Some(extraction);

        let mut result = result?;
        if first_use {
            result.timings.extraction_ms = Some(extraction_ms);
            result.timings.total_ms += extraction_ms;
        }
        Ok(result)
    }
}
