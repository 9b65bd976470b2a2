//! Unified recolor processor
//!
//! `ColorizerProcessor` ties an injected matte provider to a
//! [`ColorizerConfig`] and runs the full color-change request: hex parsing,
//! parameter validation, mask extraction (unless a cached mask is supplied)
//! and the recolor stage. The CLI and library callers share it.

use crate::{
    config::ColorizerConfig,
    error::{RecolorError, Result},
    inference::ForegroundMatteProvider,
    pipeline,
    services::ImageIOService,
    types::{
        MaskExtraction, MaskSource, ProcessingTimings, RecolorParams, RecolorResult,
        SegmentationMask,
    },
    utils::Color,
};
use image::{DynamicImage, GenericImageView};
use instant::Instant;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use tracing::{instrument, span, Level};

/// Mask extraction and recoloring with one matte provider
#[derive(Clone)]
pub struct ColorizerProcessor {
    config: ColorizerConfig,
    provider: Arc<dyn ForegroundMatteProvider>,
}

impl std::fmt::Debug for ColorizerProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorizerProcessor")
            .field("config", &self.config)
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl ColorizerProcessor {
    /// Create a processor around a shared provider
    ///
    /// # Errors
    /// - `InvalidConfig` when `config` fails validation
    pub fn new(config: ColorizerConfig, provider: Arc<dyn ForegroundMatteProvider>) -> Result<Self> {
        config.validate()?;
        info!(
            "Recolor processor ready (provider: {}, max dimension: {})",
            provider.name(),
            config.max_dimension
        );
        Ok(Self { config, provider })
    }

    /// Create a processor that takes ownership of `provider`
    ///
    /// # Errors
    /// - `InvalidConfig` when `config` fails validation
    pub fn with_provider<P>(config: ColorizerConfig, provider: P) -> Result<Self>
    where
        P: ForegroundMatteProvider + 'static,
    {
        Self::new(config, Arc::new(provider))
    }

    #[must_use]
    pub fn config(&self) -> &ColorizerConfig {
        &self.config
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Extract the object mask for `image`
    ///
    /// Never fails: provider problems produce the centered fallback mask,
    /// reported through [`MaskExtraction::source`]. When
    /// `extraction_refinement` is configured the mask is dilated and blurred
    /// before it is returned.
    #[instrument(skip(self, image), fields(
        provider = %self.provider.name(),
        dimensions = %format!("{}x{}", image.width(), image.height())
    ))]
    pub fn extract_mask(&self, image: &DynamicImage) -> MaskExtraction {
        let mut extraction = pipeline::extract_mask_with_source(
            image,
            self.provider.as_ref(),
            &self.config.matting,
            self.config.max_dimension,
        );

        if let Some(refinement) = self.config.extraction_refinement {
            match refinement.apply(&extraction.mask) {
                Ok(refined) => extraction.mask = refined,
                Err(e) => tracing::warn!(error = %e, "Extraction refinement failed, keeping raw mask"),
            }
        }

        debug!(
            "Mask extracted from {} ({} foreground pixels)",
            extraction.source,
            extraction.mask.statistics().foreground_pixels
        );
        extraction
    }

    /// Change the object's color
    ///
    /// `cached_mask` skips extraction; otherwise a mask is computed first and
    /// returned in [`RecolorResult::source_mask`] for reuse.
    ///
    /// # Errors
    /// - `InvalidColor` when `color_hex` is not a 6-digit hex color
    /// - `InvalidConfig` when `params` are out of range
    ///
    /// # Examples
    /// ```rust,no_run
    /// # #[cfg(feature = "rembg")]
    /// # fn example() -> recolorize::Result<()> {
    /// use recolorize::{ColorizerConfig, ColorizerProcessor, RecolorParams, RembgCommandProvider};
    ///
    /// let processor = ColorizerProcessor::with_provider(
    ///     ColorizerConfig::default(),
    ///     RembgCommandProvider::new()?,
    /// )?;
    /// let image = image::open("car.jpg")?;
    /// let red = processor.recolor(&image, "#FF3333", &RecolorParams::default(), None)?;
    /// let blue = processor.recolor(&image, "#0066CC", &RecolorParams::default(), Some(&red.source_mask))?;
    /// blue.save_png("car-blue.png")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn recolor(
        &self,
        image: &DynamicImage,
        color_hex: &str,
        params: &RecolorParams,
        cached_mask: Option<&SegmentationMask>,
    ) -> Result<RecolorResult> {
        let color = Color::from_hex(color_hex)?;
        self.recolor_with_color(image, color, params, cached_mask)
    }

    /// [`Self::recolor`] with an already parsed color
    ///
    /// # Errors
    /// - `InvalidConfig` when `params` are out of range
    pub fn recolor_with_color(
        &self,
        image: &DynamicImage,
        color: Color,
        params: &RecolorParams,
        cached_mask: Option<&SegmentationMask>,
    ) -> Result<RecolorResult> {
        params.validate()?;
        let total_start = Instant::now();

        match cached_mask {
            Some(mask) => self.run_recolor(
                image,
                color,
                params,
                mask,
                MaskSource::Cached,
                None,
                total_start,
            ),
            None => {
                let extraction_start = Instant::now();
                let extraction = self.extract_mask(image);
                let extraction_ms = extraction_start.elapsed().as_millis() as u64;
                self.run_recolor(
                    image,
                    color,
                    params,
                    &extraction.mask,
                    extraction.source,
                    Some(extraction_ms),
                    total_start,
                )
            },
        }
    }

    /// Recolor with a mask of known origin
    ///
    /// # Errors
    /// - `InvalidConfig` when `params` are out of range
    pub fn recolor_with_mask(
        &self,
        image: &DynamicImage,
        color: Color,
        params: &RecolorParams,
        mask: &SegmentationMask,
        mask_source: MaskSource,
    ) -> Result<RecolorResult> {
        params.validate()?;
        self.run_recolor(image, color, params, mask, mask_source, None, Instant::now())
    }

    /// Decode `image_bytes` and recolor
    ///
    /// # Errors
    /// - Image decoding failures
    /// - Any error from [`Self::recolor`]
    pub fn recolor_bytes(
        &self,
        image_bytes: &[u8],
        color_hex: &str,
        params: &RecolorParams,
        cached_mask: Option<&SegmentationMask>,
    ) -> Result<RecolorResult> {
        let image = ImageIOService::load_from_bytes(image_bytes)?;
        self.recolor(&image, color_hex, params, cached_mask)
    }

    /// Load an image file and recolor
    ///
    /// # Errors
    /// - File I/O and decoding failures
    /// - Any error from [`Self::recolor`]
    pub fn recolor_file<P: AsRef<Path>>(
        &self,
        input_path: P,
        color_hex: &str,
        params: &RecolorParams,
        cached_mask: Option<&SegmentationMask>,
    ) -> Result<RecolorResult> {
        let image = ImageIOService::load_image(input_path)?;
        self.recolor(&image, color_hex, params, cached_mask)
    }

    /// Run [`Self::recolor`] on tokio's blocking pool
    ///
    /// # Errors
    /// - Any error from [`Self::recolor`]
    /// - `Internal` when the blocking task panics or is cancelled
    pub async fn recolor_in_background(
        &self,
        image: DynamicImage,
        color_hex: String,
        params: RecolorParams,
        cached_mask: Option<SegmentationMask>,
    ) -> Result<RecolorResult> {
        let processor = self.clone();
        tokio::task::spawn_blocking(move || {
            processor.recolor(&image, &color_hex, &params, cached_mask.as_ref())
        })
        .await
        .map_err(|e| RecolorError::internal(format!("Recolor task failed: {e}")))?
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all, fields(
        color = %color,
        intensity = params.intensity,
        edge_smooth = params.edge_smooth,
        mask_source = %mask_source
    ))]
    fn run_recolor(
        &self,
        image: &DynamicImage,
        color: Color,
        params: &RecolorParams,
        mask: &SegmentationMask,
        mask_source: MaskSource,
        extraction_ms: Option<u64>,
        total_start: Instant,
    ) -> Result<RecolorResult> {
        let original_dimensions = image.dimensions();

        let recolor_start = Instant::now();
        let (recolored, refined) = {
            let _span = span!(
                Level::DEBUG,
                "recolor",
                width = original_dimensions.0,
                height = original_dimensions.1
            )
            .entered();
            pipeline::recolor(
                image,
                color,
                params.intensity,
                Some(mask),
                params.edge_smooth,
                self.config.max_dimension,
            )
        };
        let recolor_ms = recolor_start.elapsed().as_millis() as u64;

        let timings = ProcessingTimings {
            extraction_ms,
            recolor_ms,
            total_ms: total_start.elapsed().as_millis() as u64,
        };
        debug!("Recolored to {} in {}ms", color, timings.total_ms);

        Ok(RecolorResult {
            image: recolored,
            mask: refined,
            source_mask: mask.clone(),
            mask_source,
            color,
            params: *params,
            original_dimensions,
            timings,
        })
    }
}
