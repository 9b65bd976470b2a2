//! Core types for mask extraction and recoloring

use crate::{
    config::OutputFormat,
    error::{RecolorError, Result},
    services::ImageIOService,
    utils::Color,
};
use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Single-channel soft foreground mask
///
/// Values are membership weights: 0 is background, 255 is fully
/// foreground, anything between is a blend weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationMask {
    /// Mask data as grayscale values (0-255), row-major
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Create a new segmentation mask
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Create a mask where every pixel has the same value
    #[must_use]
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self::new(
            vec![value; width as usize * height as usize],
            (width, height),
        )
    }

    /// Create mask from a grayscale image
    #[must_use]
    pub fn from_image(image: &GrayImage) -> Self {
        Self::new(image.as_raw().clone(), image.dimensions())
    }

    /// Create mask by taking ownership of a grayscale image buffer
    #[must_use]
    pub fn from_gray(image: GrayImage) -> Self {
        let dimensions = image.dimensions();
        Self::new(image.into_raw(), dimensions)
    }

    /// Convert mask to a grayscale image
    pub fn to_image(&self) -> Result<GrayImage> {
        let (width, height) = self.dimensions;
        ImageBuffer::from_raw(width, height, self.data.clone()).ok_or_else(|| {
            RecolorError::processing(format!(
                "Mask data length {} does not fit {}x{}",
                self.data.len(),
                width,
                height
            ))
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.dimensions.1
    }

    /// Mask value at `(x, y)`, `None` outside the grid
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        let (width, height) = self.dimensions;
        if x >= width || y >= height {
            return None;
        }
        self.data
            .get(y as usize * width as usize + x as usize)
            .copied()
    }

    /// Resize the mask to new dimensions with a Lanczos filter
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<SegmentationMask> {
        if self.dimensions == (new_width, new_height) {
            return Ok(self.clone());
        }
        let current_image = self.to_image()?;
        let resized = image::imageops::resize(
            &current_image,
            new_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        );

        Ok(SegmentationMask::from_gray(resized))
    }

    /// Whether every value is either 0 or 255
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.data.iter().all(|&v| v == 0 || v == u8::MAX)
    }

    /// Get mask statistics
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total_pixels = self.data.len();
        let foreground_pixels = self.data.iter().filter(|&&x| x > 127).count();
        let background_pixels = total_pixels - foreground_pixels;
        let ratio = |count: usize| {
            if total_pixels == 0 {
                0.0
            } else {
                count as f32 / total_pixels as f32
            }
        };

        MaskStatistics {
            total_pixels,
            foreground_pixels,
            background_pixels,
            foreground_ratio: ratio(foreground_pixels),
            background_ratio: ratio(background_pixels),
        }
    }

    /// Save mask as PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let image = self.to_image()?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Statistics about a segmentation mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub total_pixels: usize,
    pub foreground_pixels: usize,
    pub background_pixels: usize,
    pub foreground_ratio: f32,
    pub background_ratio: f32,
}

/// Where a mask came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskSource {
    /// Produced by the matte provider
    Model,
    /// Centered rectangle substituted after an extraction failure
    Fallback,
    /// Supplied by the caller from an earlier extraction
    Cached,
}

impl std::fmt::Display for MaskSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Fallback => write!(f, "fallback"),
            Self::Cached => write!(f, "cached"),
        }
    }
}

/// Outcome of a mask extraction
#[derive(Debug, Clone)]
pub struct MaskExtraction {
    pub mask: SegmentationMask,
    pub source: MaskSource,
}

impl MaskExtraction {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == MaskSource::Fallback
    }
}

/// User-tunable recolor parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecolorParams {
    /// Blend factor in `[0, 1]`: 0 leaves the object untouched, 1 fully recolors it
    pub intensity: f32,

    /// Gaussian blur radius in pixels applied to the mask edge
    pub edge_smooth: u32,
}

impl Default for RecolorParams {
    fn default() -> Self {
        Self {
            intensity: 0.7,
            edge_smooth: 2,
        }
    }
}

impl RecolorParams {
    #[must_use]
    pub fn new(intensity: f32, edge_smooth: u32) -> Self {
        Self {
            intensity,
            edge_smooth,
        }
    }

    /// Ensure intensity is a finite value in `[0, 1]`
    ///
    /// # Errors
    /// - `InvalidConfig` when intensity is out of range or NaN
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(RecolorError::config_value_error(
                "intensity",
                self.intensity,
                "0.0-1.0",
                Some(0.7),
            ));
        }
        Ok(())
    }
}

/// Timing breakdown for one recolor request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Mask extraction time, absent when a cached mask was used
    pub extraction_ms: Option<u64>,

    /// Refinement, blending and resampling
    pub recolor_ms: u64,

    /// Total wall time
    pub total_ms: u64,
}

/// Result of a recolor request
#[derive(Debug, Clone)]
pub struct RecolorResult {
    /// The recolored image at the original resolution
    pub image: DynamicImage,

    /// Refined mask actually used for blending (at processing resolution)
    pub mask: Option<SegmentationMask>,

    /// Mask the request started from, suitable for caching
    pub source_mask: SegmentationMask,

    /// Where `source_mask` came from
    pub mask_source: MaskSource,

    /// Target color
    pub color: Color,

    /// Parameters the request ran with
    pub params: RecolorParams,

    /// Original image dimensions
    pub original_dimensions: (u32, u32),

    pub timings: ProcessingTimings,
}

impl RecolorResult {
    /// Get image dimensions
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Save the result in the specified format
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        ImageIOService::save_image(&self.image, path, format, quality)
    }

    /// Save the result as PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save(path, OutputFormat::Png, 100)
    }

    /// Get the image as encoded bytes in the specified format
    pub fn to_bytes(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        ImageIOService::encode_image(&self.image, format, quality)
    }

    /// Get timing summary for display
    #[must_use]
    pub fn timing_summary(&self) -> String {
        let t = &self.timings;
        match t.extraction_ms {
            Some(extraction_ms) => format!(
                "Total: {}ms | Extraction: {}ms | Recolor: {}ms | Mask: {}",
                t.total_ms, extraction_ms, t.recolor_ms, self.mask_source
            ),
            None => format!(
                "Total: {}ms | Recolor: {}ms | Mask: {}",
                t.total_ms, t.recolor_ms, self.mask_source
            ),
        }
    }
}
