//! Model input/output tensor conversion
//!
//! Salient-object models of the U²-Net family take a square NCHW tensor of
//! ImageNet-normalised RGB and answer with a single-channel saliency map.

use crate::error::{RecolorError, Result};
use image::{DynamicImage, GrayImage, Luma};
use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// Model preprocessing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Side of the square model input
    pub target_size: u32,
    pub normalization_mean: [f32; 3],
    pub normalization_std: [f32; 3],
}

impl PreprocessingConfig {
    /// Parameters for U²-Net (320x320, ImageNet statistics)
    #[must_use]
    pub fn u2net() -> Self {
        Self {
            target_size: 320,
            normalization_mean: [0.485, 0.456, 0.406],
            normalization_std: [0.229, 0.224, 0.225],
        }
    }
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self::u2net()
    }
}

/// Shared tensor conversion utilities
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Convert an image into a normalised `1x3xSxS` tensor
    ///
    /// The image is stretched to the square input (no padding), scaled by its
    /// brightest sample, then normalised per channel.
    ///
    /// # Errors
    /// - Zero target size
    pub fn preprocess_for_inference(
        image: &DynamicImage,
        config: &PreprocessingConfig,
    ) -> Result<Array4<f32>> {
        let size = config.target_size;
        if size == 0 {
            return Err(RecolorError::invalid_config(
                "Model target size must be positive",
            ));
        }

        let resized = image::imageops::resize(
            &image.to_rgb8(),
            size,
            size,
            image::imageops::FilterType::Lanczos3,
        );

        let max_value = resized
            .as_raw()
            .iter()
            .copied()
            .max()
            .map_or(1e-6, |m| f32::from(m).max(1e-6));

        let side = size as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, side, side));

        #[allow(clippy::indexing_slicing)]
        // Safe: tensor dimensions pre-allocated to match the resized image
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                let value = f32::from(pixel[c]) / max_value;
                tensor[[0, c, y as usize, x as usize]] =
                    (value - config.normalization_mean[c]) / config.normalization_std[c];
            }
        }

        Ok(tensor)
    }

    /// Turn a raw `height x width` saliency map into an 8-bit alpha
    ///
    /// Values are min-max normalised, quantised, then resized to
    /// `target_dimensions` with a Lanczos filter.
    ///
    /// # Errors
    /// - `values` length does not match `map_dimensions`
    pub fn saliency_to_alpha(
        values: &[f32],
        map_dimensions: (u32, u32),
        target_dimensions: (u32, u32),
    ) -> Result<GrayImage> {
        let (map_width, map_height) = map_dimensions;
        if values.len() != map_width as usize * map_height as usize {
            return Err(RecolorError::processing_stage_error(
                "saliency conversion",
                &format!("expected {} values, got {}", map_width * map_height, values.len()),
                Some(&format!("{map_width}x{map_height}")),
            ));
        }

        let (min, max) = values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = (max - min).max(f32::EPSILON);

        let map = GrayImage::from_fn(map_width, map_height, |x, y| {
            let v = values
                .get(y as usize * map_width as usize + x as usize)
                .copied()
                .unwrap_or(min);
            Luma([(((v - min) / range) * 255.0).clamp(0.0, 255.0) as u8])
        });

        if map.dimensions() == target_dimensions {
            return Ok(map);
        }
        Ok(image::imageops::resize(
            &map,
            target_dimensions.0,
            target_dimensions.1,
            image::imageops::FilterType::Lanczos3,
        ))
    }
}
