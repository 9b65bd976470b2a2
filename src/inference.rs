//! Foreground matte provider abstraction
//!
//! The pretrained background-removal model is an opaque capability: it
//! receives a PNG and answers with a PNG whose alpha channel is the
//! foreground matte. Everything model-specific lives behind
//! [`ForegroundMatteProvider`] so the pipeline can run against a stub.

use crate::error::Result;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use serde::{Deserialize, Serialize};

/// Options forwarded to a matte provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MattingOptions {
    /// Request alpha matting refinement of the raw model output
    pub alpha_matting: bool,

    /// Alpha at or above this is treated as certain foreground
    pub foreground_threshold: u8,

    /// Alpha at or below this is treated as certain background
    pub background_threshold: u8,

    /// Erosion applied to the certain regions of the trimap
    pub erode_size: u32,
}

impl Default for MattingOptions {
    fn default() -> Self {
        Self {
            alpha_matting: true,
            foreground_threshold: 240,
            background_threshold: 10,
            erode_size: 10,
        }
    }
}

/// Trait for background-removal capabilities
pub trait ForegroundMatteProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Compute a foreground matte
    ///
    /// `png_bytes` is a PNG-encoded RGB(A) image. The returned bytes are a
    /// PNG of the same dimensions whose alpha channel holds the matte.
    ///
    /// # Errors
    /// - Model unavailable or failed to load
    /// - Decode/encode failures
    /// - Inference failures
    fn matte(&self, png_bytes: &[u8], options: &MattingOptions) -> Result<Vec<u8>>;
}

impl<P: ForegroundMatteProvider + ?Sized> ForegroundMatteProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn matte(&self, png_bytes: &[u8], options: &MattingOptions) -> Result<Vec<u8>> {
        (**self).matte(png_bytes, options)
    }
}

/// Trimap-based refinement of a soft model alpha
///
/// Pixels at or above the foreground threshold become certain foreground,
/// pixels at or below the background threshold certain background. Both
/// certain regions are eroded by `erode_size`, and the band left between
/// them keeps the model's soft alpha. Soft shadow penumbrae that never reach
/// the foreground threshold therefore never become solid foreground.
#[must_use]
pub fn apply_trimap_refinement(alpha: &GrayImage, options: &MattingOptions) -> GrayImage {
    if !options.alpha_matting {
        return alpha.clone();
    }

    let (width, height) = alpha.dimensions();
    let foreground = GrayImage::from_fn(width, height, |x, y| {
        Luma([if alpha.get_pixel(x, y)[0] >= options.foreground_threshold {
            255
        } else {
            0
        }])
    });
    let background = GrayImage::from_fn(width, height, |x, y| {
        Luma([if alpha.get_pixel(x, y)[0] <= options.background_threshold {
            255
        } else {
            0
        }])
    });

    let (foreground, background) = if options.erode_size > 0 {
        let k = options.erode_size.min(u32::from(u8::MAX)) as u8;
        (
            imageproc::morphology::erode(&foreground, Norm::LInf, k),
            imageproc::morphology::erode(&background, Norm::LInf, k),
        )
    } else {
        (foreground, background)
    };

    GrayImage::from_fn(width, height, |x, y| {
        if foreground.get_pixel(x, y)[0] == 255 {
            Luma([255])
        } else if background.get_pixel(x, y)[0] == 255 {
            Luma([0])
        } else {
            *alpha.get_pixel(x, y)
        }
    })
}
