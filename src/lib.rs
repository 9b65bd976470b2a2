#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Recolorize
//!
//! Change the color of the main object in a photo while keeping the
//! background, shading and texture.
//!
//! A pluggable matte provider returns a foreground alpha matte, which is
//! binarized into an object mask. The mask is softened at the edges and used
//! to blend a luminance-scaled tint of the target color into the object.
//! Masks can be cached and reused to try several colors on one image.
//!
//! ## Features
//!
//! - **Pluggable matting**: pure Rust Tract inference of a U²-Net style ONNX
//!   model, the external `rembg` command, or any [`ForegroundMatteProvider`]
//! - **Never fails on matting**: extraction errors fall back to a centered mask
//! - **Shading preserved**: the tint is scaled by per-pixel luminance
//! - **Bounded cost**: processing happens at a configurable maximum dimension
//! - **Mask reuse**: [`RecolorSession`] extracts once and recolors many times
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recolorize::{ColorizerConfig, ColorizerProcessor, RecolorParams, RecolorSession};
//! # #[cfg(feature = "rembg")]
//! use recolorize::RembgCommandProvider;
//!
//! # #[cfg(feature = "rembg")]
//! # fn example() -> anyhow::Result<()> {
//! let processor =
//!     ColorizerProcessor::with_provider(ColorizerConfig::default(), RembgCommandProvider::new()?)?;
//! let mut session = RecolorSession::new(processor, image::open("car.jpg")?);
//!
//! let params = RecolorParams::new(0.8, 2);
//! session.recolor("#FF3333", &params)?.save_png("car-red.png")?;
//! session.recolor("#0066CC", &params)?.save_png("car-blue.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `tract` (default): pure Rust ONNX matte provider
//! - `rembg` (default): provider that shells out to the `rembg` command
//! - `cli` (default): command-line interface and progress reporting
//! - `webp-support` (default): WebP image format support
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! recolorize = { version = "0.1", default-features = false, features = ["tract"] }
//! ```

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod presets;
pub mod processor;
pub mod record;
pub mod services;
pub mod session;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

use tokio::io::AsyncRead;

// Public API exports
pub use backends::*;
pub use config::{ColorizerConfig, ColorizerConfigBuilder, OutputFormat, DEFAULT_MAX_DIMENSION};
pub use error::{RecolorError, Result};
pub use inference::{ForegroundMatteProvider, MattingOptions};
pub use pipeline::{extract_mask, fallback_mask, recolor, MaskRefinement};
pub use presets::{find_preset, ColorPreset, COLOR_PRESETS};
pub use processor::ColorizerProcessor;
pub use record::ColorizationRecord;
pub use services::{ImageIOService, OutputFormatHandler};
pub use session::RecolorSession;
pub use types::{
    MaskExtraction, MaskSource, ProcessingTimings, RecolorParams, RecolorResult, SegmentationMask,
};
pub use utils::Color;

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, spans, TracingConfig, TracingFormat};

/// Recolor an image read from an async stream
///
/// The stream is read to the end, decoded and recolored on tokio's blocking
/// pool. Pass `cached_mask` to skip extraction.
///
/// ```rust,no_run
/// use recolorize::{recolor_from_reader, ColorizerConfig, ColorizerProcessor, NoMatteProvider, RecolorParams};
/// use tokio::fs::File;
///
/// # async fn example() -> anyhow::Result<()> {
/// let processor = ColorizerProcessor::with_provider(ColorizerConfig::default(), NoMatteProvider)?;
/// let file = File::open("car.jpg").await?;
/// let result = recolor_from_reader(file, "#FFD700", RecolorParams::default(), None, &processor).await?;
/// result.save_png("car-gold.png")?;
/// # Ok(())
/// # }
/// ```
pub async fn recolor_from_reader<R: AsyncRead + Unpin>(
    reader: R,
    color_hex: &str,
    params: RecolorParams,
    cached_mask: Option<SegmentationMask>,
    processor: &ColorizerProcessor,
) -> Result<RecolorResult> {
    let image = ImageIOService::load_from_reader(reader).await?;
    processor
        .recolor_in_background(image, color_hex.to_string(), params, cached_mask)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_recolor_from_reader_with_fallback_mask() {
        let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            16,
            16,
            image::Rgb([128, 128, 128]),
        ));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let processor =
            ColorizerProcessor::with_provider(ColorizerConfig::default(), NoMatteProvider).unwrap();
        let result = recolor_from_reader(
            Cursor::new(bytes),
            "#ff0000",
            RecolorParams::new(1.0, 0),
            None,
            &processor,
        )
        .await
        .unwrap();

        assert_eq!(result.mask_source, MaskSource::Fallback);
        assert_eq!(result.dimensions(), (16, 16));
        assert_eq!(result.image.to_rgb8().get_pixel(0, 0).0, [128, 128, 128]);
    }

    #[tokio::test]
    async fn test_recolor_from_reader_rejects_garbage() {
        let processor =
            ColorizerProcessor::with_provider(ColorizerConfig::default(), NoMatteProvider).unwrap();
        let result = recolor_from_reader(
            Cursor::new(b"not an image".to_vec()),
            "#ff0000",
            RecolorParams::default(),
            None,
            &processor,
        )
        .await;
        assert!(result.is_err());
    }
}
