//! Test utilities and mock matte providers
//!
//! Mock implementations of [`ForegroundMatteProvider`] so the pipeline can
//! be exercised without model files or the `rembg` executable.

use crate::{
    error::{RecolorError, Result},
    inference::{ForegroundMatteProvider, MattingOptions},
};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use std::sync::{Arc, Mutex};

/// How the mock produces its matte
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Alpha is `alpha` inside the centered box covering `fraction` of each side
    CenteredBox { fraction: f32, alpha: u8 },
    /// Return an error from `matte`
    FailMatte,
    /// Return bytes that are not a decodable image
    InvalidPng,
    /// Return a valid PNG whose dimensions differ from the input
    WrongDimensions,
}

/// Mock matte provider for testing
#[derive(Debug, Clone)]
pub struct MockMatteProvider {
    behavior: MockBehavior,
    /// Call history for verification in tests
    call_history: Arc<Mutex<Vec<String>>>,
    /// Options received on the most recent call
    last_options: Arc<Mutex<Option<MattingOptions>>>,
}

impl MockMatteProvider {
    /// Create a mock whose matte is a fully opaque box over the middle half
    #[must_use]
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::CenteredBox {
            fraction: 0.5,
            alpha: 255,
        })
    }

    #[must_use]
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_history: Arc::new(Mutex::new(Vec::new())),
            last_options: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock that fails every call
    #[must_use]
    pub fn new_failing() -> Self {
        Self::with_behavior(MockBehavior::FailMatte)
    }

    /// Get the call history for verification in tests
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }

    pub fn last_options(&self) -> Option<MattingOptions> {
        *self.last_options.lock().unwrap()
    }

    fn record_call(&self, input: &DynamicImage, options: &MattingOptions) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(format!("matte {}x{}", input.width(), input.height()));
        }
        if let Ok(mut last) = self.last_options.lock() {
            *last = Some(*options);
        }
    }

    fn generate_matte(input: &DynamicImage, fraction: f32, alpha: u8) -> RgbaImage {
        let (width, height) = input.dimensions();
        let rgb = input.to_rgb8();
        let margin_x = (width as f32 * (1.0 - fraction) / 2.0).round() as u32;
        let margin_y = (height as f32 * (1.0 - fraction) / 2.0).round() as u32;

        RgbaImage::from_fn(width, height, |x, y| {
            let p = rgb.get_pixel(x, y);
            let inside = x >= margin_x
                && x < width.saturating_sub(margin_x)
                && y >= margin_y
                && y < height.saturating_sub(margin_y);
            Rgba([p[0], p[1], p[2], if inside { alpha } else { 0 }])
        })
    }

    fn encode(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(image.clone())
            .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        Ok(buffer)
    }
}

impl Default for MockMatteProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ForegroundMatteProvider for MockMatteProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn matte(&self, png_bytes: &[u8], options: &MattingOptions) -> Result<Vec<u8>> {
        let input = image::load_from_memory(png_bytes)?;
        self.record_call(&input, options);

        match self.behavior {
            MockBehavior::CenteredBox { fraction, alpha } => {
                Self::encode(&Self::generate_matte(&input, fraction, alpha))
            },
            MockBehavior::FailMatte => Err(RecolorError::matting("Mock matte provider failed")),
            MockBehavior::InvalidPng => Ok(b"definitely not a png".to_vec()),
            MockBehavior::WrongDimensions => Self::encode(&RgbaImage::from_pixel(
                input.width() + 1,
                input.height(),
                Rgba([0, 0, 0, 255]),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_mock_records_calls_and_options() {
        let provider = MockMatteProvider::new();
        let options = MattingOptions::default();
        provider.matte(&png(8, 6), &options).unwrap();

        assert_eq!(provider.get_call_history(), vec!["matte 8x6".to_string()]);
        assert_eq!(provider.last_options(), Some(options));
    }

    #[test]
    fn test_mock_box_matte_shape() {
        let provider = MockMatteProvider::new();
        let bytes = provider.matte(&png(8, 8), &MattingOptions::default()).unwrap();
        let matte = image::load_from_memory(&bytes).unwrap().to_rgba8();

        assert_eq!(matte.dimensions(), (8, 8));
        assert_eq!(matte.get_pixel(4, 4)[3], 255);
        assert_eq!(matte.get_pixel(0, 0)[3], 0);
        assert_eq!(matte.get_pixel(1, 4)[3], 0);
        assert_eq!(matte.get_pixel(2, 4)[3], 255);
    }

    #[test]
    fn test_failing_mock() {
        let provider = MockMatteProvider::new_failing();
        assert!(provider.matte(&png(4, 4), &MattingOptions::default()).is_err());
        assert_eq!(provider.call_count(), 1);
    }
}
