//! Shared fixtures for integration tests
//!
//! Deterministic matte providers and synthetic images so the pipeline can be
//! exercised without a real segmentation model.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use recolorize::{ForegroundMatteProvider, MattingOptions, RecolorError, Result};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Provider returning a centered opaque box covering `fraction` of each axis
#[derive(Debug, Clone)]
pub struct BoxMatteProvider {
    pub fraction: f32,
    pub alpha: u8,
    calls: Arc<AtomicUsize>,
}

impl BoxMatteProvider {
    pub fn new(fraction: f32) -> Self {
        Self {
            fraction,
            alpha: 255,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ForegroundMatteProvider for BoxMatteProvider {
    fn name(&self) -> &str {
        "box-stub"
    }

    fn matte(&self, png_bytes: &[u8], _options: &MattingOptions) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let input = image::load_from_memory(png_bytes)?;
        let (width, height) = (input.width(), input.height());

        let margin_x = (width as f32 * (1.0 - self.fraction) / 2.0).round() as u32;
        let margin_y = (height as f32 * (1.0 - self.fraction) / 2.0).round() as u32;
        let matte = RgbaImage::from_fn(width, height, |x, y| {
            let inside = x >= margin_x
                && x < width.saturating_sub(margin_x)
                && y >= margin_y
                && y < height.saturating_sub(margin_y);
            Rgba([0, 0, 0, if inside { self.alpha } else { 0 }])
        });
        encode_png(&DynamicImage::ImageRgba8(matte))
    }
}

/// Provider that always errors, standing in for a missing model
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingMatteProvider;

impl ForegroundMatteProvider for FailingMatteProvider {
    fn name(&self) -> &str {
        "failing-stub"
    }

    fn matte(&self, _png_bytes: &[u8], _options: &MattingOptions) -> Result<Vec<u8>> {
        Err(RecolorError::matting("model unavailable"))
    }
}

/// Provider returning bytes that are not an image
#[derive(Debug, Clone, Copy, Default)]
pub struct GarbageMatteProvider;

impl ForegroundMatteProvider for GarbageMatteProvider {
    fn name(&self) -> &str {
        "garbage-stub"
    }

    fn matte(&self, _png_bytes: &[u8], _options: &MattingOptions) -> Result<Vec<u8>> {
        Ok(b"definitely not a png".to_vec())
    }
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Smooth gradient with some structure in every channel
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    }))
}

/// Largest absolute channel difference between two same-size images
pub fn max_channel_diff(a: &DynamicImage, b: &DynamicImage) -> u8 {
    a.to_rgb8()
        .pixels()
        .zip(b.to_rgb8().pixels())
        .flat_map(|(p, q)| p.0.into_iter().zip(q.0).map(|(x, y)| x.abs_diff(y)))
        .max()
        .unwrap_or(0)
}
