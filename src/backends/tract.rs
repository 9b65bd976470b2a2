//! Tract matte provider for salient-object ONNX models
//!
//! Runs a U²-Net style model with Tract, a pure Rust inference library with
//! no native dependencies. The saliency map becomes the alpha channel of the
//! returned PNG, optionally refined with the trimap pass from
//! [`apply_trimap_refinement`].

use crate::{
    error::{RecolorError, Result},
    inference::{apply_trimap_refinement, ForegroundMatteProvider, MattingOptions},
    utils::{ImagePreprocessor, PreprocessingConfig},
};
use image::{DynamicImage, GenericImageView, GrayImage, Rgba, RgbaImage};
use instant::Instant;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// File name looked up in the model cache directory
pub const DEFAULT_MODEL_FILE: &str = "u2net.onnx";

/// Tract-backed matte provider
#[derive(Debug)]
pub struct TractMatteProvider {
    model: TractModel,
    model_path: PathBuf,
    preprocessing: PreprocessingConfig,
}

impl TractMatteProvider {
    /// Default model location: `<cache dir>/recolorize/models/u2net.onnx`
    #[must_use]
    pub fn default_model_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("recolorize").join("models").join(DEFAULT_MODEL_FILE))
    }

    /// Load a U²-Net model from disk
    ///
    /// # Errors
    /// - Model file missing
    /// - ONNX parsing, optimisation or planning failures
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_config(path, PreprocessingConfig::u2net())
    }

    /// Load a model with custom preprocessing parameters
    ///
    /// # Errors
    /// - Model file missing
    /// - ONNX parsing, optimisation or planning failures
    pub fn with_config<P: AsRef<Path>>(path: P, preprocessing: PreprocessingConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RecolorError::matting(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let load_start = Instant::now();
        let side = preprocessing.target_size as usize;

        log::info!("Loading Tract matte model from {}", path.display());

        let model = onnx()
            .model_for_path(path)
            .map_err(|e| RecolorError::matting(format!("Failed to load ONNX model: {e}")))?
            .with_input_fact(0, f32::fact([1, 3, side, side]).into())
            .map_err(|e| RecolorError::matting(format!("Failed to set model input shape: {e}")))?
            .into_optimized()
            .map_err(|e| RecolorError::matting(format!("Failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| RecolorError::matting(format!("Failed to create runnable model: {e}")))?;

        log::info!(
            "Tract matte model ready in {}ms",
            load_start.elapsed().as_millis()
        );

        Ok(Self {
            model,
            model_path: path.to_path_buf(),
            preprocessing,
        })
    }

    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Run the model and return its saliency map at the image's size
    fn saliency(&self, image: &DynamicImage) -> Result<GrayImage> {
        let side = self.preprocessing.target_size as usize;
        let input = ImagePreprocessor::preprocess_for_inference(image, &self.preprocessing)?;
        let data = input
            .as_slice()
            .ok_or_else(|| RecolorError::internal("Input tensor is not contiguous"))?;
        let tensor = Tensor::from_shape(&[1, 3, side, side], data)
            .map_err(|e| RecolorError::matting(format!("Failed to build input tensor: {e}")))?;

        let inference_start = Instant::now();
        let outputs = self
            .model
            .run(tvec!(tensor.into()))
            .map_err(|e| RecolorError::matting(format!("Tract inference failed: {e}")))?;
        log::debug!(
            "Tract inference completed in {}ms",
            inference_start.elapsed().as_millis()
        );

        let output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| RecolorError::matting("No output tensor found"))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| RecolorError::matting(format!("Failed to read output tensor: {e}")))?;

        let shape = view.shape();
        let (height, width) = match shape {
            [.., h, w] => (*h, *w),
            _ => {
                return Err(RecolorError::matting(format!(
                    "Unexpected output tensor shape {shape:?}"
                )))
            },
        };

        // first channel of the first batch
        let values: Vec<f32> = view.iter().take(height * width).copied().collect();
        ImagePreprocessor::saliency_to_alpha(
            &values,
            (width as u32, height as u32),
            image.dimensions(),
        )
    }
}

impl ForegroundMatteProvider for TractMatteProvider {
    fn name(&self) -> &str {
        "tract-u2net"
    }

    fn matte(&self, png_bytes: &[u8], options: &MattingOptions) -> Result<Vec<u8>> {
        let image = image::load_from_memory(png_bytes)?;
        let alpha = apply_trimap_refinement(&self.saliency(&image)?, options);
        let rgb = image.to_rgb8();

        let cutout = RgbaImage::from_fn(image.width(), image.height(), |x, y| {
            let p = rgb.get_pixel(x, y);
            Rgba([p[0], p[1], p[2], alpha.get_pixel(x, y)[0]])
        });

        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(cutout)
            .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        Ok(buffer)
    }
}
