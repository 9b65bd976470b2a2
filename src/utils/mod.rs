//! Utility modules
//!
//! - `color`: RGB color values and hex/HSV conversion
//! - `preprocessing`: model input tensors and saliency decoding

pub mod color;
pub mod preprocessing;

pub use color::Color;
pub use preprocessing::{ImagePreprocessor, PreprocessingConfig};
