//! Matte provider implementations
//!
//! - Tract provider (pure Rust ONNX inference of a U²-Net style model)
//! - rembg provider (external `rembg` executable)
//! - `NoMatteProvider`, which always defers to the fallback mask

pub mod none;

#[cfg(feature = "tract")]
pub mod tract;

#[cfg(feature = "rembg")]
pub mod rembg;

// Test utilities for provider testing
#[cfg(test)]
pub mod test_utils;

pub use self::none::NoMatteProvider;

#[cfg(feature = "tract")]
pub use self::tract::TractMatteProvider;

#[cfg(feature = "rembg")]
pub use self::rembg::RembgCommandProvider;
