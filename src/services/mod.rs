//! Service layer
//!
//! - `ImageIOService`: loading, encoding and saving images and masks
//! - `OutputFormatHandler`: extension and transparency rules per format

pub mod format;
pub mod io;

pub use format::OutputFormatHandler;
pub use io::ImageIOService;
