//! Output format handling service

use crate::config::OutputFormat;
use std::path::Path;

/// Service for output format decisions
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// File extension (without the dot) for a given output format
    ///
    /// # Examples
    /// ```rust
    /// use recolorize::{services::OutputFormatHandler, config::OutputFormat};
    ///
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpeg), "jpg");
    /// ```
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Output format implied by a path's extension
    #[must_use]
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<OutputFormat> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "webp" => Some(OutputFormat::WebP),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    /// Check if a format keeps an alpha channel
    #[must_use]
    pub fn supports_transparency(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png | OutputFormat::WebP | OutputFormat::Tiff => true,
            OutputFormat::Jpeg => false,
        }
    }

    /// Warn when an input with transparency is about to lose it
    pub fn warn_if_alpha_lost(format: OutputFormat, has_alpha: bool) {
        if has_alpha && !Self::supports_transparency(format) {
            log::warn!(
                "Output format {} does not support transparency; the alpha channel will be dropped",
                format
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_extension() {
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpeg), "jpg");
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::WebP), "webp");
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Tiff), "tiff");
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(
            OutputFormatHandler::from_extension("out/photo.JPEG"),
            Some(OutputFormat::Jpeg)
        );
        assert_eq!(
            OutputFormatHandler::from_extension("a.tif"),
            Some(OutputFormat::Tiff)
        );
        assert_eq!(OutputFormatHandler::from_extension("a.bmp"), None);
        assert_eq!(OutputFormatHandler::from_extension("noext"), None);
    }

    #[test]
    fn test_supports_transparency() {
        assert!(OutputFormatHandler::supports_transparency(OutputFormat::Png));
        assert!(OutputFormatHandler::supports_transparency(OutputFormat::WebP));
        assert!(!OutputFormatHandler::supports_transparency(OutputFormat::Jpeg));
    }
}
