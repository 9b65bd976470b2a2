//! Error types for recoloring operations

use thiserror::Error;

/// Result type alias for recoloring operations
pub type Result<T> = std::result::Result<T, RecolorError>;

/// Error types for mask extraction and recoloring
#[derive(Error, Debug)]
pub enum RecolorError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding, encoding or buffer errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed color value (e.g. a bad hex string)
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Foreground matte provider failures
    #[error("Matting error: {0}")]
    Matting(String),

    /// Mask extraction failures
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Recolor blending failures
    #[error("Recolor error: {0}")]
    Recolor(String),

    /// Two grids that must share dimensions do not
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// General processing errors
    #[error("Processing error: {0}")]
    Processing(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecolorError {
    /// Create a new invalid color error
    pub fn invalid_color<S: Into<String>>(msg: S) -> Self {
        Self::InvalidColor(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new matting error
    pub fn matting<S: Into<String>>(msg: S) -> Self {
        Self::Matting(msg.into())
    }

    /// Create a new extraction error
    pub fn extraction<S: Into<String>>(msg: S) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a new recolor error
    pub fn recolor<S: Into<String>>(msg: S) -> Self {
        Self::Recolor(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a dimension mismatch error
    #[must_use]
    pub fn dimension_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create matting error with provider context
    pub fn matting_error_with_provider(provider: &str, operation: &str, error: &str) -> Self {
        Self::Matting(format!(
            "{} failed using '{}' provider: {}",
            operation, provider, error
        ))
    }

    /// Create processing error with stage context
    pub fn processing_stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Processing(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }

    /// Whether this error comes from bad caller input rather than a pipeline fault
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidColor(_) | Self::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = RecolorError::invalid_color("#12");
        assert!(matches!(err, RecolorError::InvalidColor(_)));
        assert!(err.is_invalid_input());

        let err = RecolorError::matting("model missing");
        assert!(matches!(err, RecolorError::Matting(_)));
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_error_display() {
        let err = RecolorError::invalid_config("max dimension must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: max dimension must be positive"
        );

        let err = RecolorError::dimension_mismatch((10, 10), (5, 10));
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected (10, 10), got (5, 10)"
        );
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = RecolorError::file_io_error("read image", Path::new("/tmp/photo.jpg"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("read image"));
        assert!(error_string.contains("/tmp/photo.jpg"));

        let err = RecolorError::config_value_error("intensity", 1.5, "0.0-1.0", Some(0.7));
        let error_string = err.to_string();
        assert!(error_string.contains("intensity"));
        assert!(error_string.contains("1.5"));
        assert!(error_string.contains("Recommended: 0.7"));

        let err = RecolorError::matting_error_with_provider("rembg", "Matte", "exit status 1");
        assert!(err.to_string().contains("'rembg' provider"));

        let err = RecolorError::processing_stage_error("refine", "empty mask", Some("0x0"));
        let error_string = err.to_string();
        assert!(error_string.contains("refine"));
        assert!(error_string.contains("0x0"));
    }
}
