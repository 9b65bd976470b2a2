//! Configuration types for mask extraction and recoloring

use crate::{error::RecolorError, inference::MattingOptions, pipeline::MaskRefinement};
use serde::{Deserialize, Serialize};

/// Default bound on the larger image dimension during processing
pub const DEFAULT_MAX_DIMENSION: u32 = 512;

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG (keeps any alpha channel)
    Png,
    /// JPEG (alpha is dropped)
    Jpeg,
    /// WebP
    WebP,
    /// TIFF, lossless
    Tiff,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
            Self::Tiff => write!(f, "tiff"),
        }
    }
}

/// Configuration for the recoloring pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorizerConfig {
    /// Larger image dimension is bounded by this during processing
    pub max_dimension: u32,

    /// Options forwarded to the matte provider
    pub matting: MattingOptions,

    /// Optional dilate + blur pass applied to a freshly extracted mask
    /// before it is cached
    pub extraction_refinement: Option<MaskRefinement>,

    /// Output format for saved results
    pub output_format: OutputFormat,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,
}

impl Default for ColorizerConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            matting: MattingOptions::default(),
            extraction_refinement: None,
            output_format: OutputFormat::default(),
            jpeg_quality: 90,
        }
    }
}

impl ColorizerConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use recolorize::{ColorizerConfig, OutputFormat};
    ///
    /// let config = ColorizerConfig::builder()
    ///     .max_dimension(1024)
    ///     .output_format(OutputFormat::Jpeg)
    ///     .jpeg_quality(95)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.max_dimension, 1024);
    /// ```
    #[must_use]
    pub fn builder() -> ColorizerConfigBuilder {
        ColorizerConfigBuilder::default()
    }

    /// Quality setting that applies to the configured output format
    ///
    /// Only JPEG is lossy; WebP is written losslessly like PNG and TIFF.
    #[must_use]
    pub fn output_quality(&self) -> u8 {
        match self.output_format {
            OutputFormat::Jpeg => self.jpeg_quality,
            OutputFormat::Png | OutputFormat::WebP | OutputFormat::Tiff => 100,
        }
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Zero `max_dimension`
    /// - JPEG quality above 100
    /// - Background threshold not below the foreground threshold
    ///
    /// ```rust
    /// use recolorize::ColorizerConfig;
    ///
    /// let mut config = ColorizerConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.max_dimension = 0;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_dimension == 0 {
            return Err(RecolorError::config_value_error(
                "max dimension",
                self.max_dimension,
                "1-u32::MAX",
                Some(DEFAULT_MAX_DIMENSION),
            ));
        }

        if self.jpeg_quality > 100 {
            return Err(RecolorError::config_value_error(
                "JPEG quality",
                self.jpeg_quality,
                "0-100",
                Some(90),
            ));
        }

        if self.matting.background_threshold >= self.matting.foreground_threshold {
            return Err(RecolorError::invalid_config(format!(
                "Matting background threshold {} must be below foreground threshold {}",
                self.matting.background_threshold, self.matting.foreground_threshold
            )));
        }

        Ok(())
    }
}

/// Builder for `ColorizerConfig`
#[derive(Debug, Default)]
pub struct ColorizerConfigBuilder {
    config: ColorizerConfig,
}

impl ColorizerConfigBuilder {
    /// Set the processing size bound
    #[must_use]
    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.config.max_dimension = max_dimension;
        self
    }

    /// Set matte provider options
    #[must_use]
    pub fn matting(mut self, matting: MattingOptions) -> Self {
        self.config.matting = matting;
        self
    }

    /// Enable or disable alpha matting refinement in the provider
    #[must_use]
    pub fn alpha_matting(mut self, enabled: bool) -> Self {
        self.config.matting.alpha_matting = enabled;
        self
    }

    /// Set the provider's foreground confidence threshold
    #[must_use]
    pub fn foreground_threshold(mut self, threshold: u8) -> Self {
        self.config.matting.foreground_threshold = threshold;
        self
    }

    /// Refine extracted masks before they are cached
    #[must_use]
    pub fn extraction_refinement(mut self, refinement: Option<MaskRefinement>) -> Self {
        self.config.extraction_refinement = refinement;
        self
    }

    /// Set output format
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Set JPEG quality
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.min(100);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Any failure reported by [`ColorizerConfig::validate`]
    pub fn build(self) -> crate::Result<ColorizerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ColorizerConfig::default();
        assert_eq!(config.max_dimension, 512);
        assert!(config.matting.alpha_matting);
        assert_eq!(config.matting.foreground_threshold, 240);
        assert!(config.extraction_refinement.is_none());
        assert_eq!(config.output_format, OutputFormat::Png);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_clamps_quality() {
        let config = ColorizerConfig::builder()
            .jpeg_quality(150)
            .build()
            .unwrap();
        assert_eq!(config.jpeg_quality, 100);
    }

    #[test]
    fn test_builder_rejects_zero_dimension() {
        let err = ColorizerConfig::builder().max_dimension(0).build().unwrap_err();
        assert!(err.to_string().contains("max dimension"));
    }

    #[test]
    fn test_inverted_matting_thresholds_rejected() {
        let err = ColorizerConfig::builder()
            .foreground_threshold(5)
            .build()
            .unwrap_err();
        assert!(matches!(err, RecolorError::InvalidConfig(_)));
    }

    #[test]
    fn test_output_quality_follows_format() {
        let mut config = ColorizerConfig::default();
        config.output_format = OutputFormat::Jpeg;
        assert_eq!(config.output_quality(), 90);
        config.output_format = OutputFormat::Png;
        assert_eq!(config.output_quality(), 100);
    }

    #[test]
    fn test_webp_output_is_lossless() {
        let config = ColorizerConfig::builder()
            .output_format(OutputFormat::WebP)
            .jpeg_quality(10)
            .build()
            .unwrap();
        assert_eq!(config.output_quality(), 100);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = ColorizerConfig::builder()
            .max_dimension(300)
            .extraction_refinement(Some(MaskRefinement::new(2, 3)))
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ColorizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
