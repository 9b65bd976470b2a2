//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliOutputFormat};
use crate::{
    config::{ColorizerConfig, OutputFormat},
    presets::find_preset,
    types::RecolorParams,
    utils::Color,
};
use anyhow::{Context, Result};

/// A requested target color and the suffix used in output file names
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColorTarget {
    pub(crate) label: String,
    pub(crate) color: Color,
}

/// Convert CLI arguments to library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the pipeline configuration from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<ColorizerConfig> {
        ColorizerConfig::builder()
            .max_dimension(cli.max_size)
            .alpha_matting(!cli.no_alpha_matting)
            .output_format(Self::output_format(cli.format))
            .jpeg_quality(cli.jpeg_quality)
            .build()
            .context("Invalid configuration")
    }

    pub(crate) fn output_format(format: CliOutputFormat) -> OutputFormat {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
            CliOutputFormat::Webp => OutputFormat::WebP,
            CliOutputFormat::Tiff => OutputFormat::Tiff,
        }
    }

    pub(crate) fn params(cli: &Cli) -> Result<RecolorParams> {
        let params = RecolorParams::new(cli.intensity, cli.edge_smooth);
        params.validate().context("Invalid recolor parameters")?;
        Ok(params)
    }

    /// Every requested color in flag order: `--color`, then `--preset`, then `--hue`
    pub(crate) fn colors(cli: &Cli) -> Result<Vec<ColorTarget>> {
        let mut targets = Vec::new();

        for hex in &cli.colors {
            let color = Color::from_hex(hex).with_context(|| format!("Invalid --color '{hex}'"))?;
            targets.push(ColorTarget {
                label: color.to_hex().trim_start_matches('#').to_string(),
                color,
            });
        }

        for name in &cli.presets {
            let preset = find_preset(name).with_context(|| {
                format!("Unknown preset '{name}' (see --list-presets)")
            })?;
            targets.push(ColorTarget {
                label: preset.name.to_lowercase(),
                color: preset.color(),
            });
        }

        for &hue in &cli.hues {
            if !(0.0..=360.0).contains(&hue) {
                anyhow::bail!("Invalid --hue {hue}: expected degrees in 0-360");
            }
            targets.push(ColorTarget {
                label: format!("hue{}", hue.round() as u32),
                color: Color::from_hsv((hue / 360.0).rem_euclid(1.0), 1.0, 1.0),
            });
        }

        if targets.is_empty() {
            anyhow::bail!("At least one --color, --preset or --hue is required");
        }
        Ok(targets)
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        Self::params(cli)?;
        Self::colors(cli)?;

        if cli.max_size == 0 {
            anyhow::bail!("--max-size must be positive");
        }

        let single_input =
            matches!(cli.input.as_slice(), [only] if std::path::Path::new(only).is_file());
        if (cli.mask_in.is_some() || cli.mask_out.is_some()) && !single_input {
            anyhow::bail!("--mask-in and --mask-out need exactly one input file");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::main_impl::CliBackend;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("recolorize").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_config_conversion() {
        let cli = parse(&["car.jpg", "--color", "#ff0000", "--max-size", "256", "-f", "jpeg"]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(config.max_dimension, 256);
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert_eq!(config.jpeg_quality, 90);
        assert!(config.matting.alpha_matting);
        assert_eq!(cli.backend, CliBackend::default());
    }

    #[test]
    fn test_colors_in_flag_order() {
        let cli = parse(&["car.jpg", "--preset", "gold", "-c", "0066CC", "--hue", "120"]);
        let colors = CliConfigBuilder::colors(&cli).unwrap();

        let labels: Vec<_> = colors.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["0066cc", "gold", "hue120"]);
        assert_eq!(colors[1].color, Color::new(0xFF, 0xD7, 0x00));
        assert_eq!(colors[2].color, Color::new(0, 255, 0));
    }

    #[test]
    fn test_missing_or_bad_colors_rejected() {
        assert!(CliConfigBuilder::colors(&parse(&["car.jpg"])).is_err());
        assert!(CliConfigBuilder::colors(&parse(&["car.jpg", "-c", "#12"])).is_err());
        assert!(CliConfigBuilder::colors(&parse(&["car.jpg", "-p", "teal"])).is_err());
        assert!(CliConfigBuilder::colors(&parse(&["car.jpg", "--hue", "400"])).is_err());
    }

    #[test]
    fn test_params_validation() {
        let cli = parse(&["car.jpg", "-c", "#ff0000", "--intensity", "1.5"]);
        assert!(CliConfigBuilder::params(&cli).is_err());

        let cli = parse(&["car.jpg", "-c", "#ff0000", "-i", "0.4", "-s", "5"]);
        let params = CliConfigBuilder::params(&cli).unwrap();
        assert_eq!(params, RecolorParams::new(0.4, 5));
    }
}
