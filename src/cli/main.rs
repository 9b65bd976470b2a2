//! Recolorize CLI tool
//!
//! Command-line interface for changing the color of the main object in
//! photos. One mask is extracted per input and reused for every requested
//! color.

use super::backend_factory::CliProviderFactory;
use super::config::{CliConfigBuilder, ColorTarget};
use crate::{
    config::{OutputFormat, DEFAULT_MAX_DIMENSION},
    presets::COLOR_PRESETS,
    processor::ColorizerProcessor,
    record::ColorizationRecord,
    services::{ImageIOService, OutputFormatHandler},
    session::RecolorSession,
    tracing_config::{init_cli_tracing, spans},
    types::{MaskSource, RecolorParams},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif"];

/// Object recoloring CLI tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "recolorize")]
pub struct Cli {
    /// Input image files or directories
    #[arg(value_name = "INPUT", required_unless_present = "list_presets")]
    pub input: Vec<String>,

    /// Output file (single input and color) or directory
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Target color as hex (#RRGGBB), repeatable
    #[arg(short = 'c', long = "color", value_name = "HEX")]
    pub colors: Vec<String>,

    /// Target color by preset name (see --list-presets), repeatable
    #[arg(short = 'p', long = "preset", value_name = "NAME")]
    pub presets: Vec<String>,

    /// Target color by hue in degrees at full saturation, repeatable
    #[arg(long = "hue", value_name = "DEGREES")]
    pub hues: Vec<f32>,

    /// Color intensity (0.0 keeps the original, 1.0 fully recolors)
    #[arg(short, long, default_value_t = 0.7)]
    pub intensity: f32,

    /// Mask edge blur radius in pixels
    #[arg(short = 's', long, default_value_t = 2)]
    pub edge_smooth: u32,

    /// Bound on the larger image side during processing
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION)]
    pub max_size: u32,

    /// Matte backend used for mask extraction
    #[arg(short, long, value_enum, default_value_t = CliBackend::default())]
    pub backend: CliBackend,

    /// Model file (tract) or model name (rembg)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Skip alpha matting refinement of the model output
    #[arg(long)]
    pub no_alpha_matting: bool,

    /// Use this grayscale mask instead of extracting one
    #[arg(long, value_name = "PATH")]
    pub mask_in: Option<PathBuf>,

    /// Save the extracted mask as PNG
    #[arg(long, value_name = "PATH")]
    pub mask_out: Option<PathBuf>,

    /// Write a JSON history record for every output
    #[arg(long, value_name = "PATH")]
    pub record: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Png)]
    pub format: CliOutputFormat,

    /// JPEG quality (0-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the color presets and exit
    #[arg(long)]
    pub list_presets: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
    Webp,
    Tiff,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliBackend {
    /// Pure Rust ONNX inference
    Tract,
    /// External `rembg` command
    Rembg,
    /// No model, centered fallback mask
    None,
}

impl Default for CliBackend {
    fn default() -> Self {
        if cfg!(feature = "tract") {
            Self::Tract
        } else if cfg!(feature = "rembg") {
            Self::Rembg
        } else {
            Self::None
        }
    }
}

impl std::fmt::Display for CliBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tract => write!(f, "tract"),
            Self::Rembg => write!(f, "rembg"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Work for one input file
struct FileJob {
    input: PathBuf,
    outputs: Vec<(ColorTarget, PathBuf)>,
    mask_in: Option<PathBuf>,
    mask_out: Option<PathBuf>,
}

/// Main CLI entry point
pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    if cli.list_presets {
        print_presets();
        return Ok(());
    }

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli)?;
    let params = CliConfigBuilder::params(&cli)?;
    let colors = CliConfigBuilder::colors(&cli)?;

    let provider = CliProviderFactory::create(cli.backend, cli.model.as_deref())?;
    let processor =
        ColorizerProcessor::new(config, provider).context("Failed to create recolor processor")?;

    let start_time = Instant::now();
    let written = process_inputs(&cli, &processor, &params, &colors).await?;
    info!(
        "Wrote {} image(s) in {:.2}s",
        written,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn print_presets() {
    for preset in &COLOR_PRESETS {
        println!("{:<10} {}  {}", preset.name, preset.emoji, preset.hex);
    }
}

async fn process_inputs(
    cli: &Cli,
    processor: &ColorizerProcessor,
    params: &RecolorParams,
    colors: &[ColorTarget],
) -> Result<usize> {
    let mut all_files = Vec::new();
    for input in &cli.input {
        let path = PathBuf::from(input);
        if path.is_file() {
            if is_image_file(&path) {
                all_files.push(path);
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            all_files.extend(find_image_files(&path, cli.recursive)?);
        } else {
            anyhow::bail!(
                "Input path does not exist or is not accessible: {}",
                path.display()
            );
        }
    }

    if all_files.is_empty() {
        warn!("No supported image files found in the provided inputs");
        return Ok(0);
    }
    all_files.sort();

    let format = processor.config().output_format;
    let jobs = plan_jobs(cli, &all_files, colors, format)?;
    let job_count: usize = jobs.iter().map(|job| job.outputs.len()).sum();
    info!(
        "Recoloring {} file(s) into {} output(s) with '{}'",
        all_files.len(),
        job_count,
        processor.provider_name()
    );

    let batch_span = spans::batch_processing(all_files.len(), processor.provider_name());
    let progress = (job_count > 1).then(|| {
        let pb = ProgressBar::new(job_count as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    });

    let mut records = Vec::new();
    let mut failed_count = 0;

    for job in jobs {
        if let Some(pb) = &progress {
            pb.set_message(format!("{}", job.input.display()));
        }
        let output_count = job.outputs.len() as u64;
        let input = job.input.clone();

        let processor = processor.clone();
        let params = *params;
        let quality = processor.config().output_quality();
        let span = batch_span.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = span.enter();
            process_file(&processor, job, &params, format, quality)
        })
        .await
        .context("Recolor worker failed")?;

        match outcome {
            Ok(mut file_records) => records.append(&mut file_records),
            Err(e) => {
                error!("Failed to process {}: {:#}", input.display(), e);
                failed_count += 1;
            },
        }

        if let Some(pb) = &progress {
            pb.inc(output_count);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Completed! Outputs: {}, failed files: {failed_count}",
            records.len()
        ));
    }

    if let Some(path) = &cli.record {
        write_records(path, &records)?;
    }

    if failed_count > 0 {
        warn!("{failed_count} file(s) failed to process");
    }
    Ok(records.len())
}

/// Decide every output path up front
fn plan_jobs(
    cli: &Cli,
    files: &[PathBuf],
    colors: &[ColorTarget],
    format: OutputFormat,
) -> Result<Vec<FileJob>> {
    let single_output = files.len() == 1 && colors.len() == 1;
    let output_dir = match (&cli.output, single_output) {
        (Some(output), false) => {
            let dir = PathBuf::from(output);
            if dir.is_file() {
                anyhow::bail!(
                    "Output path exists and is a file, not a directory: {}",
                    dir.display()
                );
            }
            std::fs::create_dir_all(&dir).with_context(|| {
                format!("Failed to create output directory: {}", dir.display())
            })?;
            Some(dir)
        },
        _ => None,
    };

    Ok(files
        .iter()
        .map(|input| {
            let outputs = colors
                .iter()
                .map(|target| {
                    let path = match (&cli.output, &output_dir) {
                        (Some(output), None) => PathBuf::from(output),
                        (_, Some(dir)) => {
                            generate_output_path(input, Some(dir.as_path()), &target.label, format)
                        },
                        (None, None) => generate_output_path(input, None, &target.label, format),
                    };
                    (target.clone(), path)
                })
                .collect();
            FileJob {
                input: input.clone(),
                outputs,
                mask_in: cli.mask_in.clone(),
                mask_out: cli.mask_out.clone(),
            }
        })
        .collect())
}

/// Recolor one file into every requested color with a single mask
fn process_file(
    processor: &ColorizerProcessor,
    job: FileJob,
    params: &RecolorParams,
    default_format: OutputFormat,
    quality: u8,
) -> Result<Vec<ColorizationRecord>> {
    let _span = spans::file_processing(&job.input, job.outputs.len()).entered();

    let image = ImageIOService::load_image(&job.input)
        .with_context(|| format!("Failed to load {}", job.input.display()))?;
    let mut session = RecolorSession::new(processor.clone(), image);

    if let Some(mask_path) = &job.mask_in {
        let mask = ImageIOService::load_mask(mask_path)
            .with_context(|| format!("Failed to load mask {}", mask_path.display()))?;
        session.set_mask(mask);
    }

    let extraction = session.ensure_mask();
    if extraction.source == MaskSource::Fallback {
        warn!(
            "No object detected in {}; recoloring the image center",
            job.input.display()
        );
    }
    if let Some(mask_path) = &job.mask_out {
        ImageIOService::save_mask(&extraction.mask, mask_path)
            .with_context(|| format!("Failed to save mask {}", mask_path.display()))?;
        info!("Mask saved to {}", mask_path.display());
    }

    let has_alpha = session.image().color().has_alpha();
    let mut records = Vec::with_capacity(job.outputs.len());
    for (target, output_path) in &job.outputs {
        let result = session.recolor_with_color(target.color, params)?;

        let format = OutputFormatHandler::from_extension(output_path).unwrap_or(default_format);
        OutputFormatHandler::warn_if_alpha_lost(format, has_alpha);
        result
            .save(output_path, format, quality)
            .with_context(|| format!("Failed to save {}", output_path.display()))?;
        debug!(
            "{} -> {} ({})",
            job.input.display(),
            output_path.display(),
            result.timing_summary()
        );

        records.push(ColorizationRecord::from_result(
            0,
            job.input.display().to_string(),
            Some(output_path.display().to_string()),
            &result,
        ));
    }

    Ok(records)
}

fn write_records(path: &Path, records: &[ColorizationRecord]) -> Result<()> {
    let numbered: Vec<ColorizationRecord> = records
        .iter()
        .zip(1u64..)
        .map(|(record, id)| ColorizationRecord {
            id,
            ..record.clone()
        })
        .collect();
    let json = serde_json::to_string_pretty(&numbered).context("Failed to serialize records")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write records to {}", path.display()))?;
    info!("Wrote {} record(s) to {}", numbered.len(), path.display());
    Ok(())
}

/// Find image files in a directory, descending into subdirectories when `recursive`
fn find_image_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(dir).max_depth(max_depth) {
        let entry = entry?;
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// `<dir>/<stem>_<label>.<ext>`, next to the input when no directory is given
fn generate_output_path(
    input_path: &Path,
    output_dir: Option<&Path>,
    label: &str,
    format: OutputFormat,
) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let dir = output_dir
        .or_else(|| input_path.parent())
        .unwrap_or(Path::new("."));

    dir.join(format!(
        "{}_{}.{}",
        stem.to_string_lossy(),
        label,
        OutputFormatHandler::get_extension(format)
    ))
}
