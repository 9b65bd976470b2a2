//! Image I/O operations service
//!
//! File and byte-level loading and saving, kept apart from the pipeline so
//! the stages only ever see decoded images.

use crate::{
    config::OutputFormat,
    error::{RecolorError, Result},
    types::SegmentationMask,
};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Falls back to content sniffing when the extension does not match the
    /// actual encoding.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use recolorize::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(RecolorError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    RecolorError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data).map_err(|content_err| {
                    RecolorError::processing_stage_error(
                        "image loading",
                        &format!("Extension error: {e}. Content error: {content_err}"),
                        Some(&format!(
                            "path: {}, size: {} bytes",
                            path_ref.display(),
                            data.len()
                        )),
                    )
                })
            },
        }
    }

    /// Decode an image from raw bytes
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| {
            RecolorError::processing(format!("Failed to decode image from bytes: {e}"))
        })
    }

    /// Read all bytes from an async reader and decode them
    ///
    /// # Examples
    /// ```rust,no_run
    /// use recolorize::services::ImageIOService;
    /// use tokio::fs::File;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let file = File::open("image.jpg").await?;
    /// let image = ImageIOService::load_from_reader(file).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_from_reader<R: tokio::io::AsyncRead + Unpin>(
        mut reader: R,
    ) -> Result<DynamicImage> {
        use tokio::io::AsyncReadExt;

        let mut buffer = Vec::new();
        AsyncReadExt::read_to_end(&mut reader, &mut buffer)
            .await
            .map_err(|e| RecolorError::processing(format!("Failed to read from stream: {e}")))?;

        Self::load_from_bytes(&buffer)
    }

    /// Encode an image in the given format
    ///
    /// `quality` is honored by JPEG; the other formats are lossless.
    pub fn encode_image(image: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        match format {
            OutputFormat::Jpeg => {
                let rgb_image = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut cursor, quality.min(100))
                    .encode_image(&rgb_image)
                    .map_err(|e| RecolorError::processing(format!("Failed to encode JPEG: {e}")))?;
            },
            OutputFormat::Png | OutputFormat::WebP | OutputFormat::Tiff => {
                image
                    .write_to(&mut cursor, Self::image_format(format))
                    .map_err(|e| {
                        RecolorError::processing(format!("Failed to encode {format}: {e}"))
                    })?;
            },
        }

        Ok(buffer)
    }

    /// Save an image, creating parent directories as needed
    ///
    /// # Examples
    /// ```rust,no_run
    /// use recolorize::{services::ImageIOService, config::OutputFormat};
    /// use image::DynamicImage;
    ///
    /// # let image = DynamicImage::new_rgb8(100, 100);
    /// ImageIOService::save_image(&image, "output.jpg", OutputFormat::Jpeg, 90)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save_image<P: AsRef<Path>>(
        image: &DynamicImage,
        path: P,
        format: OutputFormat,
        quality: u8,
    ) -> Result<()> {
        let path_ref = path.as_ref();
        Self::ensure_parent(path_ref)?;

        let bytes = Self::encode_image(image, format, quality).map_err(|e| {
            RecolorError::processing_stage_error(
                "image save",
                &e.to_string(),
                Some(&format!("format: {}, path: {}", format, path_ref.display())),
            )
        })?;

        std::fs::write(path_ref, bytes)
            .map_err(|e| RecolorError::file_io_error("write image", path_ref, &e))
    }

    /// Save a mask as a grayscale PNG
    pub fn save_mask<P: AsRef<Path>>(mask: &SegmentationMask, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        Self::ensure_parent(path_ref)?;
        mask.save_png(path_ref)
    }

    /// Load a grayscale mask, e.g. one written by [`Self::save_mask`]
    pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<SegmentationMask> {
        let image = Self::load_image(path)?;
        Ok(SegmentationMask::from_gray(image.to_luma8()))
    }

    /// Check if a file path has a supported image extension
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| {
                matches!(
                    ext.as_str(),
                    "jpg" | "jpeg" | "png" | "webp" | "tiff" | "tif" | "bmp"
                )
            })
    }

    fn image_format(format: OutputFormat) -> ImageFormat {
        match format {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                RecolorError::file_io_error("create output directory", parent, &e)
            })?;
        }
        Ok(())
    }
}
