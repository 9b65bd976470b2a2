//! Matte provider construction for the CLI

use crate::backends::NoMatteProvider;
use crate::cli::main_impl::CliBackend;
use crate::inference::ForegroundMatteProvider;
use anyhow::Result;
use std::sync::Arc;

/// Builds the provider selected with `--backend`
#[derive(Debug)]
pub(crate) struct CliProviderFactory;

impl CliProviderFactory {
    /// Create the provider for `backend`
    ///
    /// `model` is a model file path for Tract and a model name for rembg. A
    /// backend that cannot be set up is reported and replaced by
    /// [`NoMatteProvider`], so every image still gets the fallback mask.
    pub(crate) fn create(
        backend: CliBackend,
        model: Option<&str>,
    ) -> Result<Arc<dyn ForegroundMatteProvider>> {
        match Self::try_create(backend, model) {
            Ok(provider) => Ok(provider),
            Err(e) if backend != CliBackend::None => {
                log::warn!(
                    "Matte backend '{}' unavailable ({:#}); using the centered fallback mask",
                    backend,
                    e
                );
                Ok(Arc::new(NoMatteProvider))
            },
            Err(e) => Err(e),
        }
    }

    fn try_create(
        backend: CliBackend,
        model: Option<&str>,
    ) -> Result<Arc<dyn ForegroundMatteProvider>> {
        match backend {
            CliBackend::None => Ok(Arc::new(NoMatteProvider)),
            CliBackend::Tract => Self::tract(model),
            CliBackend::Rembg => Self::rembg(model),
        }
    }

    #[cfg(feature = "tract")]
    fn tract(model: Option<&str>) -> Result<Arc<dyn ForegroundMatteProvider>> {
        use crate::backends::TractMatteProvider;
        use anyhow::Context;

        let path = match model {
            Some(path) => std::path::PathBuf::from(path),
            None => TractMatteProvider::default_model_path()
                .context("Could not determine the model cache directory; pass --model")?,
        };
        let provider = TractMatteProvider::from_path(&path)
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        Ok(Arc::new(provider))
    }

    #[cfg(not(feature = "tract"))]
    fn tract(_model: Option<&str>) -> Result<Arc<dyn ForegroundMatteProvider>> {
        anyhow::bail!("built without the `tract` feature")
    }

    #[cfg(feature = "rembg")]
    fn rembg(model: Option<&str>) -> Result<Arc<dyn ForegroundMatteProvider>> {
        use crate::backends::RembgCommandProvider;

        let mut provider = RembgCommandProvider::new()?;
        if let Some(model) = model {
            provider = provider.model(model);
        }
        Ok(Arc::new(provider))
    }

    #[cfg(not(feature = "rembg"))]
    fn rembg(_model: Option<&str>) -> Result<Arc<dyn ForegroundMatteProvider>> {
        anyhow::bail!("built without the `rembg` feature")
    }
}
