//! Provider used when no matting backend is configured

use crate::{
    error::{RecolorError, Result},
    inference::{ForegroundMatteProvider, MattingOptions},
};

/// Refuses every request, so extraction always lands on the fallback mask
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMatteProvider;

impl ForegroundMatteProvider for NoMatteProvider {
    fn name(&self) -> &str {
        "none"
    }

    fn matte(&self, _png_bytes: &[u8], _options: &MattingOptions) -> Result<Vec<u8>> {
        Err(RecolorError::matting("No matte backend configured"))
    }
}
