//! Colorization history record
//!
//! The shape a storage layer keeps per request. Nothing here persists it;
//! the CLI only writes it out as a JSON sidecar.

use crate::{
    error::{RecolorError, Result},
    types::RecolorResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum stored length of `color_hex`
pub const MAX_COLOR_HEX_LEN: usize = 10;

fn default_intensity() -> f32 {
    0.7
}

fn default_edge_smooth() -> u32 {
    2
}

/// One recolor request as it would be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorizationRecord {
    pub id: u64,

    /// Reference to the uploaded image
    pub original_image: String,

    /// Reference to the produced image, absent until one exists
    #[serde(default)]
    pub colorized_image: Option<String>,

    /// Requested color, may be empty
    #[serde(default)]
    pub color_hex: String,

    #[serde(default = "default_intensity")]
    pub intensity: f32,

    #[serde(default = "default_edge_smooth")]
    pub edge_smooth: u32,

    pub created_at: DateTime<Utc>,
}

impl ColorizationRecord {
    /// A fresh record with default parameters and no result yet
    #[must_use]
    pub fn new<S: Into<String>>(id: u64, original_image: S) -> Self {
        Self {
            id,
            original_image: original_image.into(),
            colorized_image: None,
            color_hex: String::new(),
            intensity: default_intensity(),
            edge_smooth: default_edge_smooth(),
            created_at: Utc::now(),
        }
    }

    /// Record describing a finished request
    #[must_use]
    pub fn from_result<S: Into<String>>(
        id: u64,
        original_image: S,
        colorized_image: Option<String>,
        result: &RecolorResult,
    ) -> Self {
        Self {
            colorized_image,
            color_hex: result.color.to_hex(),
            intensity: result.params.intensity,
            edge_smooth: result.params.edge_smooth,
            ..Self::new(id, original_image)
        }
    }

    /// # Errors
    /// - `InvalidConfig` when `color_hex` is too long or intensity is outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.color_hex.chars().count() > MAX_COLOR_HEX_LEN {
            return Err(RecolorError::invalid_config(format!(
                "color_hex '{}' exceeds {} characters",
                self.color_hex, MAX_COLOR_HEX_LEN
            )));
        }
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(RecolorError::config_value_error(
                "intensity",
                self.intensity,
                "0.0-1.0",
                Some(default_intensity()),
            ));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RecolorError::internal(format!("Failed to serialize record: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(json)
            .map_err(|e| RecolorError::invalid_config(format!("Malformed record: {e}")))?;
        record.validate()?;
        Ok(record)
    }

    /// Write the record as pretty JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;
        std::fs::write(path, self.to_json()?)
            .map_err(|e| RecolorError::file_io_error("write record", path, &e))
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RecolorError::file_io_error("read record", path, &e))?;
        Self::from_json(&json)
    }
}
