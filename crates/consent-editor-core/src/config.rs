use serde::{Deserialize, Serialize};

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::import::PdfMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Element id of the editable surface in the host page.
    pub surface_id: String,
    /// Quiet period before a typed change is re-sanitized.
    pub sync_debounce_ms: u64,
    /// Narrowest width a resize drag can shrink an image to, in CSS pixels.
    pub min_image_width: f64,
    pub pdf_mode: PdfMode,
    /// `<title>` of exported documents.
    pub export_title: String,
    // Kept last: TOML wants tables after plain keys.
    pub table: TableConfig,
}

impl EditorConfig {
    pub fn sync_debounce(&self) -> Duration {
        Duration::from_millis(self.sync_debounce_ms)
    }

    /// Loads the configuration from a `.json` or `.toml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        FileStore::new(path).load()
    }

    /// Saves the configuration, format chosen by the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        FileStore::new(path).save(self)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface_id: "editable".to_owned(),
            sync_debounce_ms: 120,
            min_image_width: 40.0,
            pdf_mode: PdfMode::Text,
            export_title: "Consent Content".to_owned(),
            table: TableConfig::default(),
        }
    }
}

/// Defaults for the insert-table dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub border_color: String,
    pub border_size: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            border_color: "#000000".to_owned(),
            border_size: 1,
        }
    }
}

/// Reads and writes an [`EditorConfig`] file.
///
/// The format follows the file extension: `.json` or `.toml`.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<EditorConfig, ConfigError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?),
            _ => Err(ConfigError::UnsupportedFormat(self.path.clone())),
        }
    }

    pub fn save(&self, config: &EditorConfig) -> Result<(), ConfigError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(std::fs::write(
                &self.path,
                serde_json::to_string_pretty(config)?,
            )?),
            Some("toml") => Ok(std::fs::write(&self.path, toml::to_string_pretty(config)?)?),
            _ => Err(ConfigError::UnsupportedFormat(self.path.clone())),
        }
    }
}
