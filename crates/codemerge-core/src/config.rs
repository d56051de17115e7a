use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub merge: MergeSettings,
    #[serde(default)]
    pub metadata: MetadataSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Keep the edited file and append new's markup for manual merging
    /// when no base version can be found.
    #[serde(default = "default_append_jsx_on_missing_base")]
    pub append_jsx_on_missing_base: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            append_jsx_on_missing_base: default_append_jsx_on_missing_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataSettings {
    #[serde(default = "default_metadata_dir")]
    pub dir: PathBuf,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            dir: default_metadata_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            filter: default_log_filter(),
        }
    }
}

fn default_append_jsx_on_missing_base() -> bool {
    true
}
fn default_metadata_dir() -> PathBuf {
    PathBuf::from(".codemerge/metadata")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from(".codemerge/logs")
}
fn default_log_filter() -> String {
    "info".into()
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
