// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Configuration management for snaptriage

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Folder watched for new screenshots
    #[serde(default)]
    pub watched_folder: Option<PathBuf>,

    /// Folder watcher settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Text recognition settings
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cloud analysis settings
    #[serde(default)]
    pub cloud: CloudConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatcherConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OcrConfig {
    /// Recognition languages in priority order (tesseract codes)
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Path of the screenshot document
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CloudConfig {
    /// Opt-in switch for cloud-backed deep analysis
    #[serde(default)]
    pub enabled: bool,
}

// Default value functions
fn default_poll_interval() -> u64 { 2 }
fn default_extensions() -> Vec<String> { vec!["png".to_string()] }
fn default_languages() -> Vec<String> { vec!["eng".to_string(), "deu".to_string()] }

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snaptriage")
        .join("screenshots.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            watched_folder: None,
            watcher: WatcherConfig::default(),
            ocr: OcrConfig::default(),
            storage: StorageConfig::default(),
            cloud: CloudConfig::default(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            extensions: default_extensions(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content).map_err(|e| {
                crate::SnaptriageError::Config(format!("Failed to parse config: {}", e))
            })?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
