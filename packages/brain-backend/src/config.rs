//! Configuration for the board backend.
//! Reads config.json from ~/.config/digital-brain/config.json (or platform equivalent).
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Board snapshot file. Defaults to the platform data directory.
    #[serde(default)]
    pub data_file: Option<String>,
}

fn default_port() -> u16 {
    7420
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            data_file: None,
        }
    }
}

impl BackendConfig {
    /// Where the board snapshot lives.
    pub fn data_path(&self) -> PathBuf {
        match &self.data_file {
            Some(file) => PathBuf::from(file),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("digital-brain")
                .join("boards.json"),
        }
    }
}

/// Default config path: ~/.config/digital-brain/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("digital-brain")
        .join("config.json")
}

/// Load config from path. Returns default if the file is missing or invalid.
pub fn load_config(path: &Path) -> BackendConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("[brain.config] Failed to parse config {}: {}", path.display(), e);
            BackendConfig::default()
        }),
        Err(_) => {
            log::info!("[brain.config] No config at {}, using defaults", path.display());
            BackendConfig::default()
        }
    }
}
