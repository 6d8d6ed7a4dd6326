//! Configuration management.
//!
//! Settings come from an optional TOML file with serde defaults, plus a
//! small set of `DOCINTAKE_*` environment overrides for the values that
//! differ between deployments. `.env` loading happens in `main` before
//! anything reads the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmConfig;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docintake.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("failed to parse {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Bind host for `serve`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port for `serve`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Staging directory for uploads.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Maximum accepted upload body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Summarization model settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            llm: LlmConfig::default(),
        }
    }
}

/// Load settings from an optional TOML file, then apply environment
/// overrides.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut settings = if path.exists() {
        let raw =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.clone(), e))?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(path.clone(), e))?
    } else {
        Settings::default()
    };

    if let Ok(endpoint) = std::env::var("DOCINTAKE_LLM_ENDPOINT") {
        settings.llm.endpoint = endpoint;
    }
    if let Ok(model) = std::env::var("DOCINTAKE_LLM_MODEL") {
        settings.llm.model = model;
    }
    if let Ok(dir) = std::env::var("DOCINTAKE_UPLOAD_DIR") {
        settings.upload_dir = PathBuf::from(dir);
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let settings = Settings::default();
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.upload_dir, PathBuf::from("uploads"));
        assert!(settings.max_upload_bytes > 0);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            port = 8080

            [llm]
            model = "llava"
            "#,
        )
        .unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.llm.model, "llava");
        assert!(settings.llm.endpoint.starts_with("http"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings(Some(Path::new("/nonexistent/docintake.toml"))).unwrap();
        assert_eq!(settings.port, Settings::default().port);
    }
}
