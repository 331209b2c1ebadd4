#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for envmap
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/envmap/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;
pub mod core;

pub use crate::core::{
    AssetConfig, DeliveryConfig, FrontendConfig, GeneralConfig, PathConfig, StreamingConfig,
};

use envmap_errors::{ConfigError, Error};
use envmap_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub assets: AssetConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,

    #[serde(default)]
    pub frontend: FrontendConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(constants::APP_DIR).join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // ENVMAP_OUTPUT
        if let Ok(output) = std::env::var("ENVMAP_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "ENVMAP_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // ENVMAP_COLOR
        if let Ok(color) = std::env::var("ENVMAP_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "ENVMAP_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // ENVMAP_REMOTE
        if let Ok(remote) = std::env::var("ENVMAP_REMOTE") {
            self.delivery.remote_enabled = match remote.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "ENVMAP_REMOTE".to_string(),
                        value: remote,
                    }
                    .into())
                }
            };
        }

        // ENVMAP_MAX_STREAMS
        if let Ok(streams) = std::env::var("ENVMAP_MAX_STREAMS") {
            self.streaming.max_concurrent_streams =
                streams.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "ENVMAP_MAX_STREAMS".to_string(),
                    value: streams,
                })?;
        }

        // ENVMAP_BUNDLE_DIR
        if let Ok(dir) = std::env::var("ENVMAP_BUNDLE_DIR") {
            self.paths.bundle_dir = Some(PathBuf::from(dir));
        }

        self.validate()
    }

    /// Check cross-field invariants that serde defaults cannot express
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |field: &str, value: String| -> Error {
            ConfigError::InvalidValue {
                field: field.to_string(),
                value,
            }
            .into()
        };

        if self.assets.module_name.is_empty() {
            return Err(invalid("assets.module_name", String::new()));
        }
        if self.assets.asset_dir.is_empty() || self.assets.asset_dir.contains('/') {
            return Err(invalid("assets.asset_dir", self.assets.asset_dir.clone()));
        }
        if self.assets.authority.is_empty() || self.assets.authority.contains('/') {
            return Err(invalid("assets.authority", self.assets.authority.clone()));
        }
        if self.assets.fallback_asset.is_empty() || self.assets.fallback_asset.contains('/') {
            return Err(invalid(
                "assets.fallback_asset",
                self.assets.fallback_asset.clone(),
            ));
        }
        if self.streaming.buffer_size == 0 {
            return Err(invalid("streaming.buffer_size", "0".to_string()));
        }
        if self.streaming.pipe_capacity == 0 {
            return Err(invalid("streaming.pipe_capacity", "0".to_string()));
        }
        if self.delivery.install_chunk_size == 0 {
            return Err(invalid("delivery.install_chunk_size", "0".to_string()));
        }
        Ok(())
    }

    /// Root of the bundled assets (with default)
    #[must_use]
    pub fn bundle_path(&self) -> PathBuf {
        self.paths
            .bundle_dir
            .clone()
            .unwrap_or_else(|| data_root().join("bundle"))
    }

    /// Module catalog path (with default)
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.paths
            .catalog_dir
            .clone()
            .unwrap_or_else(|| data_root().join("catalog"))
    }

    /// Installed modules path (with default)
    #[must_use]
    pub fn modules_path(&self) -> PathBuf {
        self.paths
            .modules_dir
            .clone()
            .unwrap_or_else(|| data_root().join("modules"))
    }

    /// Directory for debug log files
    #[must_use]
    pub fn logs_path(&self) -> PathBuf {
        data_root().join("logs")
    }

    /// Interval between front-end readiness checks
    #[must_use]
    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.frontend.ready_poll_interval_ms)
    }
}

fn data_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(constants::APP_DIR)
}

/// Calculate the stream ceiling based on CPU count
#[must_use]
pub fn calculate_stream_concurrency(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        // Copies are I/O bound; allow a couple per core but keep a hard cap
        (num_cpus::get() * 2).clamp(2, 16)
    }
}
