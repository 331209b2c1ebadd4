//! Configuration sections

use crate::constants;
use envmap_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

/// Names and layout of the asset collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "default_module_name")]
    pub module_name: String,
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_authority")]
    pub authority: String,
    #[serde(default = "default_fallback_asset")]
    pub fallback_asset: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
            asset_dir: default_asset_dir(),
            suffix: default_suffix(),
            authority: default_authority(),
            fallback_asset: default_fallback_asset(),
        }
    }
}

/// Remote delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Capability gate; when false the remote module is never consulted.
    #[serde(default = "default_remote_enabled")]
    pub remote_enabled: bool,
    /// Bytes copied per provider progress step by the filesystem provider.
    #[serde(default = "default_install_chunk_size")]
    pub install_chunk_size: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            remote_enabled: true,
            install_chunk_size: default_install_chunk_size(),
        }
    }
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Root of the assets shipped with the base package.
    pub bundle_dir: Option<PathBuf>,
    /// Where deliverable modules are published.
    pub catalog_dir: Option<PathBuf>,
    /// Where installed modules live.
    pub modules_dir: Option<PathBuf>,
}

/// Streaming bridge limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// 0 = auto-detect from CPU count
    #[serde(default = "default_max_concurrent_streams")]
    pub max_concurrent_streams: usize,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_pipe_capacity")]
    pub pipe_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_streams: default_max_concurrent_streams(),
            buffer_size: default_buffer_size(),
            pipe_capacity: default_pipe_capacity(),
        }
    }
}

/// Front-end delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    #[serde(default = "default_ready_poll_interval_ms")]
    pub ready_poll_interval_ms: u64,
    /// 0 = poll until the front-end becomes ready
    #[serde(default = "default_max_ready_attempts")]
    pub max_ready_attempts: u32,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            ready_poll_interval_ms: default_ready_poll_interval_ms(),
            max_ready_attempts: default_max_ready_attempts(),
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_module_name() -> String {
    constants::MODULE_NAME.to_string()
}

fn default_asset_dir() -> String {
    constants::ASSET_DIR.to_string()
}

fn default_suffix() -> String {
    constants::ASSET_SUFFIX.to_string()
}

fn default_authority() -> String {
    constants::AUTHORITY.to_string()
}

fn default_fallback_asset() -> String {
    constants::FALLBACK_ASSET.to_string()
}

fn default_remote_enabled() -> bool {
    true
}

fn default_install_chunk_size() -> usize {
    256 * 1024
}

fn default_max_concurrent_streams() -> usize {
    4
}

fn default_buffer_size() -> usize {
    64 * 1024
}

fn default_pipe_capacity() -> usize {
    64 * 1024
}

fn default_ready_poll_interval_ms() -> u64 {
    500
}

fn default_max_ready_attempts() -> u32 {
    120 // one minute at the default interval
}
