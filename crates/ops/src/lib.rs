#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations for envmap
//!
//! This crate wires the installer, the resolution pipeline and the
//! streaming bridge into one context and exposes the operations the CLI
//! and embedding hosts call.

mod assets;
mod context;
mod frontend;
pub mod types;

pub use assets::{
    asset_list_payload, copy_asset, install_module, open_asset, resolve_assets, shutdown, status,
};
pub use context::{OpsContextBuilder, OpsCtx};
pub use frontend::{push_when_ready, Frontend};
pub use types::{AssetListing, InstallReport, ModuleStatus, StreamReport};

use serde::{Deserialize, Serialize};

/// Operation result that can be serialized for CLI output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    AssetList(AssetListing),
    Status(ModuleStatus),
    Install(InstallReport),
    Stream(StreamReport),
    Success(String),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
