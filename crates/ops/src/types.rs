//! Report types returned by operations

use envmap_types::{ModuleState, Provenance, ResolutionResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Asset list handed to a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetListing {
    pub provenance: Provenance,
    /// Identifier strings in enumeration order
    pub assets: Vec<String>,
}

impl From<&ResolutionResult> for AssetListing {
    fn from(result: &ResolutionResult) -> Self {
        Self {
            provenance: result.provenance(),
            assets: result.uris(),
        }
    }
}

/// Snapshot of the remote module and the configured locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleStatus {
    pub module: String,
    pub state: ModuleState,
    pub installed: bool,
    pub remote_enabled: bool,
    pub bundle_dir: PathBuf,
    pub catalog_dir: PathBuf,
    pub modules_dir: PathBuf,
    pub active_streams: usize,
}

/// Result of copying one asset out through the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamReport {
    pub uri: String,
    pub content_type: String,
    /// Declared length, when the source knew it
    pub content_length: Option<u64>,
    pub bytes: u64,
    pub destination: Option<PathBuf>,
}

/// Result of an explicit module install
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReport {
    pub module: String,
    pub state: ModuleState,
    /// Whether the module was already present before the request
    pub already_installed: bool,
}
