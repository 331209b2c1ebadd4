//! Delivery provider boundary

use async_trait::async_trait;
use envmap_errors::InstallError;
use envmap_store::AssetReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use tokio::sync::mpsc::UnboundedReceiver;

/// Provider error codes carried by `Failed` session states
pub mod error_codes {
    pub const NO_ERROR: i32 = 0;
    pub const ACTIVE_SESSIONS_LIMIT_EXCEEDED: i32 = -1;
    pub const MODULE_UNAVAILABLE: i32 = -2;
    pub const INVALID_REQUEST: i32 = -3;
    pub const SESSION_NOT_FOUND: i32 = -4;
    pub const API_NOT_AVAILABLE: i32 = -5;
    pub const NETWORK_ERROR: i32 = -6;
    pub const ACCESS_DENIED: i32 = -7;
    pub const INSUFFICIENT_STORAGE: i32 = -10;
    pub const INTERNAL_ERROR: i32 = -100;
}

/// Lifecycle status of one provider install session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Downloading,
    Downloaded,
    Installing,
    Installed,
    Failed,
    Canceling,
    Canceled,
}

impl SessionStatus {
    /// No further events follow a terminal status
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Installed | Self::Failed | Self::Canceled)
    }
}

/// One status event of an install session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub status: SessionStatus,
    pub bytes_downloaded: u64,
    /// Zero when the provider does not know the size
    pub total_bytes: u64,
    pub error_code: i32,
}

impl SessionState {
    #[must_use]
    pub fn new(status: SessionStatus) -> Self {
        Self {
            status,
            bytes_downloaded: 0,
            total_bytes: 0,
            error_code: error_codes::NO_ERROR,
        }
    }

    #[must_use]
    pub fn downloading(bytes_downloaded: u64, total_bytes: u64) -> Self {
        Self {
            status: SessionStatus::Downloading,
            bytes_downloaded,
            total_bytes,
            error_code: error_codes::NO_ERROR,
        }
    }

    #[must_use]
    pub fn failed(error_code: i32) -> Self {
        Self {
            status: SessionStatus::Failed,
            bytes_downloaded: 0,
            total_bytes: 0,
            error_code,
        }
    }
}

/// Ordered status events of one install session
pub type SessionEvents = UnboundedReceiver<SessionState>;

/// On-demand module delivery service
#[async_trait]
pub trait ModuleProvider: Send + Sync + fmt::Debug {
    /// Capability gate; when false the remote module is never consulted
    fn is_available(&self) -> bool {
        true
    }

    /// Whether `module` is in the installed-module set
    fn is_module_installed(&self, module: &str) -> bool;

    /// Start an install session for `module`
    ///
    /// Status events arrive in order on the returned channel and end with a
    /// terminal status.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::StartFailed` if no session could be started.
    async fn start_install(&self, module: &str) -> Result<SessionEvents, InstallError>;

    /// File names under `dir` inside an installed module
    ///
    /// # Errors
    ///
    /// Returns an error if the module or directory does not exist.
    fn list_files(&self, module: &str, dir: &str) -> io::Result<Vec<String>>;

    /// Open `dir/name` inside an installed module
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file does not exist.
    fn open_file(&self, module: &str, dir: &str, name: &str) -> io::Result<AssetReader>;
}
