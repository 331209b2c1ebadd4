use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Remote module install lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallEvent {
    /// A new provider-level install session was started
    Requested { module: String },

    /// A caller joined an install that was already in flight
    Attached { module: String, waiters: usize },

    /// Download percentage advanced
    Progress {
        module: String,
        percent: u8,
        bytes_downloaded: u64,
        total_bytes: u64,
    },

    Completed { module: String },

    Failed {
        module: String,
        failure: FailureContext,
    },

    Canceled { module: String },

    /// Installer listener detached during teardown
    Detached { module: String, dropped_waiters: usize },
}
