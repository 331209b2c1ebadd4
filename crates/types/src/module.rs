//! Install state of the remote asset module

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized install state of a remote module.
///
/// Only the module installer moves this machine forward; everything else
/// observes snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ModuleState {
    /// No install has been asked for in this process.
    #[default]
    NotRequested,
    /// Install requested; the provider has not reported transfer progress yet.
    Checking,
    /// Transfer in progress, percentage in `0..=100`.
    Downloading { progress: u8 },
    Installed,
    Failed { reason: String },
    Canceled,
}

impl ModuleState {
    /// Whether the state ends an install attempt.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Installed | Self::Failed { .. } | Self::Canceled)
    }

    /// Whether an install attempt is currently running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Checking | Self::Downloading { .. })
    }

    /// Last known download percentage, if downloading.
    #[must_use]
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Downloading { progress } => Some(*progress),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequested => write!(f, "not requested"),
            Self::Checking => write!(f, "checking"),
            Self::Downloading { progress } => write!(f, "downloading ({progress}%)"),
            Self::Installed => write!(f, "installed"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}
