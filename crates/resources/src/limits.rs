//! Resource limit configuration and availability tracking

use serde::{Deserialize, Serialize};

/// Upper bounds for concurrent work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum number of asset streams copying at the same time
    pub concurrent_streams: usize,
    /// Maximum number of module installs driven at the same time
    pub concurrent_installs: usize,
}

impl ResourceLimits {
    /// Limits for a given stream ceiling; installs stay sequential
    #[must_use]
    pub fn with_streams(concurrent_streams: usize) -> Self {
        Self {
            concurrent_streams: concurrent_streams.max(1),
            concurrent_installs: 1,
        }
    }

    /// Lower limits for tests that exercise back-pressure
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            concurrent_streams: 2,
            concurrent_installs: 1,
        }
    }

    /// Limits derived from the machine's parallelism
    #[must_use]
    pub fn from_system() -> Self {
        let cpu_count = std::thread::available_parallelism()
            .map(std::num::NonZero::get)
            .unwrap_or(4);

        Self {
            concurrent_streams: (cpu_count * 2).clamp(2, 16),
            concurrent_installs: 1,
        }
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self::with_streams(4)
    }
}

/// Snapshot of free permits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAvailability {
    pub streams: usize,
    pub installs: usize,
}

impl ResourceAvailability {
    /// Check if any resources are available
    #[must_use]
    pub fn has_any_available(&self) -> bool {
        self.streams > 0 || self.installs > 0
    }

    /// Check if nothing is currently holding a permit
    #[must_use]
    pub fn all_available(&self, limits: &ResourceLimits) -> bool {
        self.streams >= limits.concurrent_streams && self.installs >= limits.concurrent_installs
    }
}
