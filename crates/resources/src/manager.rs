//! Shared permit pools

use crate::limits::{ResourceAvailability, ResourceLimits};
use crate::semaphore::{acquire_semaphore_permit, create_semaphore, try_acquire_semaphore_permit};
use envmap_errors::Error;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Owns one semaphore per kind of bounded work
#[derive(Debug, Clone)]
pub struct ResourceManager {
    limits: ResourceLimits,
    streams: Arc<Semaphore>,
    installs: Arc<Semaphore>,
}

impl ResourceManager {
    #[must_use]
    pub fn new(limits: ResourceLimits) -> Self {
        Self {
            limits,
            streams: create_semaphore(limits.concurrent_streams),
            installs: create_semaphore(limits.concurrent_installs),
        }
    }

    #[must_use]
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Wait for a stream permit
    ///
    /// # Errors
    ///
    /// Returns an error once the manager has been closed.
    pub async fn acquire_stream_permit(&self) -> Result<OwnedSemaphorePermit, Error> {
        acquire_semaphore_permit(self.streams.clone(), "asset stream").await
    }

    /// Take a stream permit only if one is free right now
    ///
    /// # Errors
    ///
    /// Returns an error once the manager has been closed.
    pub fn try_acquire_stream_permit(&self) -> Result<Option<OwnedSemaphorePermit>, Error> {
        try_acquire_semaphore_permit(&self.streams)
    }

    /// Wait for an install permit
    ///
    /// # Errors
    ///
    /// Returns an error once the manager has been closed.
    pub async fn acquire_install_permit(&self) -> Result<OwnedSemaphorePermit, Error> {
        acquire_semaphore_permit(self.installs.clone(), "module install").await
    }

    #[must_use]
    pub fn availability(&self) -> ResourceAvailability {
        ResourceAvailability {
            streams: self.streams.available_permits(),
            installs: self.installs.available_permits(),
        }
    }

    /// Close every pool; pending and future acquisitions fail
    pub fn close(&self) {
        self.streams.close();
        self.installs.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.streams.is_closed()
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(ResourceLimits::default())
    }
}
