//! Semaphore utilities for resource management
//!
//! Helpers for acquiring permits with consistent error handling across
//! envmap crates.

use envmap_errors::{Error, OpsError};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Acquire a semaphore permit, waiting if none is free
///
/// `operation` names the work in the error when the pool has been closed.
///
/// # Errors
///
/// Returns an error if the semaphore is closed.
pub async fn acquire_semaphore_permit(
    semaphore: Arc<Semaphore>,
    operation: &str,
) -> Result<OwnedSemaphorePermit, Error> {
    semaphore.acquire_owned().await.map_err(|_| {
        OpsError::ResourceClosed {
            operation: operation.to_string(),
        }
        .into()
    })
}

/// Try to acquire a semaphore permit without waiting
///
/// Returns `Ok(Some(permit))` if successful, `Ok(None)` if it would block.
///
/// # Errors
///
/// Returns an error if the semaphore is closed.
pub fn try_acquire_semaphore_permit(
    semaphore: &Arc<Semaphore>,
) -> Result<Option<OwnedSemaphorePermit>, Error> {
    match semaphore.clone().try_acquire_owned() {
        Ok(permit) => Ok(Some(permit)),
        Err(tokio::sync::TryAcquireError::NoPermits) => Ok(None),
        Err(tokio::sync::TryAcquireError::Closed) => Err(OpsError::ResourceClosed {
            operation: "try_acquire".to_string(),
        }
        .into()),
    }
}

/// Create a shared semaphore with `permits` permits
#[must_use]
pub fn create_semaphore(permits: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(permits))
}
