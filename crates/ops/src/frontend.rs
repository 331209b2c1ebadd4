//! Pushing the resolved asset list to a front-end

use crate::assets::{asset_list_payload, resolve_assets};
use crate::OpsCtx;
use async_trait::async_trait;
use envmap_errors::{Error, OpsError};
use envmap_events::EventEmitter;
use envmap_types::ResolutionResult;

/// A consumer of the asset list, typically a viewer page
#[async_trait]
pub trait Frontend: Send + Sync {
    /// Whether the front-end can accept the list now
    async fn is_ready(&self) -> bool;

    /// Hand over the JSON array of identifier strings
    ///
    /// Returns `false` if the front-end rejected the payload.
    async fn set_asset_list(&self, payload: String) -> bool;
}

/// Resolve once, wait for the front-end, then deliver the list
///
/// Readiness is polled every `frontend.ready_poll_interval_ms`. With
/// `frontend.max_ready_attempts` set to 0 polling never gives up.
///
/// # Errors
///
/// Returns `FrontendNotReady` when the attempts run out and
/// `DeliveryRejected` when the front-end refuses the payload.
pub async fn push_when_ready(
    ctx: &OpsCtx,
    frontend: &dyn Frontend,
) -> Result<ResolutionResult, Error> {
    let result = resolve_assets(ctx).await;
    let payload = asset_list_payload(&result)?;

    wait_until_ready(ctx, frontend).await?;

    if !frontend.set_asset_list(payload).await {
        let err = OpsError::DeliveryRejected { count: result.len() };
        ctx.tx.emit_operation_failed("deliver", err.to_string());
        return Err(err.into());
    }

    tracing::info!(count = result.len(), "asset list delivered");
    ctx.tx.emit_operation_completed("deliver", true);
    Ok(result)
}

async fn wait_until_ready(ctx: &OpsCtx, frontend: &dyn Frontend) -> Result<(), Error> {
    let interval = ctx.config.ready_poll_interval();
    let max_attempts = ctx.config.frontend.max_ready_attempts;
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        if frontend.is_ready().await {
            tracing::debug!(attempts, "front-end ready");
            return Ok(());
        }
        if max_attempts > 0 && attempts >= max_attempts {
            let err = OpsError::FrontendNotReady { attempts };
            ctx.tx.emit_operation_failed("deliver", err.to_string());
            return Err(err.into());
        }
        tokio::time::sleep(interval).await;
    }
}
