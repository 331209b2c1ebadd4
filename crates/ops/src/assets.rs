//! Asset operations: resolve, serialize, open, install, status

use crate::types::{InstallReport, ModuleStatus, StreamReport};
use crate::OpsCtx;
use envmap_bridge::AssetStream;
use envmap_errors::Error;
use envmap_events::EventEmitter;
use envmap_types::ResolutionResult;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Run the resolution pipeline
///
/// Concurrent callers share one resolution. Never fails; an empty world
/// resolves to the fallback asset.
pub async fn resolve_assets(ctx: &OpsCtx) -> ResolutionResult {
    ctx.tx.emit_operation_started("resolve");
    let result = ctx.pipeline.resolve().await;
    ctx.tx.emit_operation_completed("resolve", true);
    result
}

/// Serialize a resolution into the JSON array of identifier strings the
/// front-end consumes
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn asset_list_payload(result: &ResolutionResult) -> Result<String, Error> {
    Ok(serde_json::to_string(&result.uris())?)
}

/// Open an asset by its identifier string
///
/// # Errors
///
/// Returns `StreamError::NotFound` for malformed or unknown identifiers and
/// `Error::Cancelled` once the context is shut down.
pub async fn open_asset(ctx: &OpsCtx, uri: &str) -> Result<AssetStream, Error> {
    ctx.bridge.open_uri(uri).await
}

/// Stream an asset into `writer`
///
/// `destination` is only recorded in the report.
///
/// # Errors
///
/// Returns open failures from the bridge, or an I/O error if the copy is
/// interrupted or the writer fails.
pub async fn copy_asset<W>(
    ctx: &OpsCtx,
    uri: &str,
    writer: &mut W,
    destination: Option<PathBuf>,
) -> Result<StreamReport, Error>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut stream = open_asset(ctx, uri).await?;
    let bytes = tokio::io::copy(&mut stream, writer).await?;
    writer.flush().await?;

    tracing::debug!(uri, bytes, "asset copied");
    Ok(StreamReport {
        uri: stream.id().to_string(),
        content_type: stream.content_type().to_string(),
        content_length: stream.content_length().known(),
        bytes,
        destination,
    })
}

/// Install the remote module, reporting percentages to `on_progress`
///
/// # Errors
///
/// Returns the install failure reported by the installer.
pub async fn install_module(
    ctx: &OpsCtx,
    on_progress: impl Fn(u8) + Send + Sync + 'static,
) -> Result<InstallReport, Error> {
    let module = ctx.installer.module().to_string();
    let already_installed = ctx.installer.is_installed();
    ctx.tx.emit_operation_started(format!("install {module}"));

    if let Err(e) = ctx.installer.install(on_progress).await {
        ctx.tx
            .emit_operation_failed(format!("install {module}"), e.to_string());
        return Err(e.into());
    }

    ctx.tx
        .emit_operation_completed(format!("install {module}"), true);
    Ok(InstallReport {
        module,
        state: ctx.installer.state(),
        already_installed,
    })
}

/// Report the module state and configured locations
#[must_use]
pub fn status(ctx: &OpsCtx) -> ModuleStatus {
    ModuleStatus {
        module: ctx.installer.module().to_string(),
        state: ctx.installer.state(),
        installed: ctx.installer.is_installed(),
        remote_enabled: ctx.installer.is_available(),
        bundle_dir: ctx.config.bundle_path(),
        catalog_dir: ctx.config.catalog_path(),
        modules_dir: ctx.config.modules_path(),
        active_streams: ctx.bridge.active_copies(),
    }
}

/// Tear the context down
///
/// Detaches install waiters, cancels running copies and waits for them,
/// then closes the permit pools.
pub async fn shutdown(ctx: &OpsCtx) {
    ctx.installer.shutdown();
    ctx.bridge.shutdown().await;
    ctx.resources.close();
    tracing::debug!("operations context shut down");
}
