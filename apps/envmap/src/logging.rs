//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so
//! the debug log carries the same story the terminal shows.

use envmap_events::{AppEvent, EventMessage, GeneralEvent, InstallEvent, ResolverEvent, StreamEvent};
use tracing::{debug, error, info, warn};

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::Install(event) => match event {
            InstallEvent::Requested { module } => {
                info!(source = meta.source.as_str(), event_id = %meta.event_id, module = %module, "Module install requested");
            }
            InstallEvent::Attached { module, waiters } => {
                debug!(source = meta.source.as_str(), module = %module, waiters, "Attached to running install");
            }
            InstallEvent::Progress {
                module,
                percent,
                bytes_downloaded,
                total_bytes,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    module = %module,
                    percent,
                    bytes_downloaded,
                    total_bytes,
                    "Module download progress"
                );
            }
            InstallEvent::Completed { module } => {
                info!(source = meta.source.as_str(), correlation = ?meta.correlation_id, module = %module, "Module installed");
            }
            InstallEvent::Failed { module, failure } => {
                warn!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    module = %module,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Module install failed"
                );
            }
            InstallEvent::Canceled { module } => {
                warn!(source = meta.source.as_str(), module = %module, "Module install canceled");
            }
            InstallEvent::Detached {
                module,
                dropped_waiters,
            } => {
                debug!(source = meta.source.as_str(), module = %module, dropped_waiters, "Detached from install");
            }
        },

        AppEvent::Resolver(event) => match event {
            ResolverEvent::Started { resolution_id } => {
                debug!(source = meta.source.as_str(), resolution_id = %resolution_id, "Resolution started");
            }
            ResolverEvent::Joined { resolution_id } => {
                debug!(source = meta.source.as_str(), resolution_id = %resolution_id, "Joined running resolution");
            }
            ResolverEvent::StrategySkipped { strategy, reason } => {
                debug!(source = meta.source.as_str(), strategy = %strategy, reason = %reason, "Strategy skipped");
            }
            ResolverEvent::StrategyEmpty { strategy } => {
                debug!(source = meta.source.as_str(), strategy = %strategy, "Strategy found nothing");
            }
            ResolverEvent::Resolved {
                resolution_id,
                provenance,
                count,
            } => {
                info!(
                    source = meta.source.as_str(),
                    resolution_id = %resolution_id,
                    provenance = %provenance,
                    count,
                    "Assets resolved"
                );
            }
            ResolverEvent::FellBack { resolution_id, uri } => {
                warn!(source = meta.source.as_str(), resolution_id = %resolution_id, uri = %uri, "Falling back to default asset");
            }
        },

        AppEvent::Stream(event) => match event {
            StreamEvent::Opened {
                uri,
                content_length,
            } => {
                debug!(source = meta.source.as_str(), uri = %uri, content_length = ?content_length, "Stream opened");
            }
            StreamEvent::Completed { uri, bytes } => {
                info!(source = meta.source.as_str(), uri = %uri, bytes, "Stream completed");
            }
            StreamEvent::Failed { uri, failure } => {
                error!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    uri = %uri,
                    code = ?failure.code,
                    message = %failure.message,
                    "Stream failed"
                );
            }
        },

        AppEvent::General(event) => match event {
            GeneralEvent::OperationStarted { operation } => {
                debug!(source = meta.source.as_str(), operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(source = meta.source.as_str(), operation = %operation, success, "Operation completed");
            }
            GeneralEvent::OperationFailed { operation, error } => {
                error!(source = meta.source.as_str(), operation = %operation, error = %error, "Operation failed");
            }
        },
    }
}
