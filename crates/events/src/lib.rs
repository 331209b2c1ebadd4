#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in envmap
//!
//! Library crates never print. They report what happens through events that
//! the host (the CLI, or an embedding application shell) renders or forwards
//! to tracing.
//!
//! ## Architecture
//!
//! - **Domain events**: grouped by component (Install, Resolver, Stream)
//! - **Unified `EventEmitter` trait**: one API whether you hold a raw sender
//!   or a struct that carries one
//! - **Metadata envelope**: every event travels with an [`EventMeta`]

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, FailureContext, GeneralEvent, InstallEvent, ResolverEvent, StreamEvent,
};

use envmap_errors::UserFacingError;
use envmap_types::{Provenance, ResourceId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// An event paired with its metadata envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from the event itself.
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }
}

/// Type alias for event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout envmap
///
/// This trait provides a single, consistent API for emitting events regardless of
/// whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        self.emit_with_meta(meta, event);
    }

    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    fn emit_operation_failed(&self, operation: impl Into<String>, error: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            error: error.into(),
        }));
    }

    /// Emit an install progress event correlated to the module name
    fn emit_install_progress(
        &self,
        module: &str,
        percent: u8,
        bytes_downloaded: u64,
        total_bytes: u64,
    ) {
        let event = AppEvent::Install(InstallEvent::Progress {
            module: module.to_string(),
            percent,
            bytes_downloaded,
            total_bytes,
        });
        let meta = EventMeta::new(event.log_level(), event.event_source())
            .with_correlation_id(module);
        self.emit_with_meta(meta, event);
    }

    /// Emit an install failure built from the error's user-facing view
    fn emit_install_failed<E: UserFacingError + ?Sized>(&self, module: &str, error: &E) {
        let event = AppEvent::Install(InstallEvent::Failed {
            module: module.to_string(),
            failure: FailureContext::from_error(error),
        });
        let meta = EventMeta::new(event.log_level(), event.event_source())
            .with_correlation_id(module);
        self.emit_with_meta(meta, event);
    }

    /// Emit the final outcome of a resolution request
    fn emit_resolved(&self, resolution_id: &str, provenance: Provenance, count: usize) {
        let event = AppEvent::Resolver(ResolverEvent::Resolved {
            resolution_id: resolution_id.to_string(),
            provenance,
            count,
        });
        let meta = EventMeta::new(event.log_level(), event.event_source())
            .with_correlation_id(resolution_id);
        self.emit_with_meta(meta, event);
    }

    /// Emit a stream failure correlated to the asset identifier
    fn emit_stream_failed<E: UserFacingError + ?Sized>(&self, id: &ResourceId, error: &E) {
        let uri = id.to_string();
        let event = AppEvent::Stream(StreamEvent::Failed {
            uri: uri.clone(),
            failure: FailureContext::from_error(error),
        });
        let meta =
            EventMeta::new(event.log_level(), event.event_source()).with_correlation_id(uri);
        self.emit_with_meta(meta, event);
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
/// This allows `EventSender` to be used directly where `EventEmitter` is expected
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Optional sender; components built without an event channel stay silent.
impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
