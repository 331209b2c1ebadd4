#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Streaming bridge for envmap
//!
//! Turns an identifier into a readable async handle. The asset is opened
//! on the blocking pool, then a copy task moves its bytes through an
//! in-memory pipe while the caller reads the other end. Copies run under a
//! shared concurrency ceiling and stop when the bridge shuts down.

mod copy;
mod mode;
mod stream;

pub use mode::OpenMode;
pub use stream::{AssetStream, ContentLength};

use copy::CopyJob;
use envmap_config::{calculate_stream_concurrency, Config};
use envmap_errors::{Error, StreamError};
use envmap_events::{AppEvent, EventEmitter, EventSender, StreamEvent};
use envmap_resources::{ResourceLimits, ResourceManager};
use envmap_store::SourceRegistry;
use envmap_types::ResourceId;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

struct Inner {
    sources: SourceRegistry,
    asset_dir: String,
    buffer_size: usize,
    pipe_capacity: usize,
    resources: ResourceManager,
    cancel: CancellationToken,
    tracker: TaskTracker,
    readers: TaskTracker,
    tx: Option<EventSender>,
}

/// Maps identifiers back to bytes
#[derive(Clone)]
pub struct StreamingBridge {
    inner: Arc<Inner>,
}

impl fmt::Debug for StreamingBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingBridge")
            .field("asset_dir", &self.inner.asset_dir)
            .field("sources", &self.inner.sources.len())
            .field("buffer_size", &self.inner.buffer_size)
            .field("pipe_capacity", &self.inner.pipe_capacity)
            .field("active_copies", &self.active_copies())
            .finish_non_exhaustive()
    }
}

impl StreamingBridge {
    #[must_use]
    pub fn builder(asset_dir: impl Into<String>, sources: SourceRegistry) -> BridgeBuilder {
        BridgeBuilder::new(asset_dir, sources)
    }

    /// Bridge sized from the `[streaming]` section
    #[must_use]
    pub fn from_config(config: &Config, sources: SourceRegistry) -> BridgeBuilder {
        let streams = calculate_stream_concurrency(config.streaming.max_concurrent_streams);
        Self::builder(config.assets.asset_dir.clone(), sources)
            .buffer_size(config.streaming.buffer_size)
            .pipe_capacity(config.streaming.pipe_capacity)
            .resources(ResourceManager::new(ResourceLimits::with_streams(streams)))
    }

    /// Open `id` for reading
    ///
    /// # Errors
    ///
    /// See [`StreamingBridge::open`].
    pub async fn open_as_stream(&self, id: &ResourceId) -> Result<AssetStream, Error> {
        self.open(id, OpenMode::Read).await
    }

    /// Parse `uri` and open it for reading
    ///
    /// # Errors
    ///
    /// Returns `StreamError::NotFound` for strings that are not identifiers,
    /// otherwise see [`StreamingBridge::open`].
    pub async fn open_uri(&self, uri: &str) -> Result<AssetStream, Error> {
        let id = ResourceId::parse(uri).map_err(|e| {
            tracing::debug!(uri, error = %e, "unparseable identifier");
            StreamError::NotFound {
                id: uri.to_string(),
            }
        })?;
        self.open_as_stream(&id).await
    }

    /// Open `id` and start streaming it
    ///
    /// The source is opened before any pipe exists, so a missing asset
    /// fails here without spawning anything. The returned stream is ready
    /// to read immediately. When the stream ceiling is reached the copy
    /// waits for a permit while keeping its source open, so every queued
    /// stream holds one open handle.
    ///
    /// # Errors
    ///
    /// - `StreamError::UnsupportedMode` for any mode but `Read`
    /// - `StreamError::NotFound` if no source serves the identifier or the
    ///   asset does not exist
    /// - `StreamError::SourceOpenFailed` if the source refused to open it
    /// - `Error::Cancelled` after shutdown
    pub async fn open(&self, id: &ResourceId, mode: OpenMode) -> Result<AssetStream, Error> {
        let result = self.open_inner(id, mode).await;
        if let Err(Error::Stream(e)) = &result {
            tracing::debug!(uri = %id, error = %e, "open failed");
            self.inner.tx.emit_stream_failed(id, e);
        }
        result
    }

    async fn open_inner(&self, id: &ResourceId, mode: OpenMode) -> Result<AssetStream, Error> {
        if mode != OpenMode::Read {
            return Err(StreamError::UnsupportedMode {
                mode: mode.to_string(),
            }
            .into());
        }
        if self.inner.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let uri = id.to_string();
        let not_found = || StreamError::NotFound { id: uri.clone() };
        if id.dir() != self.inner.asset_dir {
            return Err(not_found().into());
        }
        let source = self.inner.sources.get(id.namespace()).ok_or_else(not_found)?;

        let (dir, name) = (id.dir().to_string(), id.name().to_string());
        let reader = tokio::task::spawn_blocking(move || source.open(&dir, &name))
            .await
            .map_err(|e| Error::internal(format!("open task failed: {e}")))?
            .map_err(|e| StreamError::from_open_error(&e, &uri))?;

        let content_length = ContentLength::from_option(reader.len());
        let (consumer, producer) = tokio::io::duplex(self.inner.pipe_capacity);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        tracing::debug!(uri = %id, %content_length, "stream opened");
        self.inner.tx.emit(AppEvent::Stream(StreamEvent::Opened {
            uri,
            content_length: content_length.known(),
        }));

        self.inner.tracker.spawn(
            CopyJob {
                id: id.clone(),
                source: reader,
                pipe: producer,
                buffer_size: self.inner.buffer_size,
                cancel: self.inner.cancel.child_token(),
                readers: self.inner.readers.clone(),
                resources: self.inner.resources.clone(),
                tx: self.inner.tx.clone(),
                outcome: outcome_tx,
            }
            .run(),
        );

        Ok(AssetStream::new(
            id.clone(),
            consumer,
            content_length,
            outcome_rx,
        ))
    }

    /// Copy tasks that have not finished yet
    #[must_use]
    pub fn active_copies(&self) -> usize {
        self.inner.tracker.len()
    }

    #[must_use]
    pub fn resources(&self) -> &ResourceManager {
        &self.inner.resources
    }

    /// Stop every copy and wait for the copy and reader tasks to exit
    ///
    /// Open streams report a read error; later opens fail with
    /// `Error::Cancelled`.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        // copies have dropped their channels, so blocked readers return
        self.inner.readers.close();
        self.inner.readers.wait().await;
        tracing::debug!("streaming bridge shut down");
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

/// Configures a [`StreamingBridge`]
#[derive(Debug)]
pub struct BridgeBuilder {
    asset_dir: String,
    sources: SourceRegistry,
    buffer_size: usize,
    pipe_capacity: usize,
    resources: Option<ResourceManager>,
    tx: Option<EventSender>,
}

impl BridgeBuilder {
    #[must_use]
    pub fn new(asset_dir: impl Into<String>, sources: SourceRegistry) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            sources,
            buffer_size: DEFAULT_BUFFER_SIZE,
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
            resources: None,
            tx: None,
        }
    }

    /// Bytes read from the source per chunk
    #[must_use]
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes.max(1);
        self
    }

    /// Bytes the pipe holds before the copy waits for the reader
    #[must_use]
    pub fn pipe_capacity(mut self, bytes: usize) -> Self {
        self.pipe_capacity = bytes.max(1);
        self
    }

    /// Permit pools bounding concurrent copies
    #[must_use]
    pub fn resources(mut self, resources: ResourceManager) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Shorthand for a private pool with `streams` permits
    #[must_use]
    pub fn max_concurrent_streams(self, streams: usize) -> Self {
        self.resources(ResourceManager::new(ResourceLimits::with_streams(streams)))
    }

    #[must_use]
    pub fn event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn build(self) -> StreamingBridge {
        StreamingBridge {
            inner: Arc::new(Inner {
                sources: self.sources,
                asset_dir: self.asset_dir,
                buffer_size: self.buffer_size,
                pipe_capacity: self.pipe_capacity,
                resources: self.resources.unwrap_or_default(),
                cancel: CancellationToken::new(),
                tracker: TaskTracker::new(),
                readers: TaskTracker::new(),
                tx: self.tx,
            }),
        }
    }
}
