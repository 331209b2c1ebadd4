//! Background copy from a blocking source into the pipe

use crate::stream::CopyOutcome;
use envmap_errors::StreamError;
use envmap_events::{AppEvent, EventEmitter, EventSender, StreamEvent};
use envmap_resources::ResourceManager;
use envmap_store::AssetReader;
use envmap_types::ResourceId;
use std::io::{self, Read};
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

type Chunk = io::Result<Vec<u8>>;

/// Everything one stream session owns
pub(crate) struct CopyJob {
    pub(crate) id: ResourceId,
    pub(crate) source: AssetReader,
    pub(crate) pipe: DuplexStream,
    pub(crate) buffer_size: usize,
    pub(crate) cancel: CancellationToken,
    pub(crate) readers: TaskTracker,
    pub(crate) resources: ResourceManager,
    pub(crate) tx: Option<EventSender>,
    pub(crate) outcome: oneshot::Sender<CopyOutcome>,
}

impl CopyJob {
    /// Copy to completion, report, then close the write end
    pub(crate) async fn run(self) {
        let Self {
            id,
            source,
            mut pipe,
            buffer_size,
            cancel,
            readers,
            resources,
            tx,
            outcome,
        } = self;

        let result = copy(
            &id,
            source,
            &mut pipe,
            buffer_size,
            &cancel,
            &readers,
            &resources,
        )
        .await;
        match &result {
            Ok(bytes) => {
                tracing::debug!(uri = %id, bytes, "stream completed");
                tx.emit(AppEvent::Stream(StreamEvent::Completed {
                    uri: id.to_string(),
                    bytes: *bytes,
                }));
            }
            Err(e) => {
                tracing::warn!(uri = %id, error = %e, "stream failed");
                tx.emit_stream_failed(&id, e);
            }
        }

        // the reader must be able to see the outcome as soon as it hits EOF
        let _ = outcome.send(result);
        drop(pipe);
    }
}

async fn copy(
    id: &ResourceId,
    source: AssetReader,
    pipe: &mut DuplexStream,
    buffer_size: usize,
    cancel: &CancellationToken,
    readers: &TaskTracker,
    resources: &ResourceManager,
) -> CopyOutcome {
    let interrupted = |transferred: u64, message: String| StreamError::CopyInterrupted {
        id: id.to_string(),
        transferred,
        message,
    };
    let declared = source.len();

    let _permit = tokio::select! {
        () = cancel.cancelled() => return Err(interrupted(0, "bridge shut down".to_string())),
        permit = resources.acquire_stream_permit() => {
            permit.map_err(|e| interrupted(0, e.to_string()))?
        }
    };

    let (chunk_tx, mut chunks) = mpsc::channel::<Chunk>(2);
    readers.spawn_blocking(move || read_chunks(source, buffer_size, &chunk_tx));

    let mut transferred = 0u64;
    let result = loop {
        let chunk = tokio::select! {
            () = cancel.cancelled() => break Err("bridge shut down".to_string()),
            chunk = chunks.recv() => chunk,
        };
        let bytes = match chunk {
            None => break Ok(()),
            Some(Err(e)) => break Err(format!("source read failed: {e}")),
            Some(Ok(bytes)) => bytes,
        };
        let written = tokio::select! {
            () = cancel.cancelled() => Err("bridge shut down".to_string()),
            written = pipe.write_all(&bytes) => {
                written.map_err(|e| format!("pipe write failed: {e}"))
            }
        };
        if let Err(message) = written {
            break Err(message);
        }
        transferred += bytes.len() as u64;
    };
    // a blocked reader thread notices the closed channel on its next send
    drop(chunks);
    result.map_err(|message| interrupted(transferred, message))?;

    let _ = pipe.shutdown().await;
    match declared {
        Some(len) if len != transferred => Err(interrupted(
            transferred,
            format!("source ended after {transferred} of {len} bytes"),
        )),
        _ => Ok(transferred),
    }
}

/// Blocking half: read fixed-size chunks until exhaustion or a closed channel
fn read_chunks(mut source: AssetReader, buffer_size: usize, tx: &mpsc::Sender<Chunk>) {
    loop {
        let mut buf = vec![0u8; buffer_size];
        match source.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => {
                buf.truncate(n);
                if tx.blocking_send(Ok(buf)).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                return;
            }
        }
    }
}
