//! Read end handed to consumers

use envmap_errors::StreamError;
use envmap_types::ResourceId;
use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, DuplexStream, ReadBuf};
use tokio::sync::oneshot;

/// Declared size of a streamed asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLength {
    Known(u64),
    /// The source could not tell the size up front
    Unknown,
}

impl ContentLength {
    #[must_use]
    pub fn from_option(len: Option<u64>) -> Self {
        len.map_or(Self::Unknown, Self::Known)
    }

    #[must_use]
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(len) => Some(len),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ContentLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(len) => write!(f, "{len}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Terminal report sent by the copy task before it closes the write end
pub(crate) type CopyOutcome = Result<u64, StreamError>;

#[derive(Debug)]
enum Finish {
    Pending(oneshot::Receiver<CopyOutcome>),
    Succeeded,
    Failed(io::ErrorKind, String),
}

/// Readable handle on one asset
///
/// Bytes arrive through an in-memory pipe filled by a background copy task.
/// End-of-data is only reported once the copy task has confirmed that it
/// transferred the whole asset; a copy that fails midway surfaces as a read
/// error instead.
pub struct AssetStream {
    id: ResourceId,
    pipe: DuplexStream,
    content_length: ContentLength,
    received: u64,
    finish: Finish,
}

impl AssetStream {
    pub(crate) fn new(
        id: ResourceId,
        pipe: DuplexStream,
        content_length: ContentLength,
        outcome: oneshot::Receiver<CopyOutcome>,
    ) -> Self {
        Self {
            id,
            pipe,
            content_length,
            received: 0,
            finish: Finish::Pending(outcome),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    #[must_use]
    pub fn content_length(&self) -> ContentLength {
        self.content_length
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.id.content_type()
    }

    /// Bytes handed to the consumer so far
    #[must_use]
    pub fn bytes_received(&self) -> u64 {
        self.received
    }

    /// Decide what end-of-pipe means once the copy task has reported
    fn settle(&self, outcome: Result<CopyOutcome, oneshot::error::RecvError>) -> Finish {
        let complete = |n: u64| self.content_length.known().is_some_and(|len| len == n);
        match outcome {
            Ok(Ok(_)) => Finish::Succeeded,
            Ok(Err(StreamError::CopyInterrupted { transferred, .. }))
                if complete(transferred) && self.received == transferred =>
            {
                Finish::Succeeded
            }
            Ok(Err(e)) => Finish::Failed(io::ErrorKind::UnexpectedEof, e.to_string()),
            Err(_) => Finish::Failed(
                io::ErrorKind::BrokenPipe,
                format!("copy of {} ended without reporting", self.id),
            ),
        }
    }
}

impl AsyncRead for AssetStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        let before = buf.filled().len();
        match Pin::new(&mut this.pipe).poll_read(cx, buf) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
            Poll::Ready(Ok(())) => {}
        }
        let read = buf.filled().len() - before;
        if read > 0 || buf.remaining() == 0 {
            this.received += read as u64;
            return Poll::Ready(Ok(()));
        }

        // end of pipe
        if let Finish::Pending(rx) = &mut this.finish {
            match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(outcome) => this.finish = this.settle(outcome),
            }
        }

        match &this.finish {
            Finish::Succeeded => Poll::Ready(Ok(())),
            Finish::Failed(kind, message) => {
                Poll::Ready(Err(io::Error::new(*kind, message.clone())))
            }
            Finish::Pending(_) => Poll::Pending,
        }
    }
}

impl fmt::Debug for AssetStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStream")
            .field("id", &self.id)
            .field("content_length", &self.content_length)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn id() -> ResourceId {
        ResourceId::bundle("hdri_4k", "ex.hdr").unwrap()
    }

    #[tokio::test]
    async fn reports_eof_after_successful_copy() {
        let (reader, mut writer) = tokio::io::duplex(16);
        let (tx, rx) = oneshot::channel();
        let mut stream = AssetStream::new(id(), reader, ContentLength::Known(3), rx);

        writer.write_all(b"abc").await.unwrap();
        tx.send(Ok(3)).unwrap();
        drop(writer);

        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"abc");
        assert_eq!(stream.bytes_received(), 3);
    }

    #[tokio::test]
    async fn failed_copy_is_a_read_error() {
        let (reader, mut writer) = tokio::io::duplex(16);
        let (tx, rx) = oneshot::channel();
        let mut stream = AssetStream::new(id(), reader, ContentLength::Unknown, rx);

        writer.write_all(b"ab").await.unwrap();
        tx.send(Err(StreamError::CopyInterrupted {
            id: id().to_string(),
            transferred: 2,
            message: "disk went away".to_string(),
        }))
        .unwrap();
        drop(writer);

        let mut out = Vec::new();
        let err = stream.read_to_end(&mut out).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(out, b"ab");
        // the failure sticks
        let mut more = [0u8; 4];
        assert!(stream.read(&mut more).await.is_err());
    }

    #[tokio::test]
    async fn late_error_after_full_declared_length_is_success() {
        let (reader, mut writer) = tokio::io::duplex(16);
        let (tx, rx) = oneshot::channel();
        let mut stream = AssetStream::new(id(), reader, ContentLength::Known(2), rx);

        writer.write_all(b"ab").await.unwrap();
        tx.send(Err(StreamError::CopyInterrupted {
            id: id().to_string(),
            transferred: 2,
            message: "close failed".to_string(),
        }))
        .unwrap();
        drop(writer);

        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"ab");
    }

    #[tokio::test]
    async fn vanished_copy_task_is_a_read_error() {
        let (reader, writer) = tokio::io::duplex(16);
        let (tx, rx) = oneshot::channel::<CopyOutcome>();
        let mut stream = AssetStream::new(id(), reader, ContentLength::Unknown, rx);
        drop(tx);
        drop(writer);

        let mut out = Vec::new();
        let err = stream.read_to_end(&mut out).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn content_length_display() {
        assert_eq!(ContentLength::Known(12).to_string(), "12");
        assert_eq!(ContentLength::from_option(None), ContentLength::Unknown);
        assert_eq!(ContentLength::Unknown.to_string(), "unknown");
    }
}
