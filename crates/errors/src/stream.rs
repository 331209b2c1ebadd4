//! Asset streaming error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StreamError {
    #[error("asset not found: {id}")]
    NotFound { id: String },

    #[error("failed to open asset {id}: {message}")]
    SourceOpenFailed { id: String, message: String },

    #[error("copy of {id} interrupted after {transferred} bytes: {message}")]
    CopyInterrupted {
        id: String,
        transferred: u64,
        message: String,
    },

    #[error("unsupported open mode: {mode}")]
    UnsupportedMode { mode: String },
}

impl StreamError {
    /// Classify an `io::Error` raised while opening `id`.
    #[must_use]
    pub fn from_open_error(err: &std::io::Error, id: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { id: id.to_string() },
            _ => Self::SourceOpenFailed {
                id: id.to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl UserFacingError for StreamError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Resolve the asset list again; the identifier does not map to any asset.")
            }
            Self::UnsupportedMode { .. } => Some("Assets can only be opened for reading."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CopyInterrupted { .. } | Self::SourceOpenFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "stream.not_found",
            Self::SourceOpenFailed { .. } => "stream.source_open_failed",
            Self::CopyInterrupted { .. } => "stream.copy_interrupted",
            Self::UnsupportedMode { .. } => "stream.unsupported_mode",
        };
        Some(code)
    }
}
