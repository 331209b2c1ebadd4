//! Module installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InstallError {
    /// The delivery provider reported a failed install session.
    #[error("module install failed with provider code {code}")]
    ProviderFailed { code: i32 },

    /// The delivery provider reported the session as canceled.
    #[error("module install canceled")]
    Canceled,

    /// The provider refused to start an install session at all.
    #[error("module install could not start: {message}")]
    StartFailed { message: String },

    /// The provider's status stream ended without a terminal status.
    #[error("module install interrupted: {message}")]
    Interrupted { message: String },

    /// The installer was torn down while the install was in flight.
    #[error("module installer shut down")]
    ShutDown,
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ProviderFailed { .. } | Self::Interrupted { .. } => {
                Some("Check connectivity and free storage, then retry the install.")
            }
            Self::StartFailed { .. } => {
                Some("Verify the module catalog is reachable and the module name is correct.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderFailed { .. } | Self::Interrupted { .. } | Self::Canceled
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ProviderFailed { .. } => "install.provider_failed",
            Self::Canceled => "install.canceled",
            Self::StartFailed { .. } => "install.start_failed",
            Self::Interrupted { .. } => "install.interrupted",
            Self::ShutDown => "install.shut_down",
        };
        Some(code)
    }
}
