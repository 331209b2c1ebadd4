//! Operation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum OpsError {
    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("front-end not ready after {attempts} attempts")]
    FrontendNotReady { attempts: u32 },

    #[error("front-end rejected asset list of {count} entries")]
    DeliveryRejected { count: usize },

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("resource pool closed while acquiring for {operation}")]
    ResourceClosed { operation: String },

    #[error("context shut down")]
    ShutDown,
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::FrontendNotReady { .. } => {
                Some("Raise frontend.max_ready_attempts or check that the viewer page loads.")
            }
            Self::DeliveryRejected { .. } => {
                Some("The viewer did not accept the list; check its console output.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FrontendNotReady { .. } | Self::DeliveryRejected { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::FrontendNotReady { .. } => "ops.frontend_not_ready",
            Self::DeliveryRejected { .. } => "ops.delivery_rejected",
            Self::SerializationError { .. } => "ops.serialization_error",
            Self::ResourceClosed { .. } => "ops.resource_closed",
            Self::ShutDown => "ops.shut_down",
        };
        Some(code)
    }
}
