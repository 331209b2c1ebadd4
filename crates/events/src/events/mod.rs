use serde::{Deserialize, Serialize};

use crate::EventSource;
use envmap_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod install;
pub mod resolver;
pub mod stream;

pub use general::*;
pub use install::*;
pub use resolver::*;
pub use stream::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Top-level operation lifecycle
    General(GeneralEvent),

    /// Remote module install lifecycle
    Install(InstallEvent),

    /// Asset list resolution
    Resolver(ResolverEvent),

    /// Asset byte streaming
    Stream(StreamEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Install(_) => EventSource::Install,
            Self::Resolver(_) => EventSource::Resolver,
            Self::Stream(_) => EventSource::Stream,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::OperationFailed { .. })
            | Self::Stream(StreamEvent::Failed { .. }) => Level::ERROR,

            Self::Install(InstallEvent::Failed { .. } | InstallEvent::Canceled { .. })
            | Self::Resolver(ResolverEvent::FellBack { .. }) => Level::WARN,

            Self::Install(InstallEvent::Progress { .. })
            | Self::Resolver(
                ResolverEvent::StrategySkipped { .. } | ResolverEvent::StrategyEmpty { .. },
            )
            | Self::Stream(StreamEvent::Opened { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "envmap::events::general",
            Self::Install(_) => "envmap::events::install",
            Self::Resolver(_) => "envmap::events::resolver",
            Self::Stream(_) => "envmap::events::stream",
        }
    }
}
