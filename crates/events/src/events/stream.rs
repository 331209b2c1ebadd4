use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Asset byte streaming events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Source opened and copy task scheduled
    Opened {
        uri: String,
        content_length: Option<u64>,
    },

    Completed { uri: String, bytes: u64 },

    Failed {
        uri: String,
        failure: FailureContext,
    },
}
