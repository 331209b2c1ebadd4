use serde::{Deserialize, Serialize};

/// Lifecycle of the top-level operations the ops layer runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    OperationStarted { operation: String },

    OperationCompleted { operation: String, success: bool },

    OperationFailed { operation: String, error: String },
}
