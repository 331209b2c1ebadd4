use envmap_types::Provenance;
use serde::{Deserialize, Serialize};

/// Asset list resolution events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverEvent {
    Started { resolution_id: String },

    /// A concurrent request joined the pending resolution
    Joined { resolution_id: String },

    /// A strategy declined to run (capability gate, install failure)
    StrategySkipped {
        strategy: Provenance,
        reason: String,
    },

    StrategyEmpty { strategy: Provenance },

    Resolved {
        resolution_id: String,
        provenance: Provenance,
        count: usize,
    },

    /// Every source came back empty and the fallback identifier was used
    FellBack { resolution_id: String, uri: String },
}
