//! Resolution results handed to the front-end

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ResourceId;

/// Which source satisfied a resolution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    RemoteModule,
    LocalBundle,
    Fallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteModule => write!(f, "remote module"),
            Self::LocalBundle => write!(f, "local bundle"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Ordered identifiers plus the source that produced them.
///
/// Order is the enumeration order of the source. The value is immutable once
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    ids: Vec<ResourceId>,
    provenance: Provenance,
}

impl ResolutionResult {
    #[must_use]
    pub fn new(ids: Vec<ResourceId>, provenance: Provenance) -> Self {
        Self { ids, provenance }
    }

    /// Single-entry result carrying the fallback identifier.
    #[must_use]
    pub fn fallback(id: ResourceId) -> Self {
        Self {
            ids: vec![id],
            provenance: Provenance::Fallback,
        }
    }

    #[must_use]
    pub fn ids(&self) -> &[ResourceId] {
        &self.ids
    }

    #[must_use]
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers rendered as URI strings, in order.
    #[must_use]
    pub fn uris(&self) -> Vec<String> {
        self.ids.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn into_ids(self) -> Vec<ResourceId> {
        self.ids
    }
}
