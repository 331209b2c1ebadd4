//! Namespace to source lookup

use crate::source::AssetSource;
use envmap_types::Namespace;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps identifier namespaces back to the sources that produced them
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<Namespace, Arc<dyn AssetSource>>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` under its own namespace, replacing any previous one
    pub fn register(&mut self, source: Arc<dyn AssetSource>) {
        self.sources.insert(source.namespace(), source);
    }

    #[must_use]
    pub fn with(mut self, source: Arc<dyn AssetSource>) -> Self {
        self.register(source);
        self
    }

    #[must_use]
    pub fn get(&self, namespace: &Namespace) -> Option<Arc<dyn AssetSource>> {
        self.sources.get(namespace).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
