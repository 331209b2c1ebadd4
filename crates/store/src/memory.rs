//! In-memory source

use crate::source::{AssetReader, AssetSource};
use envmap_types::Namespace;
use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::{Arc, RwLock};

/// Source holding its assets in memory
///
/// Entries keep insertion order. Useful for embedding small fixed sets of
/// assets and for exercising the pipeline without a filesystem.
#[derive(Debug, Clone)]
pub struct MemorySource {
    namespace: Namespace,
    available: bool,
    dirs: Arc<RwLock<BTreeMap<String, Vec<(String, Arc<[u8]>)>>>>,
}

impl MemorySource {
    #[must_use]
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            available: true,
            dirs: Arc::default(),
        }
    }

    /// Mark the source as unavailable; it then lists nothing
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Add or replace `dir/name`
    pub fn insert(&self, dir: &str, name: &str, bytes: impl Into<Vec<u8>>) {
        let bytes: Arc<[u8]> = bytes.into().into();
        let mut dirs = self
            .dirs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let entries = dirs.entry(dir.to_string()).or_default();
        if let Some(entry) = entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = bytes;
        } else {
            entries.push((name.to_string(), bytes));
        }
    }

    #[must_use]
    pub fn with(self, dir: &str, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(dir, name, bytes);
        self
    }
}

impl AssetSource for MemorySource {
    fn namespace(&self) -> Namespace {
        self.namespace.clone()
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn list_dir(&self, dir: &str) -> io::Result<Vec<String>> {
        let dirs = self
            .dirs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        dirs.get(dir)
            .map(|entries| entries.iter().map(|(name, _)| name.clone()).collect())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no directory {dir}")))
    }

    fn open(&self, dir: &str, name: &str) -> io::Result<AssetReader> {
        let dirs = self
            .dirs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let bytes = dirs
            .get(dir)
            .and_then(|entries| entries.iter().find(|(n, _)| n == name))
            .map(|(_, bytes)| Arc::clone(bytes))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry {dir}/{name}")))?;
        let len = bytes.len() as u64;
        Ok(AssetReader::new(Cursor::new(bytes), Some(len)))
    }
}
