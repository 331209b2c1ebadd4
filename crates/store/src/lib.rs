#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Asset sources and enumeration for envmap
//!
//! A source is anything that can list a logical directory and open one of
//! its entries for sequential reading: the local bundle shipped with the
//! base package, or an installed remote module. [`ResourceStore`] turns a
//! source listing into [`ResourceId`]s; the streaming bridge uses the same
//! sources to map identifiers back to bytes.

mod bundle;
mod memory;
mod registry;
mod source;

pub use bundle::BundleSource;
pub use memory::MemorySource;
pub use registry::SourceRegistry;
pub use source::{AssetReader, AssetSource};

use envmap_config::AssetConfig;
use envmap_types::ResourceId;
use std::sync::Arc;

/// Enumerates eligible assets from a source
#[derive(Debug, Clone)]
pub struct ResourceStore {
    asset_dir: String,
    suffix: String,
}

impl ResourceStore {
    /// Create a store that lists `asset_dir` and keeps names ending in `suffix`
    #[must_use]
    pub fn new(asset_dir: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            suffix: suffix.into().to_ascii_lowercase(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(config.asset_dir.clone(), config.suffix.clone())
    }

    #[must_use]
    pub fn asset_dir(&self) -> &str {
        &self.asset_dir
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether a file name passes the suffix filter (ASCII case-insensitive)
    #[must_use]
    pub fn is_eligible(&self, name: &str) -> bool {
        name.to_ascii_lowercase().ends_with(&self.suffix)
    }

    /// List every eligible asset of `source`, in the source's enumeration order
    ///
    /// An unavailable source, a missing directory, or any listing failure
    /// yields an empty list.
    #[must_use]
    pub fn list_assets_blocking(&self, source: &dyn AssetSource) -> Vec<ResourceId> {
        let namespace = source.namespace();
        if !source.is_available() {
            tracing::debug!(%namespace, "source unavailable");
            return Vec::new();
        }

        let names = match source.list_dir(&self.asset_dir) {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!(%namespace, dir = %self.asset_dir, error = %e, "listing failed");
                return Vec::new();
            }
        };

        let ids: Vec<ResourceId> = names
            .into_iter()
            .filter(|name| self.is_eligible(name))
            .filter_map(
                |name| match ResourceId::new(namespace.clone(), self.asset_dir.clone(), &name) {
                    Ok(id) => Some(id),
                    Err(e) => {
                        tracing::warn!(%namespace, name = %name, error = %e, "skipping entry");
                        None
                    }
                },
            )
            .collect();

        tracing::debug!(%namespace, count = ids.len(), "listed assets");
        ids
    }

    /// Async wrapper around [`ResourceStore::list_assets_blocking`]
    ///
    /// Listing touches the filesystem or the provider, so it runs on the
    /// blocking pool.
    pub async fn list_assets(&self, source: Arc<dyn AssetSource>) -> Vec<ResourceId> {
        let store = self.clone();
        match tokio::task::spawn_blocking(move || store.list_assets_blocking(source.as_ref())).await
        {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "listing task failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_filter_ignores_case() {
        let store = ResourceStore::new("hdri_4k", ".HDR");
        assert!(store.is_eligible("a.hdr"));
        assert!(store.is_eligible("B.Hdr"));
        assert!(!store.is_eligible("c.exr"));
        assert!(!store.is_eligible("hdr"));
    }

    #[test]
    fn bare_suffix_is_an_asset() {
        let store = ResourceStore::new("hdri_4k", ".hdr");
        assert!(store.is_eligible(".hdr"));
        assert!(store.is_eligible(".HDR"));

        let source =
            MemorySource::new(envmap_types::Namespace::LocalBundle).with("hdri_4k", ".hdr", b"x".to_vec());
        let ids = store.list_assets_blocking(&source);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].name(), ".hdr");
    }
}
