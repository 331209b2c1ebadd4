//! Installed module contents as an asset source

use crate::provider::ModuleProvider;
use envmap_store::{AssetReader, AssetSource};
use envmap_types::Namespace;
use std::io;
use std::sync::Arc;

/// Exposes an installed module's files under a remote-module namespace
#[derive(Debug, Clone)]
pub struct ModuleAssets {
    provider: Arc<dyn ModuleProvider>,
    module: String,
    authority: String,
}

impl ModuleAssets {
    #[must_use]
    pub fn new(
        provider: Arc<dyn ModuleProvider>,
        module: impl Into<String>,
        authority: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            module: module.into(),
            authority: authority.into(),
        }
    }
}

impl AssetSource for ModuleAssets {
    fn namespace(&self) -> Namespace {
        Namespace::RemoteModule {
            authority: self.authority.clone(),
        }
    }

    fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    fn list_dir(&self, dir: &str) -> io::Result<Vec<String>> {
        self.provider.list_files(&self.module, dir)
    }

    fn open(&self, dir: &str, name: &str) -> io::Result<AssetReader> {
        self.provider.open_file(&self.module, dir, name)
    }
}
