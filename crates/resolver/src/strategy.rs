//! Resolver strategies

use async_trait::async_trait;
use envmap_install::ModuleInstaller;
use envmap_store::{AssetSource, ResourceStore};
use envmap_types::{Provenance, ResourceId};
use std::fmt;
use std::sync::Arc;

/// What a single strategy produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Found(Vec<ResourceId>),
    Empty,
    /// The strategy could not run; the reason is logged
    Skipped(String),
}

impl StrategyOutcome {
    fn from_ids(ids: Vec<ResourceId>) -> Self {
        if ids.is_empty() {
            Self::Empty
        } else {
            Self::Found(ids)
        }
    }
}

/// One step of the fallback chain
#[async_trait]
pub trait ResolverStrategy: Send + Sync + fmt::Debug {
    /// Provenance recorded when this strategy wins
    fn provenance(&self) -> Provenance;

    /// Produce identifiers; never fails, problems become `Empty` or `Skipped`
    async fn resolve(&self) -> StrategyOutcome;
}

/// Lists the remote module, installing it first when needed
#[derive(Debug, Clone)]
pub struct RemoteModuleStrategy {
    installer: ModuleInstaller,
    store: ResourceStore,
    source: Arc<dyn AssetSource>,
}

impl RemoteModuleStrategy {
    #[must_use]
    pub fn new(
        installer: ModuleInstaller,
        store: ResourceStore,
        source: Arc<dyn AssetSource>,
    ) -> Self {
        Self {
            installer,
            store,
            source,
        }
    }
}

#[async_trait]
impl ResolverStrategy for RemoteModuleStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::RemoteModule
    }

    async fn resolve(&self) -> StrategyOutcome {
        if !self.installer.is_available() {
            return StrategyOutcome::Skipped("remote delivery unavailable".to_string());
        }

        if !self.installer.is_installed() {
            let module = self.installer.module().to_string();
            let outcome = self
                .installer
                .install(move |pct| tracing::debug!(module = %module, percent = pct, "install progress"))
                .await;
            if let Err(e) = outcome {
                return StrategyOutcome::Skipped(format!("install failed: {e}"));
            }
        }

        StrategyOutcome::from_ids(self.store.list_assets(Arc::clone(&self.source)).await)
    }
}

/// Lists the assets bundled with the base package
#[derive(Debug, Clone)]
pub struct LocalBundleStrategy {
    store: ResourceStore,
    source: Arc<dyn AssetSource>,
}

impl LocalBundleStrategy {
    #[must_use]
    pub fn new(store: ResourceStore, source: Arc<dyn AssetSource>) -> Self {
        Self { store, source }
    }
}

#[async_trait]
impl ResolverStrategy for LocalBundleStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::LocalBundle
    }

    async fn resolve(&self) -> StrategyOutcome {
        StrategyOutcome::from_ids(self.store.list_assets(Arc::clone(&self.source)).await)
    }
}

/// Always yields the single fixed fallback identifier
#[derive(Debug, Clone)]
pub struct FallbackStrategy {
    id: ResourceId,
}

impl FallbackStrategy {
    #[must_use]
    pub fn new(id: ResourceId) -> Self {
        Self { id }
    }

    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }
}

#[async_trait]
impl ResolverStrategy for FallbackStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::Fallback
    }

    async fn resolve(&self) -> StrategyOutcome {
        StrategyOutcome::Found(vec![self.id.clone()])
    }
}
