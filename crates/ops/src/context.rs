//! Operations context for dependency injection

use envmap_bridge::StreamingBridge;
use envmap_config::{calculate_stream_concurrency, Config};
use envmap_errors::{Error, OpsError};
use envmap_events::EventSender;
use envmap_install::{FsModuleProvider, ModuleAssets, ModuleInstaller, ModuleProvider};
use envmap_resolver::ResolutionPipeline;
use envmap_resources::{ResourceLimits, ResourceManager};
use envmap_store::{AssetSource, BundleSource, ResourceStore, SourceRegistry};
use envmap_types::ResourceId;
use std::sync::Arc;

/// Operations context providing access to all components
#[derive(Debug, Clone)]
pub struct OpsCtx {
    /// Configuration the components were built from
    pub config: Config,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// The single installer for the remote module
    pub installer: ModuleInstaller,
    pub pipeline: ResolutionPipeline,
    pub bridge: StreamingBridge,
    /// Permit pools shared by the installer and the bridge
    pub resources: ResourceManager,
}

impl OpsCtx {
    /// Wire every component around the filesystem module provider
    ///
    /// # Errors
    ///
    /// Returns an error if the configured names cannot form identifiers.
    pub fn from_config(config: Config, tx: EventSender) -> Result<Self, Error> {
        let provider = FsModuleProvider::new(config.catalog_path(), config.modules_path())
            .with_chunk_size(config.delivery.install_chunk_size)
            .with_availability(config.delivery.remote_enabled);
        Self::with_provider(config, Arc::new(provider), tx)
    }

    /// Wire every component from configuration
    ///
    /// The remote module is served by `provider`, which also carries the
    /// remote capability gate; the local bundle is read from
    /// `config.bundle_path()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured names cannot form identifiers.
    pub fn with_provider(
        config: Config,
        provider: Arc<dyn ModuleProvider>,
        tx: EventSender,
    ) -> Result<Self, Error> {
        let assets = &config.assets;
        let fallback = ResourceId::bundle(assets.asset_dir.clone(), assets.fallback_asset.clone())
            .map_err(|e| Error::internal(format!("invalid fallback asset: {e}")))?;

        let streams = calculate_stream_concurrency(config.streaming.max_concurrent_streams);
        let resources = ResourceManager::new(ResourceLimits::with_streams(streams));

        let installer = ModuleInstaller::new(assets.module_name.clone(), Arc::clone(&provider))
            .with_event_sender(tx.clone())
            .with_resources(resources.clone());

        let remote: Arc<dyn AssetSource> = Arc::new(ModuleAssets::new(
            provider,
            assets.module_name.clone(),
            assets.authority.clone(),
        ));
        let local: Arc<dyn AssetSource> = Arc::new(BundleSource::new(config.bundle_path()));
        let store = ResourceStore::from_config(assets);

        let pipeline = ResolutionPipeline::builder(fallback)
            .remote(installer.clone(), store.clone(), Arc::clone(&remote))
            .local(store, Arc::clone(&local))
            .event_sender(tx.clone())
            .build();

        let sources = SourceRegistry::new().with(remote).with(local);
        let bridge = StreamingBridge::from_config(&config, sources)
            .resources(resources.clone())
            .event_sender(tx.clone())
            .build();

        OpsContextBuilder::new()
            .with_config(config)
            .with_event_sender(tx)
            .with_installer(installer)
            .with_pipeline(pipeline)
            .with_bridge(bridge)
            .with_resources(resources)
            .build()
    }
}

/// Builder for the operations context
#[derive(Debug, Default)]
pub struct OpsContextBuilder {
    config: Option<Config>,
    tx: Option<EventSender>,
    installer: Option<ModuleInstaller>,
    pipeline: Option<ResolutionPipeline>,
    bridge: Option<StreamingBridge>,
    resources: Option<ResourceManager>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn with_installer(mut self, installer: ModuleInstaller) -> Self {
        self.installer = Some(installer);
        self
    }

    #[must_use]
    pub fn with_pipeline(mut self, pipeline: ResolutionPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    #[must_use]
    pub fn with_bridge(mut self, bridge: StreamingBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Permit pools; a default pool is used when unset
    #[must_use]
    pub fn with_resources(mut self, resources: ResourceManager) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let missing = |component: &str| OpsError::MissingComponent {
            component: component.to_string(),
        };

        Ok(OpsCtx {
            config: self.config.ok_or_else(|| missing("config"))?,
            tx: self.tx.ok_or_else(|| missing("event_sender"))?,
            installer: self.installer.ok_or_else(|| missing("installer"))?,
            pipeline: self.pipeline.ok_or_else(|| missing("pipeline"))?,
            bridge: self.bridge.ok_or_else(|| missing("bridge"))?,
            resources: self.resources.unwrap_or_default(),
        })
    }
}
