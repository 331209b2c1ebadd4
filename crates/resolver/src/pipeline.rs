//! Resolution pipeline with a single-slot in-flight guard

use crate::strategy::{
    FallbackStrategy, LocalBundleStrategy, RemoteModuleStrategy, ResolverStrategy,
    StrategyOutcome,
};
use envmap_events::{AppEvent, EventEmitter, EventSender, ResolverEvent};
use envmap_install::ModuleInstaller;
use envmap_store::{AssetSource, ResourceStore};
use envmap_types::{Provenance, ResolutionResult, ResourceId};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use uuid::Uuid;

type PendingResolution = Shared<BoxFuture<'static, ResolutionResult>>;

struct InFlight {
    resolution_id: String,
    result: PendingResolution,
}

struct Inner {
    strategies: Vec<Arc<dyn ResolverStrategy>>,
    fallback: ResourceId,
    tx: Option<EventSender>,
    slot: Mutex<Option<InFlight>>,
}

/// Ordered fallback chain producing the asset list
///
/// Cloning is cheap and clones share the in-flight guard.
#[derive(Clone)]
pub struct ResolutionPipeline {
    inner: Arc<Inner>,
}

impl fmt::Debug for ResolutionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionPipeline")
            .field("strategies", &self.inner.strategies)
            .field("fallback", &self.inner.fallback)
            .finish_non_exhaustive()
    }
}

impl ResolutionPipeline {
    /// Pipeline over `strategies`, with `fallback` appended as the last step
    #[must_use]
    pub fn new(strategies: Vec<Arc<dyn ResolverStrategy>>, fallback: ResourceId) -> Self {
        Self::build(strategies, fallback, None)
    }

    #[must_use]
    pub fn builder(fallback: ResourceId) -> PipelineBuilder {
        PipelineBuilder::new(fallback)
    }

    fn build(
        mut strategies: Vec<Arc<dyn ResolverStrategy>>,
        fallback: ResourceId,
        tx: Option<EventSender>,
    ) -> Self {
        strategies.push(Arc::new(FallbackStrategy::new(fallback.clone())));
        Self {
            inner: Arc::new(Inner {
                strategies,
                fallback,
                tx,
                slot: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn fallback(&self) -> &ResourceId {
        &self.inner.fallback
    }

    /// Provenance of each step, in the order they are tried
    #[must_use]
    pub fn order(&self) -> Vec<Provenance> {
        self.inner.strategies.iter().map(|s| s.provenance()).collect()
    }

    /// Whether a resolution is currently pending
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Resolve the asset list
    ///
    /// If a resolution is already pending the caller shares its result
    /// instead of walking the chain again. The work runs on its own task and
    /// frees the slot when it ends, so a request abandoned by every caller
    /// still finishes and the next request walks the chain afresh.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn resolve(&self) -> ResolutionResult {
        let pending = {
            let mut slot = self.inner.lock();
            if let Some(in_flight) = slot.as_ref() {
                tracing::debug!(resolution_id = %in_flight.resolution_id, "joining pending resolution");
                self.inner.tx.emit(AppEvent::Resolver(ResolverEvent::Joined {
                    resolution_id: in_flight.resolution_id.clone(),
                }));
                in_flight.result.clone()
            } else {
                let resolution_id = Uuid::new_v4().to_string();
                let result = self.spawn_resolution(resolution_id.clone());
                *slot = Some(InFlight {
                    resolution_id,
                    result: result.clone(),
                });
                result
            }
        };
        pending.await
    }

    /// Resolve and hand the result to `callback` exactly once
    ///
    /// Must be called from within a Tokio runtime.
    pub fn resolve_with(
        &self,
        callback: impl FnOnce(ResolutionResult) + Send + 'static,
    ) -> JoinHandle<()> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            let result = pipeline.resolve().await;
            callback(result);
        })
    }

    fn spawn_resolution(&self, resolution_id: String) -> PendingResolution {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            // released on completion, panic or abort, whether or not anyone awaits
            let _release = SlotRelease {
                inner: Arc::clone(&inner),
                resolution_id: resolution_id.clone(),
            };
            inner.run(&resolution_id).await
        });

        let fallback = self.inner.fallback.clone();
        async move {
            task.await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "resolution task failed");
                ResolutionResult::fallback(fallback)
            })
        }
        .boxed()
        .shared()
    }
}

/// Clears the in-flight slot when the resolution task ends
struct SlotRelease {
    inner: Arc<Inner>,
    resolution_id: String,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        let mut slot = self.inner.lock();
        if slot
            .as_ref()
            .is_some_and(|f| f.resolution_id == self.resolution_id)
        {
            *slot = None;
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, resolution_id: &str) -> ResolutionResult {
        tracing::debug!(resolution_id, "resolution started");
        self.tx.emit(AppEvent::Resolver(ResolverEvent::Started {
            resolution_id: resolution_id.to_string(),
        }));

        let mut result = None;
        for strategy in &self.strategies {
            let provenance = strategy.provenance();
            match strategy.resolve().await {
                StrategyOutcome::Found(ids) if !ids.is_empty() => {
                    result = Some(ResolutionResult::new(ids, provenance));
                    break;
                }
                StrategyOutcome::Found(_) | StrategyOutcome::Empty => {
                    tracing::debug!(%provenance, "strategy produced nothing");
                    self.tx.emit(AppEvent::Resolver(ResolverEvent::StrategyEmpty {
                        strategy: provenance,
                    }));
                }
                StrategyOutcome::Skipped(reason) => {
                    tracing::info!(%provenance, reason = %reason, "strategy skipped");
                    self.tx.emit(AppEvent::Resolver(ResolverEvent::StrategySkipped {
                        strategy: provenance,
                        reason,
                    }));
                }
            }
        }

        let result = result.unwrap_or_else(|| ResolutionResult::fallback(self.fallback.clone()));
        if result.provenance() == Provenance::Fallback {
            tracing::warn!(uri = %self.fallback, "no assets found, using fallback");
            self.tx.emit(AppEvent::Resolver(ResolverEvent::FellBack {
                resolution_id: resolution_id.to_string(),
                uri: self.fallback.to_string(),
            }));
        }

        tracing::info!(
            resolution_id,
            provenance = %result.provenance(),
            count = result.len(),
            "assets resolved"
        );
        self.tx
            .emit_resolved(resolution_id, result.provenance(), result.len());
        result
    }
}

/// Assembles the standard remote, local, fallback chain
#[derive(Debug)]
pub struct PipelineBuilder {
    fallback: ResourceId,
    strategies: Vec<Arc<dyn ResolverStrategy>>,
    tx: Option<EventSender>,
}

impl PipelineBuilder {
    #[must_use]
    pub fn new(fallback: ResourceId) -> Self {
        Self {
            fallback,
            strategies: Vec::new(),
            tx: None,
        }
    }

    /// Append the remote module step
    #[must_use]
    pub fn remote(
        self,
        installer: ModuleInstaller,
        store: ResourceStore,
        source: Arc<dyn AssetSource>,
    ) -> Self {
        self.strategy(Arc::new(RemoteModuleStrategy::new(installer, store, source)))
    }

    /// Append the local bundle step
    #[must_use]
    pub fn local(self, store: ResourceStore, source: Arc<dyn AssetSource>) -> Self {
        self.strategy(Arc::new(LocalBundleStrategy::new(store, source)))
    }

    /// Append a custom step
    #[must_use]
    pub fn strategy(mut self, strategy: Arc<dyn ResolverStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    #[must_use]
    pub fn event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn build(self) -> ResolutionPipeline {
        ResolutionPipeline::build(self.strategies, self.fallback, self.tx)
    }
}
