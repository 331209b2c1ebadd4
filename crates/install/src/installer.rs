//! Module installer state machine

use crate::progress::ProgressTracker;
use crate::provider::{ModuleProvider, SessionStatus};
use envmap_errors::InstallError;
use envmap_events::{AppEvent, EventEmitter, EventSender, InstallEvent};
use envmap_resources::ResourceManager;
use envmap_types::ModuleState;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Called with each new download percentage
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Called once with the terminal outcome of the install
pub type DoneCallback = Box<dyn FnOnce(Result<(), InstallError>) + Send>;

struct Waiter {
    on_progress: ProgressCallback,
    on_done: DoneCallback,
}

#[derive(Default)]
struct Shared {
    state: ModuleState,
    waiters: Vec<Waiter>,
    driver: Option<JoinHandle<()>>,
    shut_down: bool,
}

struct Inner {
    module: String,
    provider: Arc<dyn ModuleProvider>,
    resources: Option<ResourceManager>,
    tx: Option<EventSender>,
    shared: Mutex<Shared>,
}

/// Drives installs of one module through one provider
///
/// Cloning is cheap; clones share the same state machine, so at most one
/// provider install is in flight per installer.
#[derive(Clone)]
pub struct ModuleInstaller {
    inner: Arc<Inner>,
}

impl fmt::Debug for ModuleInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInstaller")
            .field("module", &self.inner.module)
            .field("provider", &self.inner.provider)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ModuleInstaller {
    #[must_use]
    pub fn new(module: impl Into<String>, provider: Arc<dyn ModuleProvider>) -> Self {
        Self::build(module.into(), provider, None, None)
    }

    /// Installer that reports lifecycle events on `tx`
    #[must_use]
    pub fn with_event_sender(self, tx: EventSender) -> Self {
        self.rebuild(|inner| (inner.resources.clone(), Some(tx)))
    }

    /// Installer whose provider sessions hold an install permit from `resources`
    #[must_use]
    pub fn with_resources(self, resources: ResourceManager) -> Self {
        self.rebuild(|inner| (Some(resources), inner.tx.clone()))
    }

    fn build(
        module: String,
        provider: Arc<dyn ModuleProvider>,
        resources: Option<ResourceManager>,
        tx: Option<EventSender>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                module,
                provider,
                resources,
                tx,
                shared: Mutex::new(Shared::default()),
            }),
        }
    }

    fn rebuild(
        self,
        f: impl FnOnce(&Inner) -> (Option<ResourceManager>, Option<EventSender>),
    ) -> Self {
        let (resources, tx) = f(&self.inner);
        Self::build(
            self.inner.module.clone(),
            Arc::clone(&self.inner.provider),
            resources,
            tx,
        )
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.inner.module
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn ModuleProvider> {
        &self.inner.provider
    }

    /// Capability gate of the underlying provider
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.inner.provider.is_available()
    }

    /// Ask the provider whether the module is installed
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.inner.provider.is_module_installed(&self.inner.module)
    }

    /// Current state snapshot
    #[must_use]
    pub fn state(&self) -> ModuleState {
        self.inner.lock().state.clone()
    }

    /// Install the module, or attach to the install already in flight
    ///
    /// `on_progress` receives strictly increasing percentages while the
    /// provider reports a known size. `on_done` runs exactly once with the
    /// terminal outcome, unless the installer is shut down first, in which
    /// case neither callback runs again.
    ///
    /// Must be called from within a Tokio runtime; otherwise `on_done`
    /// reports `InstallError::StartFailed` immediately.
    pub fn request_install(
        &self,
        on_progress: impl Fn(u8) + Send + Sync + 'static,
        on_done: impl FnOnce(Result<(), InstallError>) + Send + 'static,
    ) {
        let waiter = Waiter {
            on_progress: Arc::new(on_progress),
            on_done: Box::new(on_done),
        };

        let mut shared = self.inner.lock();
        if shared.shut_down {
            drop(shared);
            (waiter.on_done)(Err(InstallError::ShutDown));
            return;
        }

        if shared.state.is_in_flight() {
            shared.waiters.push(waiter);
            let waiters = shared.waiters.len();
            drop(shared);
            tracing::debug!(module = %self.inner.module, waiters, "attached to in-flight install");
            self.inner
                .tx
                .emit(AppEvent::Install(InstallEvent::Attached {
                    module: self.inner.module.clone(),
                    waiters,
                }));
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            drop(shared);
            (waiter.on_done)(Err(InstallError::StartFailed {
                message: "no async runtime available".to_string(),
            }));
            return;
        };

        shared.state = ModuleState::Checking;
        shared.waiters.push(waiter);
        let inner = Arc::clone(&self.inner);
        // spawned under the lock so the driver cannot finish before its handle is stored
        shared.driver = Some(handle.spawn(async move {
            let outcome = inner.run().await;
            inner.finish(outcome);
        }));
    }

    /// Install the module and wait for the outcome
    ///
    /// # Errors
    ///
    /// Returns the provider failure, cancellation, or `ShutDown` if the
    /// installer was torn down while waiting.
    pub async fn install(
        &self,
        on_progress: impl Fn(u8) + Send + Sync + 'static,
    ) -> Result<(), InstallError> {
        let (tx, rx) = oneshot::channel();
        self.request_install(on_progress, move |outcome| {
            let _ = tx.send(outcome);
        });
        rx.await.unwrap_or(Err(InstallError::ShutDown))
    }

    /// Detach from the provider
    ///
    /// Aborts the in-flight install task and drops every attached caller
    /// without invoking its callbacks. Later requests fail with `ShutDown`.
    pub fn shutdown(&self) {
        let mut shared = self.inner.lock();
        shared.shut_down = true;
        let driver = shared.driver.take();
        let dropped = std::mem::take(&mut shared.waiters);
        drop(shared);

        if let Some(driver) = driver {
            driver.abort();
        }
        if !dropped.is_empty() {
            tracing::debug!(module = %self.inner.module, dropped = dropped.len(), "detached install waiters");
            self.inner
                .tx
                .emit(AppEvent::Install(InstallEvent::Detached {
                    module: self.inner.module.clone(),
                    dropped_waiters: dropped.len(),
                }));
        }
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shut_down
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self) -> Result<(), InstallError> {
        if self.provider.is_module_installed(&self.module) {
            tracing::debug!(module = %self.module, "module already installed");
            return Ok(());
        }

        let _permit = match &self.resources {
            Some(resources) => Some(
                resources
                    .acquire_install_permit()
                    .await
                    .map_err(|_| InstallError::ShutDown)?,
            ),
            None => None,
        };

        self.tx.emit(AppEvent::Install(InstallEvent::Requested {
            module: self.module.clone(),
        }));
        let mut events = self.provider.start_install(&self.module).await?;

        let mut tracker = ProgressTracker::new();
        while let Some(session) = events.recv().await {
            tracing::trace!(module = %self.module, status = ?session.status, "provider status");
            match session.status {
                SessionStatus::Downloading => {
                    if let Some(pct) = tracker.observe(session.bytes_downloaded, session.total_bytes)
                    {
                        self.report_progress(pct, session.bytes_downloaded, session.total_bytes);
                    }
                }
                SessionStatus::Installed => {
                    if let Some(pct) = tracker.complete() {
                        self.report_progress(pct, session.total_bytes, session.total_bytes);
                    }
                    return Ok(());
                }
                SessionStatus::Failed => {
                    return Err(InstallError::ProviderFailed {
                        code: session.error_code,
                    })
                }
                SessionStatus::Canceled => return Err(InstallError::Canceled),
                SessionStatus::Pending
                | SessionStatus::Downloaded
                | SessionStatus::Installing
                | SessionStatus::Canceling => {}
            }
        }

        Err(InstallError::Interrupted {
            message: "status stream closed before a terminal status".to_string(),
        })
    }

    fn report_progress(&self, pct: u8, bytes: u64, total: u64) {
        let callbacks: Vec<ProgressCallback> = {
            let mut shared = self.lock();
            shared.state = ModuleState::Downloading { progress: pct };
            shared
                .waiters
                .iter()
                .map(|w| Arc::clone(&w.on_progress))
                .collect()
        };
        self.tx
            .emit_install_progress(&self.module, pct, bytes, total);
        for callback in callbacks {
            callback(pct);
        }
    }

    fn finish(&self, outcome: Result<(), InstallError>) {
        let waiters = {
            let mut shared = self.lock();
            shared.state = match &outcome {
                Ok(()) => ModuleState::Installed,
                Err(InstallError::Canceled) => ModuleState::Canceled,
                Err(e) => ModuleState::Failed {
                    reason: e.to_string(),
                },
            };
            shared.driver = None;
            std::mem::take(&mut shared.waiters)
        };

        match &outcome {
            Ok(()) => {
                tracing::info!(module = %self.module, "module installed");
                self.tx.emit(AppEvent::Install(InstallEvent::Completed {
                    module: self.module.clone(),
                }));
            }
            Err(InstallError::Canceled) => {
                tracing::warn!(module = %self.module, "module install canceled");
                self.tx.emit(AppEvent::Install(InstallEvent::Canceled {
                    module: self.module.clone(),
                }));
            }
            Err(e) => {
                tracing::warn!(module = %self.module, error = %e, "module install failed");
                self.tx.emit_install_failed(&self.module, e);
            }
        }

        for waiter in waiters {
            (waiter.on_done)(outcome.clone());
        }
    }
}
