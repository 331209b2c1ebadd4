//! Integration tests for install crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use envmap_errors::InstallError;
    use envmap_events::{AppEvent, InstallEvent};
    use envmap_install::*;
    use envmap_store::{AssetReader, ResourceStore};
    use envmap_types::{ModuleState, ResourceId};
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::{mpsc, Notify};

    /// Provider that replays a fixed status script for every session
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        installed: Arc<AtomicBool>,
        starts: AtomicUsize,
        script: Vec<SessionState>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<SessionState>) -> Self {
            Self {
                script,
                ..Self::default()
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn starts(&self) -> usize {
            self.starts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModuleProvider for ScriptedProvider {
        fn is_module_installed(&self, _module: &str) -> bool {
            self.installed.load(Ordering::SeqCst)
        }

        async fn start_install(&self, _module: &str) -> Result<SessionEvents, InstallError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = mpsc::unbounded_channel();
            let script = self.script.clone();
            let gate = self.gate.clone();
            let installed = Arc::clone(&self.installed);
            tokio::spawn(async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                for state in script {
                    if state.status == SessionStatus::Installed {
                        installed.store(true, Ordering::SeqCst);
                    }
                    let _ = tx.send(state);
                }
            });
            Ok(rx)
        }

        fn list_files(&self, _module: &str, _dir: &str) -> io::Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn open_file(&self, _module: &str, _dir: &str, _name: &str) -> io::Result<AssetReader> {
            Err(io::ErrorKind::NotFound.into())
        }
    }

    fn thousand_byte_download() -> Vec<SessionState> {
        let mut script = vec![SessionState::new(SessionStatus::Pending)];
        script.extend((0..=10).map(|step| SessionState::downloading(step * 100, 1000)));
        script.push(SessionState::new(SessionStatus::Downloaded));
        script.push(SessionState::new(SessionStatus::Installing));
        script.push(SessionState::new(SessionStatus::Installed));
        script
    }

    fn recorder() -> (Arc<Mutex<Vec<u8>>>, impl Fn(u8) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |pct| sink.lock().unwrap().push(pct))
    }

    #[tokio::test]
    async fn test_progress_reaches_100_once_before_installed() {
        let provider = Arc::new(ScriptedProvider::new(thousand_byte_download()));
        let installer = ModuleInstaller::new("hdr_assets", provider.clone());
        let (seen, on_progress) = recorder();

        let state_at_100 = Arc::new(Mutex::new(None));
        let probe = {
            let installer = installer.clone();
            let state_at_100 = Arc::clone(&state_at_100);
            move |pct: u8| {
                on_progress(pct);
                if pct == 100 {
                    *state_at_100.lock().unwrap() = Some(installer.state());
                }
            }
        };

        installer.install(probe).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
        assert_eq!(
            *state_at_100.lock().unwrap(),
            Some(ModuleState::Downloading { progress: 100 })
        );
        assert_eq!(installer.state(), ModuleState::Installed);
        assert!(installer.is_installed());
        assert_eq!(provider.starts(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_install() {
        let gate = Arc::new(Notify::new());
        let provider =
            Arc::new(ScriptedProvider::new(thousand_byte_download()).gated(Arc::clone(&gate)));
        let installer = ModuleInstaller::new("hdr_assets", provider.clone());

        let (a, b, c, ()) = tokio::join!(
            installer.install(|_| {}),
            installer.install(|_| {}),
            installer.install(|_| {}),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                gate.notify_one();
            }
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(provider.starts(), 1);
    }

    #[tokio::test]
    async fn test_attached_callers_get_the_same_failure() {
        let gate = Arc::new(Notify::new());
        let script = vec![
            SessionState::new(SessionStatus::Pending),
            SessionState::downloading(10, 100),
            SessionState::failed(error_codes::NETWORK_ERROR),
        ];
        let provider = Arc::new(ScriptedProvider::new(script).gated(Arc::clone(&gate)));
        let installer = ModuleInstaller::new("hdr_assets", provider.clone());

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..3 {
            let outcomes = Arc::clone(&outcomes);
            installer.request_install(|_| {}, move |r| outcomes.lock().unwrap().push(r));
        }
        assert_eq!(installer.state(), ModuleState::Checking);
        gate.notify_one();

        for _ in 0..100 {
            if outcomes.lock().unwrap().len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 3);
        for outcome in outcomes.iter() {
            assert_eq!(
                outcome,
                &Err(InstallError::ProviderFailed {
                    code: error_codes::NETWORK_ERROR
                })
            );
        }
        assert!(matches!(installer.state(), ModuleState::Failed { .. }));
        assert_eq!(provider.starts(), 1);
    }

    #[tokio::test]
    async fn test_canceled_session() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            SessionState::new(SessionStatus::Pending),
            SessionState::new(SessionStatus::Canceling),
            SessionState::new(SessionStatus::Canceled),
        ]));
        let installer = ModuleInstaller::new("hdr_assets", provider);

        let err = installer.install(|_| {}).await.unwrap_err();
        assert_eq!(err, InstallError::Canceled);
        assert_eq!(installer.state(), ModuleState::Canceled);
    }

    #[tokio::test]
    async fn test_stream_without_terminal_status_is_interrupted() {
        let provider = Arc::new(ScriptedProvider::new(vec![SessionState::downloading(
            1, 2,
        )]));
        let installer = ModuleInstaller::new("hdr_assets", provider);

        let err = installer.install(|_| {}).await.unwrap_err();
        assert!(matches!(err, InstallError::Interrupted { .. }));
    }

    #[tokio::test]
    async fn test_already_installed_skips_provider_session() {
        let provider = ScriptedProvider::new(Vec::new());
        provider.installed.store(true, Ordering::SeqCst);
        let provider = Arc::new(provider);
        let installer = ModuleInstaller::new("hdr_assets", provider.clone());

        installer.install(|_| {}).await.unwrap();
        assert_eq!(provider.starts(), 0);
        assert_eq!(installer.state(), ModuleState::Installed);
    }

    #[tokio::test]
    async fn test_shutdown_detaches_waiters() {
        let gate = Arc::new(Notify::new());
        let provider =
            Arc::new(ScriptedProvider::new(thousand_byte_download()).gated(Arc::clone(&gate)));
        let (tx, mut rx) = envmap_events::channel();
        let installer = ModuleInstaller::new("hdr_assets", provider).with_event_sender(tx);

        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let pending = {
            let installer = installer.clone();
            tokio::spawn(async move {
                installer
                    .install(move |_| flag.store(true, Ordering::SeqCst))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        installer.shutdown();
        gate.notify_one();

        assert_eq!(pending.await.unwrap(), Err(InstallError::ShutDown));
        assert!(!called.load(Ordering::SeqCst));
        assert!(installer.is_shut_down());
        assert_eq!(
            installer.install(|_| {}).await,
            Err(InstallError::ShutDown)
        );

        let mut detached = false;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Install(InstallEvent::Detached {
                dropped_waiters, ..
            }) = message.event
            {
                assert_eq!(dropped_waiters, 1);
                detached = true;
            }
        }
        assert!(detached);
    }

    #[tokio::test]
    async fn test_events_follow_install_lifecycle() {
        let provider = Arc::new(ScriptedProvider::new(thousand_byte_download()));
        let (tx, mut rx) = envmap_events::channel();
        let installer = ModuleInstaller::new("hdr_assets", provider).with_event_sender(tx);

        installer.install(|_| {}).await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Install(event) = message.event {
                kinds.push(match event {
                    InstallEvent::Requested { .. } => "requested",
                    InstallEvent::Progress { .. } => "progress",
                    InstallEvent::Completed { .. } => "completed",
                    _ => "other",
                });
            }
        }
        assert_eq!(kinds.first(), Some(&"requested"));
        assert_eq!(kinds.last(), Some(&"completed"));
        assert_eq!(kinds.iter().filter(|k| **k == "progress").count(), 11);
    }

    #[tokio::test]
    async fn test_fs_provider_installs_and_lists() {
        let temp = tempfile::tempdir().unwrap();
        let catalog = temp.path().join("catalog");
        let modules = temp.path().join("modules");
        std::fs::create_dir_all(catalog.join("hdr_assets/hdri_4k")).unwrap();
        std::fs::write(catalog.join("hdr_assets/hdri_4k/dusk.hdr"), vec![7u8; 1000]).unwrap();
        std::fs::write(catalog.join("hdr_assets/hdri_4k/readme.txt"), b"x").unwrap();

        let provider: Arc<dyn ModuleProvider> =
            Arc::new(FsModuleProvider::new(&catalog, &modules).with_chunk_size(100));
        let installer = ModuleInstaller::new("hdr_assets", Arc::clone(&provider));
        assert!(!installer.is_installed());

        let (seen, on_progress) = recorder();
        installer.install(on_progress).await.unwrap();
        assert!(installer.is_installed());

        let seen = seen.lock().unwrap().clone();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.iter().filter(|p| **p == 100).count(), 1);

        // no staging leftovers next to the installed module
        let leftovers: Vec<_> = std::fs::read_dir(&modules)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("hdr_assets")]);

        let assets = ModuleAssets::new(provider, "hdr_assets", "envmap.hdrprovider");
        let ids = ResourceStore::new("hdri_4k", ".hdr").list_assets(Arc::new(assets)).await;
        assert_eq!(
            ids,
            vec![ResourceId::remote("envmap.hdrprovider", "hdri_4k", "dusk.hdr").unwrap()]
        );
    }

    #[tokio::test]
    async fn test_fs_provider_missing_module_fails_with_code() {
        let temp = tempfile::tempdir().unwrap();
        let provider = Arc::new(FsModuleProvider::new(
            temp.path().join("catalog"),
            temp.path().join("modules"),
        ));
        let installer = ModuleInstaller::new("hdr_assets", provider);

        let err = installer.install(|_| {}).await.unwrap_err();
        assert_eq!(
            err,
            InstallError::ProviderFailed {
                code: error_codes::MODULE_UNAVAILABLE
            }
        );
    }

    #[tokio::test]
    async fn test_fs_provider_gate_refuses_start() {
        let temp = tempfile::tempdir().unwrap();
        let provider = FsModuleProvider::new(temp.path(), temp.path()).with_availability(false);
        assert!(!provider.is_available());
        let err = provider.start_install("hdr_assets").await.unwrap_err();
        assert!(matches!(err, InstallError::StartFailed { .. }));
    }
}
