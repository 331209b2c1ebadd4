//! Integration tests for ops crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use envmap_config::Config;
    use envmap_errors::{Error, OpsError, StreamError};
    use envmap_ops::*;
    use envmap_types::{ModuleState, Provenance};
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn write(path: &Path, contents: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn test_config(temp: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.bundle_dir = Some(temp.path().join("bundle"));
        config.paths.catalog_dir = Some(temp.path().join("catalog"));
        config.paths.modules_dir = Some(temp.path().join("modules"));
        config.frontend.ready_poll_interval_ms = 5;
        config.frontend.max_ready_attempts = 3;
        config.delivery.install_chunk_size = 16;
        config
    }

    fn seed_bundle(temp: &TempDir) {
        let dir = temp.path().join("bundle/hdri_4k");
        write(&dir.join("a.hdr"), b"bundle-a");
        write(&dir.join("b.HDR"), b"bundle-b");
        write(&dir.join("readme.txt"), b"not an asset");
    }

    fn seed_catalog(temp: &TempDir) {
        let dir = temp.path().join("catalog/hdr_assets/hdri_4k");
        write(&dir.join("x.hdr"), &[7u8; 100]);
        write(&dir.join("y.hdr"), &[9u8; 60]);
    }

    fn context(config: Config) -> OpsCtx {
        let (tx, _rx) = envmap_events::channel();
        OpsCtx::from_config(config, tx).unwrap()
    }

    /// Front-end that becomes ready after a number of polls
    struct FakeFrontend {
        ready_after: u32,
        accept: bool,
        polls: AtomicU32,
        delivered: Mutex<Vec<String>>,
    }

    impl FakeFrontend {
        fn new(ready_after: u32, accept: bool) -> Self {
            Self {
                ready_after,
                accept,
                polls: AtomicU32::new(0),
                delivered: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Frontend for FakeFrontend {
        async fn is_ready(&self) -> bool {
            self.polls.fetch_add(1, Ordering::SeqCst) + 1 >= self.ready_after
        }

        async fn set_asset_list(&self, payload: String) -> bool {
            self.delivered.lock().unwrap().push(payload);
            self.accept
        }
    }

    #[tokio::test]
    async fn test_resolve_installs_and_lists_remote_module() {
        let temp = tempfile::tempdir().unwrap();
        seed_bundle(&temp);
        seed_catalog(&temp);
        let ctx = context(test_config(&temp));

        let result = resolve_assets(&ctx).await;
        assert_eq!(result.provenance(), Provenance::RemoteModule);
        assert_eq!(
            asset_list_payload(&result).unwrap(),
            r#"["content://envmap.hdrprovider/hdri_4k/x.hdr","content://envmap.hdrprovider/hdri_4k/y.hdr"]"#
        );
        assert_eq!(status(&ctx).state, ModuleState::Installed);
        assert!(temp.path().join("modules/hdr_assets/hdri_4k/x.hdr").is_file());
    }

    #[tokio::test]
    async fn test_remote_disabled_uses_bundle() {
        let temp = tempfile::tempdir().unwrap();
        seed_bundle(&temp);
        seed_catalog(&temp);
        let mut config = test_config(&temp);
        config.delivery.remote_enabled = false;
        let ctx = context(config);

        let result = resolve_assets(&ctx).await;
        assert_eq!(result.provenance(), Provenance::LocalBundle);
        assert_eq!(
            result.uris(),
            vec!["bundle:///hdri_4k/a.hdr", "bundle:///hdri_4k/b.HDR"]
        );
        assert!(!status(&ctx).installed);
        assert!(!temp.path().join("modules/hdr_assets").exists());
    }

    #[tokio::test]
    async fn test_empty_world_falls_back() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(test_config(&temp));

        let result = resolve_assets(&ctx).await;
        assert_eq!(result.provenance(), Provenance::Fallback);
        assert_eq!(
            asset_list_payload(&result).unwrap(),
            r#"["bundle:///hdri_4k/ex.hdr"]"#
        );
    }

    #[tokio::test]
    async fn test_push_waits_for_readiness() {
        let temp = tempfile::tempdir().unwrap();
        seed_bundle(&temp);
        let ctx = context(test_config(&temp));
        let frontend = FakeFrontend::new(3, true);

        let result = push_when_ready(&ctx, &frontend).await.unwrap();
        assert_eq!(result.provenance(), Provenance::LocalBundle);
        assert_eq!(frontend.polls.load(Ordering::SeqCst), 3);

        let delivered = frontend.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        let parsed: Vec<String> = serde_json::from_str(&delivered[0]).unwrap();
        assert_eq!(parsed, result.uris());
    }

    #[tokio::test]
    async fn test_push_gives_up_after_max_attempts() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(test_config(&temp));
        let frontend = FakeFrontend::new(u32::MAX, true);

        let err = push_when_ready(&ctx, &frontend).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Ops(OpsError::FrontendNotReady { attempts: 3 })
        ));
        assert!(frontend.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_reports_rejection() {
        let temp = tempfile::tempdir().unwrap();
        seed_bundle(&temp);
        let ctx = context(test_config(&temp));
        let frontend = FakeFrontend::new(1, false);

        let err = push_when_ready(&ctx, &frontend).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Ops(OpsError::DeliveryRejected { count: 2 })
        ));
    }

    #[tokio::test]
    async fn test_copy_asset_streams_bytes() {
        let temp = tempfile::tempdir().unwrap();
        seed_bundle(&temp);
        let ctx = context(test_config(&temp));

        let mut out: Vec<u8> = Vec::new();
        let report = copy_asset(&ctx, "bundle:///hdri_4k/a.hdr", &mut out, None)
            .await
            .unwrap();
        assert_eq!(out, b"bundle-a");
        assert_eq!(report.bytes, 8);
        assert_eq!(report.content_length, Some(8));
        assert_eq!(report.uri, "bundle:///hdri_4k/a.hdr");
    }

    #[tokio::test]
    async fn test_open_rejects_bad_identifiers() {
        let temp = tempfile::tempdir().unwrap();
        seed_bundle(&temp);
        let ctx = context(test_config(&temp));

        for uri in [
            "not a uri",
            "bundle:///hdri_4k/missing.hdr",
            "bundle:///other_dir/a.hdr",
        ] {
            let err = open_asset(&ctx, uri).await.unwrap_err();
            assert!(
                matches!(err, Error::Stream(StreamError::NotFound { .. })),
                "{uri}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_install_module_reports_progress() {
        let temp = tempfile::tempdir().unwrap();
        seed_catalog(&temp);
        let ctx = context(test_config(&temp));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let report = install_module(&ctx, move |p| sink.lock().unwrap().push(p))
            .await
            .unwrap();

        assert_eq!(report.module, "hdr_assets");
        assert!(!report.already_installed);
        assert_eq!(report.state, ModuleState::Installed);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));

        let again = install_module(&ctx, |_| {}).await.unwrap();
        assert!(again.already_installed);
    }

    #[tokio::test]
    async fn test_install_missing_module_fails() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(test_config(&temp));

        let err = install_module(&ctx, |_| {}).await.unwrap_err();
        assert!(matches!(err, Error::Install(_)));
        assert!(matches!(status(&ctx).state, ModuleState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_shutdown_stops_streaming() {
        let temp = tempfile::tempdir().unwrap();
        seed_bundle(&temp);
        let ctx = context(test_config(&temp));

        shutdown(&ctx).await;
        assert!(ctx.installer.is_shut_down());
        assert!(ctx.resources.is_closed());
        let err = open_asset(&ctx, "bundle:///hdri_4k/a.hdr")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_builder_reports_missing_component() {
        let (tx, _rx) = envmap_events::channel();
        let err = OpsContextBuilder::new()
            .with_config(Config::default())
            .with_event_sender(tx)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ops(OpsError::MissingComponent { component }) if component == "installer"
        ));
    }

    #[tokio::test]
    async fn test_operation_result_json() {
        let temp = tempfile::tempdir().unwrap();
        seed_bundle(&temp);
        let ctx = context(test_config(&temp));

        let listing = AssetListing::from(&resolve_assets(&ctx).await);
        let json = OperationResult::AssetList(listing).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "AssetList");
        assert_eq!(value["data"]["provenance"], "local_bundle");
        assert_eq!(value["data"]["assets"].as_array().unwrap().len(), 2);
    }
}
