//! Integration tests for store crate

#[cfg(test)]
mod tests {
    use envmap_store::*;
    use envmap_types::{Namespace, ResourceId};
    use std::io::Read;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn remote_ns() -> Namespace {
        Namespace::RemoteModule {
            authority: "envmap.hdrprovider".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bundle_listing_filters_suffix() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("hdri_4k");
        std::fs::create_dir_all(dir.join("nested.hdr")).unwrap();
        std::fs::write(dir.join("b_sunset.HDR"), b"b").unwrap();
        std::fs::write(dir.join("a_studio.hdr"), b"a").unwrap();
        std::fs::write(dir.join("preview.png"), b"p").unwrap();

        let store = ResourceStore::new("hdri_4k", ".hdr");
        let source: Arc<dyn AssetSource> = Arc::new(BundleSource::new(temp.path()));
        let ids = store.list_assets(source).await;

        let uris: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(
            uris,
            vec![
                "bundle:///hdri_4k/a_studio.hdr".to_string(),
                "bundle:///hdri_4k/b_sunset.HDR".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let temp = tempdir().unwrap();
        let store = ResourceStore::new("hdri_4k", ".hdr");
        let ids = store
            .list_assets(Arc::new(BundleSource::new(temp.path().join("absent"))))
            .await;
        assert!(ids.is_empty());
    }

    #[test]
    fn test_unavailable_source_lists_nothing() {
        let source = MemorySource::new(remote_ns())
            .with("hdri_4k", "a.hdr", b"a".to_vec())
            .unavailable();
        let store = ResourceStore::new("hdri_4k", ".hdr");
        assert!(store.list_assets_blocking(&source).is_empty());
    }

    #[test]
    fn test_memory_source_keeps_insertion_order() {
        let source = MemorySource::new(remote_ns())
            .with("hdri_4k", "z.hdr", b"z".to_vec())
            .with("hdri_4k", "a.hdr", b"a".to_vec())
            .with("hdri_4k", "notes.txt", b"n".to_vec());
        let store = ResourceStore::new("hdri_4k", ".hdr");

        let ids = store.list_assets_blocking(&source);
        assert_eq!(
            ids,
            vec![
                ResourceId::remote("envmap.hdrprovider", "hdri_4k", "z.hdr").unwrap(),
                ResourceId::remote("envmap.hdrprovider", "hdri_4k", "a.hdr").unwrap(),
            ]
        );
    }

    #[test]
    fn test_bundle_open_reports_length() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("hdri_4k")).unwrap();
        std::fs::write(temp.path().join("hdri_4k/ex.hdr"), b"#?RADIANCE").unwrap();

        let source = BundleSource::new(temp.path());
        let mut reader = source.open("hdri_4k", "ex.hdr").unwrap();
        assert_eq!(reader.len(), Some(10));
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"#?RADIANCE");

        let err = source.open("hdri_4k", "missing.hdr").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        // directories are not assets
        let err = source.open(".", "hdri_4k").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_registry_lookup_by_namespace() {
        let registry = SourceRegistry::new()
            .with(Arc::new(MemorySource::new(remote_ns())))
            .with(Arc::new(BundleSource::new("/nonexistent")));

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get(&Namespace::LocalBundle).unwrap().namespace(),
            Namespace::LocalBundle
        );
        assert!(registry
            .get(&Namespace::RemoteModule {
                authority: "other".to_string()
            })
            .is_none());
    }
}
