//! Integration tests for config

#[cfg(test)]
mod tests {
    use envmap_config::*;
    use envmap_types::{ColorChoice, OutputFormat};
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [
            "ENVMAP_OUTPUT",
            "ENVMAP_COLOR",
            "ENVMAP_REMOTE",
            "ENVMAP_MAX_STREAMS",
            "ENVMAP_BUNDLE_DIR",
        ] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "plain"
color = "never"

[assets]
module_name = "studio_maps"
fallback_asset = "grey.hdr"

[delivery]
remote_enabled = false

[paths]
bundle_dir = "/srv/envmap/bundle"

[streaming]
max_concurrent_streams = 8
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.assets.module_name, "studio_maps");
        assert_eq!(config.assets.fallback_asset, "grey.hdr");
        // untouched keys keep their defaults
        assert_eq!(config.assets.asset_dir, "hdri_4k");
        assert_eq!(config.assets.suffix, ".hdr");
        assert!(!config.delivery.remote_enabled);
        assert_eq!(
            config.bundle_path(),
            std::path::PathBuf::from("/srv/envmap/bundle")
        );
        assert_eq!(config.streaming.max_concurrent_streams, 8);
        assert_eq!(config.streaming.buffer_size, 64 * 1024);
        assert_eq!(config.frontend.ready_poll_interval_ms, 500);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_from_file(std::path::Path::new("/definitely/not/here.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            envmap_errors::Error::Config(envmap_errors::ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_file_values_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[assets]\nasset_dir = \"a/b\"").unwrap();
        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("ENVMAP_OUTPUT", "json");
        std::env::set_var("ENVMAP_COLOR", "always");
        std::env::set_var("ENVMAP_REMOTE", "0");
        std::env::set_var("ENVMAP_MAX_STREAMS", "2");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.general.color, ColorChoice::Always);
        assert!(!config.delivery.remote_enabled);
        assert_eq!(config.streaming.max_concurrent_streams, 2);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("ENVMAP_REMOTE", "maybe");

        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.assets.module_name, constants::MODULE_NAME);
        assert_eq!(config.assets.authority, constants::AUTHORITY);
        assert!(config.delivery.remote_enabled);
        assert_eq!(
            config.ready_poll_interval(),
            std::time::Duration::from_millis(500)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stream_concurrency() {
        assert_eq!(calculate_stream_concurrency(3), 3);
        let auto = calculate_stream_concurrency(0);
        assert!((2..=16).contains(&auto));
    }
}
