//! Integration tests for envmap CLI

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn write_config(temp: &TempDir) -> std::path::PathBuf {
    let root = temp.path();
    let bundle = root.join("bundle/hdri_4k");
    std::fs::create_dir_all(&bundle).unwrap();
    std::fs::write(bundle.join("studio.hdr"), b"studio-bytes").unwrap();
    std::fs::write(bundle.join("notes.txt"), b"ignored").unwrap();

    let config = root.join("config.toml");
    std::fs::write(
        &config,
        format!(
            "[paths]\nbundle_dir = \"{}\"\ncatalog_dir = \"{}\"\nmodules_dir = \"{}\"\n",
            root.join("bundle").display(),
            root.join("catalog").display(),
            root.join("modules").display(),
        ),
    )
    .unwrap();
    config
}

fn envmap(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_envmap"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute envmap")
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_envmap"))
        .arg("--version")
        .output()
        .expect("Failed to execute envmap");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("envmap"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_envmap"))
        .arg("--help")
        .output()
        .expect("Failed to execute envmap");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Resolve and stream HDR environment maps"));
    for command in ["resolve", "push", "open", "install", "status"] {
        assert!(stdout.contains(command), "missing {command}");
    }
}

#[test]
fn test_resolve_json_offline() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(&temp);

    let output = envmap(&config, &["--json", "--offline", "resolve"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["type"], "AssetList");
    assert_eq!(value["data"]["provenance"], "local_bundle");
    assert_eq!(
        value["data"]["assets"],
        serde_json::json!(["bundle:///hdri_4k/studio.hdr"])
    );
}

#[test]
fn test_push_writes_asset_list() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(&temp);
    let target = temp.path().join("list.json");

    let output = envmap(
        &config,
        &["--json", "--offline", "push", target.to_str().unwrap()],
    );
    assert!(output.status.success());

    let delivered: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(delivered, vec!["bundle:///hdri_4k/studio.hdr"]);
}

#[test]
fn test_open_copies_asset() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(&temp);
    let out = temp.path().join("copy.hdr");

    let output = envmap(
        &config,
        &[
            "--json",
            "open",
            "bundle:///hdri_4k/studio.hdr",
            "-o",
            out.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert_eq!(std::fs::read(&out).unwrap(), b"studio-bytes");
}

#[test]
fn test_open_unknown_asset_fails() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(&temp);
    let out = temp.path().join("copy.hdr");

    let output = envmap(
        &config,
        &["open", "bundle:///hdri_4k/missing.hdr", "-o", out.to_str().unwrap()],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "{stderr}");
}
