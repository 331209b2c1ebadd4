//! Filesystem-backed delivery provider
//!
//! Modules are published as directories under a catalog root. Installing a
//! module copies its tree into a staging directory next to the modules root,
//! then renames the staging directory into place so a module is either
//! fully installed or absent.

use crate::provider::{error_codes, ModuleProvider, SessionEvents, SessionState, SessionStatus};
use async_trait::async_trait;
use envmap_errors::InstallError;
use envmap_store::{AssetReader, AssetSource, BundleSource};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, UnboundedSender};
use uuid::Uuid;

const STAGING_PREFIX: &str = ".staging-";

#[derive(Debug, Clone)]
pub struct FsModuleProvider {
    catalog_dir: PathBuf,
    modules_dir: PathBuf,
    chunk_size: usize,
    available: bool,
}

impl FsModuleProvider {
    #[must_use]
    pub fn new(catalog_dir: impl Into<PathBuf>, modules_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog_dir: catalog_dir.into(),
            modules_dir: modules_dir.into(),
            chunk_size: 256 * 1024,
            available: true,
        }
    }

    /// Bytes copied between two `Downloading` events
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Turn the capability gate on or off
    #[must_use]
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    #[must_use]
    pub fn module_path(&self, module: &str) -> PathBuf {
        self.modules_dir.join(module)
    }

    fn installed_module(&self, module: &str) -> BundleSource {
        BundleSource::new(self.module_path(module))
    }
}

#[async_trait]
impl ModuleProvider for FsModuleProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn is_module_installed(&self, module: &str) -> bool {
        is_plain_name(module) && self.module_path(module).is_dir()
    }

    async fn start_install(&self, module: &str) -> Result<SessionEvents, InstallError> {
        if !self.available {
            return Err(InstallError::StartFailed {
                message: "module delivery is disabled".to_string(),
            });
        }
        if !is_plain_name(module) {
            return Err(InstallError::StartFailed {
                message: format!("invalid module name {module:?}"),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let job = CopyJob {
            source: self.catalog_dir.join(module),
            modules_dir: self.modules_dir.clone(),
            target: self.module_path(module),
            chunk_size: self.chunk_size,
        };
        let module = module.to_string();

        tokio::task::spawn_blocking(move || {
            let _ = tx.send(SessionState::new(SessionStatus::Pending));
            match job.run(&tx) {
                Ok(()) => {
                    let _ = tx.send(SessionState::new(SessionStatus::Installed));
                }
                Err(code) => {
                    tracing::debug!(module = %module, code, "module copy failed");
                    let _ = tx.send(SessionState::failed(code));
                }
            }
        });

        Ok(rx)
    }

    fn list_files(&self, module: &str, dir: &str) -> io::Result<Vec<String>> {
        if !self.is_module_installed(module) {
            return Err(not_installed(module));
        }
        self.installed_module(module).list_dir(dir)
    }

    fn open_file(&self, module: &str, dir: &str, name: &str) -> io::Result<AssetReader> {
        if !self.is_module_installed(module) {
            return Err(not_installed(module));
        }
        self.installed_module(module).open(dir, name)
    }
}

fn not_installed(module: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("module {module} is not installed"),
    )
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with(STAGING_PREFIX)
        && !name.contains(['/', '\\', '\0'])
}

struct CopyJob {
    source: PathBuf,
    modules_dir: PathBuf,
    target: PathBuf,
    chunk_size: usize,
}

impl CopyJob {
    /// Copy the module tree; returns a provider error code on failure
    fn run(&self, tx: &UnboundedSender<SessionState>) -> Result<(), i32> {
        if !self.source.is_dir() {
            return Err(error_codes::MODULE_UNAVAILABLE);
        }
        if self.target.is_dir() {
            return Ok(());
        }

        let files = collect_files(&self.source).map_err(|e| io_code(&e))?;
        let total: u64 = files.iter().map(|(_, len)| *len).sum();

        fs::create_dir_all(&self.modules_dir).map_err(|e| io_code(&e))?;
        let staging = self
            .modules_dir
            .join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()));

        let result = self.copy_into(&staging, &files, total, tx);
        if result.is_err() {
            let _ = fs::remove_dir_all(&staging);
        }
        result
    }

    fn copy_into(
        &self,
        staging: &Path,
        files: &[(PathBuf, u64)],
        total: u64,
        tx: &UnboundedSender<SessionState>,
    ) -> Result<(), i32> {
        fs::create_dir_all(staging).map_err(|e| io_code(&e))?;
        let _ = tx.send(SessionState::downloading(0, total));

        let mut copied = 0u64;
        let mut buf = vec![0u8; self.chunk_size];
        for (relative, _) in files {
            let dest = staging.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| io_code(&e))?;
            }
            let mut input = fs::File::open(self.source.join(relative)).map_err(|e| io_code(&e))?;
            let mut output = fs::File::create(&dest).map_err(|e| io_code(&e))?;
            loop {
                let n = input.read(&mut buf).map_err(|e| io_code(&e))?;
                if n == 0 {
                    break;
                }
                output.write_all(&buf[..n]).map_err(|e| io_code(&e))?;
                copied += n as u64;
                if tx
                    .send(SessionState::downloading(copied, total))
                    .is_err()
                {
                    // nobody is listening any more
                    return Err(error_codes::INTERNAL_ERROR);
                }
            }
            output.sync_all().map_err(|e| io_code(&e))?;
        }

        let _ = tx.send(SessionState {
            bytes_downloaded: copied,
            total_bytes: total,
            ..SessionState::new(SessionStatus::Downloaded)
        });
        let _ = tx.send(SessionState::new(SessionStatus::Installing));

        match fs::rename(staging, &self.target) {
            Ok(()) => Ok(()),
            // another session won the race
            Err(_) if self.target.is_dir() => {
                let _ = fs::remove_dir_all(staging);
                Ok(())
            }
            Err(e) => Err(io_code(&e)),
        }
    }
}

/// Regular files under `root` with their sizes, as sorted relative paths
fn collect_files(root: &Path) -> io::Result<Vec<(PathBuf, u64)>> {
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];
    while let Some(relative) = pending.pop() {
        for entry in fs::read_dir(root.join(&relative))? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = relative.join(entry.file_name());
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push((path, entry.metadata()?.len()));
            }
        }
    }
    files.sort();
    Ok(files)
}

fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => error_codes::ACCESS_DENIED,
        io::ErrorKind::StorageFull => error_codes::INSUFFICIENT_STORAGE,
        io::ErrorKind::NotFound => error_codes::MODULE_UNAVAILABLE,
        _ => error_codes::INTERNAL_ERROR,
    }
}
