//! Assets shipped with the base package

use crate::source::{AssetReader, AssetSource};
use envmap_types::Namespace;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Directory-backed source for the local bundle
#[derive(Debug, Clone)]
pub struct BundleSource {
    root: PathBuf,
}

impl BundleSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for BundleSource {
    fn namespace(&self) -> Namespace {
        Namespace::LocalBundle
    }

    /// Regular files under `dir`, sorted by name
    fn list_dir(&self, dir: &str) -> io::Result<Vec<String>> {
        list_files(&self.root.join(dir))
    }

    fn open(&self, dir: &str, name: &str) -> io::Result<AssetReader> {
        open_file(&self.root.join(dir).join(name))
    }
}

/// Sorted regular-file names of `path`; names that are not UTF-8 are skipped
pub(crate) fn list_files(path: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

pub(crate) fn open_file(path: &Path) -> io::Result<AssetReader> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a file", path.display()),
        ));
    }
    let file = File::open(path)?;
    Ok(AssetReader::new(file, Some(metadata.len())))
}
