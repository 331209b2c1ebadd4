//! Source abstraction shared by enumeration and streaming

use envmap_types::Namespace;
use std::fmt;
use std::io::{self, Read};

/// Sequential, non-seekable handle on one asset
pub struct AssetReader {
    reader: Box<dyn Read + Send>,
    len: Option<u64>,
}

impl AssetReader {
    pub fn new(reader: impl Read + Send + 'static, len: Option<u64>) -> Self {
        Self {
            reader: Box::new(reader),
            len,
        }
    }

    /// Declared length in bytes, when the source knows it
    #[must_use]
    pub fn len(&self) -> Option<u64> {
        self.len
    }

    #[must_use]
    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl Read for AssetReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for AssetReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetReader")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// A place assets can be listed from and read out of
///
/// Methods are blocking; async callers run them on the blocking pool.
pub trait AssetSource: Send + Sync + fmt::Debug {
    /// Namespace encoded into identifiers produced from this source
    fn namespace(&self) -> Namespace;

    /// Whether the source can be consulted at all
    fn is_available(&self) -> bool {
        true
    }

    /// Entry names directly under `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is absent or cannot be read.
    fn list_dir(&self, dir: &str) -> io::Result<Vec<String>>;

    /// Open `dir/name` for sequential reading
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist, or the underlying
    /// error if it cannot be opened.
    fn open(&self, dir: &str, name: &str) -> io::Result<AssetReader>;
}
