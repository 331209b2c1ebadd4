//! Open modes accepted by the bridge

use envmap_errors::StreamError;
use std::fmt;
use std::str::FromStr;

/// How a caller asks to open an asset
///
/// Assets are read-only; every mode other than [`OpenMode::Read`] is
/// rejected with `StreamError::UnsupportedMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    #[default]
    Read,
    Write,
    ReadWrite,
    Append,
    Truncate,
}

impl OpenMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::ReadWrite => "rw",
            Self::Append => "wa",
            Self::Truncate => "wt",
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpenMode {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "rw" => Ok(Self::ReadWrite),
            "wa" => Ok(Self::Append),
            "wt" | "rwt" => Ok(Self::Truncate),
            other => Err(StreamError::UnsupportedMode {
                mode: other.to_string(),
            }),
        }
    }
}
