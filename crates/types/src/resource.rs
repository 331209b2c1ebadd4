//! Resource identifiers
//!
//! A [`ResourceId`] is the opaque URI handed to the front-end. It records
//! which source produced it and the path of the asset inside that source's
//! logical asset directory, so the streaming bridge can map it back to bytes
//! without running resolution again.
//!
//! Two shapes exist:
//!
//! - `content://<authority>/<dir>/<name>` for assets inside the remote module
//! - `bundle:///<dir>/<name>` for assets shipped with the base package

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// URI scheme for assets served out of the remote module.
pub const REMOTE_SCHEME: &str = "content";

/// URI scheme for assets shipped inside the local bundle.
pub const BUNDLE_SCHEME: &str = "bundle";

/// Which source an identifier addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Namespace {
    /// Installed remote module, addressed through a provider authority.
    RemoteModule { authority: String },
    /// Assets bundled with the base package.
    LocalBundle,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteModule { authority } => write!(f, "remote module ({authority})"),
            Self::LocalBundle => write!(f, "local bundle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceIdError {
    #[error("unsupported scheme in {uri}")]
    UnsupportedScheme { uri: String },

    #[error("missing authority in {uri}")]
    MissingAuthority { uri: String },

    #[error("expected <dir>/<name> path in {uri}")]
    InvalidPath { uri: String },

    #[error("invalid path segment {segment:?}")]
    InvalidSegment { segment: String },
}

/// Opaque, stable identifier of one deliverable asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId {
    namespace: Namespace,
    dir: String,
    name: String,
}

impl ResourceId {
    /// Build an identifier for an asset inside the remote module.
    ///
    /// # Errors
    ///
    /// Returns an error if the authority is empty or a path segment is not a
    /// plain file or directory name.
    pub fn remote(
        authority: impl Into<String>,
        dir: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ResourceIdError> {
        let authority = authority.into();
        if authority.is_empty() || authority.contains('/') {
            return Err(ResourceIdError::MissingAuthority { uri: authority });
        }
        Self::new(Namespace::RemoteModule { authority }, dir, name)
    }

    /// Build an identifier for an asset shipped in the local bundle.
    ///
    /// # Errors
    ///
    /// Returns an error if a path segment is not a plain file or directory name.
    pub fn bundle(dir: impl Into<String>, name: impl Into<String>) -> Result<Self, ResourceIdError> {
        Self::new(Namespace::LocalBundle, dir, name)
    }

    /// Build an identifier inside an arbitrary namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if a path segment is not a plain file or directory name.
    pub fn new(
        namespace: Namespace,
        dir: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ResourceIdError> {
        let dir = dir.into();
        let name = name.into();
        validate_segment(&dir)?;
        validate_segment(&name)?;
        Ok(Self {
            namespace,
            dir,
            name,
        })
    }

    /// Parse an identifier previously produced by [`ResourceId::to_string`].
    ///
    /// # Errors
    ///
    /// Returns an error for unknown schemes, missing authorities, or paths
    /// that are not exactly `<dir>/<name>`.
    pub fn parse(uri: &str) -> Result<Self, ResourceIdError> {
        let (namespace, path) = if let Some(rest) = uri.strip_prefix("content://") {
            let (authority, path) = rest.split_once('/').ok_or_else(|| {
                ResourceIdError::InvalidPath {
                    uri: uri.to_string(),
                }
            })?;
            if authority.is_empty() {
                return Err(ResourceIdError::MissingAuthority {
                    uri: uri.to_string(),
                });
            }
            (
                Namespace::RemoteModule {
                    authority: authority.to_string(),
                },
                path,
            )
        } else if let Some(path) = uri.strip_prefix("bundle:///") {
            (Namespace::LocalBundle, path)
        } else {
            return Err(ResourceIdError::UnsupportedScheme {
                uri: uri.to_string(),
            });
        };

        let mut segments = path.split('/');
        let (Some(dir), Some(name), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(ResourceIdError::InvalidPath {
                uri: uri.to_string(),
            });
        };

        Self::new(namespace, dir, name)
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Logical asset directory the identifier lives in.
    #[must_use]
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// File name of the asset.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the asset relative to its source root, `<dir>/<name>`.
    #[must_use]
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.dir, self.name)
    }

    /// Lowercased extension of the file name, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// MIME type reported to consumers that ask for one.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
    }
}

fn validate_segment(segment: &str) -> Result<(), ResourceIdError> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains('\0')
    {
        return Err(ResourceIdError::InvalidSegment {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Namespace::RemoteModule { authority } => write!(
                f,
                "{REMOTE_SCHEME}://{authority}/{}/{}",
                self.dir, self.name
            ),
            Namespace::LocalBundle => write!(f, "{BUNDLE_SCHEME}:///{}/{}", self.dir, self.name),
        }
    }
}

impl FromStr for ResourceId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = ResourceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_identifier_round_trips_through_display() {
        let id = ResourceId::remote("envmap.hdrprovider", "hdri_4k", "sunset.hdr").unwrap();
        let uri = id.to_string();
        assert_eq!(uri, "content://envmap.hdrprovider/hdri_4k/sunset.hdr");
        assert_eq!(ResourceId::parse(&uri).unwrap(), id);
    }

    #[test]
    fn bundle_identifier_has_empty_authority() {
        let id = ResourceId::bundle("hdri_4k", "ex.hdr").unwrap();
        assert_eq!(id.to_string(), "bundle:///hdri_4k/ex.hdr");
        assert_eq!(id.namespace(), &Namespace::LocalBundle);
        assert_eq!(id.relative_path(), "hdri_4k/ex.hdr");
    }

    #[test]
    fn parse_rejects_traversal_and_extra_segments() {
        assert!(matches!(
            ResourceId::parse("bundle:///hdri_4k/../secret"),
            Err(ResourceIdError::InvalidPath { .. })
        ));
        assert!(matches!(
            ResourceId::parse("bundle:///../x.hdr"),
            Err(ResourceIdError::InvalidSegment { .. })
        ));
        assert!(matches!(
            ResourceId::parse("content:///hdri_4k/x.hdr"),
            Err(ResourceIdError::MissingAuthority { .. })
        ));
        assert!(matches!(
            ResourceId::parse("https://example.com/hdri_4k/x.hdr"),
            Err(ResourceIdError::UnsupportedScheme { .. })
        ));
        assert!(ResourceId::parse("bundle:///x.hdr").is_err());
    }

    #[test]
    fn content_type_follows_extension() {
        let hdr = ResourceId::bundle("hdri_4k", "Studio.HDR").unwrap();
        assert_eq!(hdr.extension().as_deref(), Some("hdr"));
        assert_eq!(hdr.content_type(), "application/octet-stream");

        let jpg = ResourceId::bundle("hdri_4k", "preview.JPEG").unwrap();
        assert_eq!(jpg.content_type(), "image/jpeg");

        let bare = ResourceId::bundle("hdri_4k", "README").unwrap();
        assert_eq!(bare.extension(), None);
        assert_eq!(bare.content_type(), "application/octet-stream");
    }

    #[test]
    fn serde_uses_uri_string() {
        let id = ResourceId::remote("a.b", "hdri_4k", "x.hdr").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""content://a.b/hdri_4k/x.hdr""#);
        let back: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ResourceId>(r#""nope""#).is_err());
    }
}
