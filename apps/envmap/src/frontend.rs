//! File-backed front-end for `envmap push`

use async_trait::async_trait;
use envmap_ops::Frontend;
use std::path::PathBuf;

/// Writes the asset list to a file once an optional marker file appears
pub struct FileFrontend {
    target: PathBuf,
    ready_file: Option<PathBuf>,
}

impl FileFrontend {
    pub fn new(target: PathBuf, ready_file: Option<PathBuf>) -> Self {
        Self { target, ready_file }
    }
}

#[async_trait]
impl Frontend for FileFrontend {
    async fn is_ready(&self) -> bool {
        match &self.ready_file {
            Some(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            None => true,
        }
    }

    async fn set_asset_list(&self, payload: String) -> bool {
        match tokio::fs::write(&self.target, payload).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(target = %self.target.display(), error = %e, "failed to write asset list");
                false
            }
        }
    }
}
