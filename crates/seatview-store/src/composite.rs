//! Composite store: prefers the remote object store when configured, and
//! falls back silently to local disk on any transport failure, per §4.3
//! ("on object-store failure for a Put, fall back silently to local-disk
//! at a parallel path").

use async_trait::async_trait;
use tracing::warn;

use crate::error::StoreError;
use crate::http_store::HttpStore;
use crate::local_store::LocalStore;
use crate::store::ArtifactStore;

/// Uniform store that tries a remote [`HttpStore`] first (if configured)
/// and transparently falls back to [`LocalStore`] on failure. A run that
/// mixes local and remote paths remains correct; consumers only ever see
/// opaque path strings.
pub struct CompositeStore {
    remote: Option<HttpStore>,
    local: LocalStore,
}

impl CompositeStore {
    /// Remote-backed, with local fallback.
    pub fn with_remote(remote: HttpStore, local: LocalStore) -> Self {
        Self {
            remote: Some(remote),
            local,
        }
    }

    /// Local-disk only (remote unconfigured).
    pub fn local_only(local: LocalStore) -> Self {
        Self {
            remote: None,
            local,
        }
    }
}

#[async_trait]
impl ArtifactStore for CompositeStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, StoreError> {
        if let Some(remote) = &self.remote {
            match remote.put(key, bytes).await {
                Ok(path) => return Ok(path),
                Err(e) => warn!(key, error = %e, "remote put failed, falling back to local disk"),
            }
        }
        self.local.put(key, bytes).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        if let Some(remote) = &self.remote {
            match remote.get(key).await {
                Ok(bytes) => return Ok(bytes),
                Err(StoreError::NotFound(_)) => {}
                Err(e) => warn!(key, error = %e, "remote get failed, falling back to local disk"),
            }
        }
        self.local.get(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        if let Some(remote) = &self.remote {
            match remote.list(prefix).await {
                Ok(keys) => return Ok(keys),
                Err(e) => warn!(prefix, error = %e, "remote list failed, falling back to local disk"),
            }
        }
        self.local.list(prefix).await
    }
}
