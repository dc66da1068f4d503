//! The `ArtifactStore` trait: uniform put/get/list over an opaque blob
//! store, with listing scoped to key prefixes.

use async_trait::async_trait;

use crate::error::StoreError;

/// Uniform interface the runner and fan-out coordinator use to persist and
/// reload artifacts, whether backed by the remote object store, local disk,
/// or (via [`crate::composite::CompositeStore`]) both.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes `bytes` under `key`, overwrite semantics (last-write-wins, no
    /// versioning). Returns an opaque path callers must not parse.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, StoreError>;

    /// Reads the bytes at `key`. Returns [`StoreError::NotFound`] distinctly
    /// from any other transport failure.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Lists every full key currently persisted under `prefix` (the prefix
    /// itself is retained in each returned key, matching object-store
    /// `ListObjectsV2`-style semantics). Callers strip prefixes/suffixes
    /// themselves via `seatview_core::artifact::ArtifactKind`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
