//! HTTP-backed artifact store, talking to the external object store
//! through a small REST-ish contract: `PUT {base}/{key}`, `GET
//! {base}/{key}`, `GET {base}/list?prefix={prefix}` returning a JSON array
//! of full keys.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::StoreError;
use crate::store::ArtifactStore;

#[derive(Debug, Deserialize)]
struct ListResponse {
    keys: Vec<String>,
}

/// Thin `reqwest`-based client for the remote object store.
#[derive(Debug, Clone)]
pub struct HttpStore {
    http: Client,
    base_url: Url,
}

impl HttpStore {
    /// Builds a client against `base_url`. A trailing slash is appended if
    /// missing so `Url::join` extends the path instead of replacing its
    /// last segment.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn url_for(&self, key: &str) -> Url {
        self.base_url
            .join(key)
            .expect("artifact keys are URL-safe relative paths")
    }
}

#[async_trait]
impl ArtifactStore for HttpStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let url = self.url_for(key);
        let res = self
            .http
            .put(url.clone())
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StoreError::Transient(format!("put {key}: {e}")))?;
        if !res.status().is_success() {
            return Err(StoreError::Transient(format!(
                "put {key}: http {}",
                res.status()
            )));
        }
        Ok(url.to_string())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.url_for(key);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Transient(format!("get {key}: {e}")))?;
        match res.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            status if status.is_success() => res
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| StoreError::Transient(format!("get {key}: {e}"))),
            status => Err(StoreError::Transient(format!("get {key}: http {status}"))),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut url = self
            .base_url
            .join("list")
            .expect("'list' is a static valid relative URL");
        url.query_pairs_mut().append_pair("prefix", prefix);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Transient(format!("list {prefix}: {e}")))?;
        if !res.status().is_success() {
            return Err(StoreError::Transient(format!(
                "list {prefix}: http {}",
                res.status()
            )));
        }
        let body: ListResponse = res
            .json()
            .await
            .map_err(|e| StoreError::Transient(format!("list {prefix}: {e}")))?;
        Ok(body.keys)
    }
}
