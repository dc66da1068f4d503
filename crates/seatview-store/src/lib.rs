//! Uniform artifact store adapter: put/get/list over an opaque external
//! object store, with a local-disk fallback.

#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

pub mod composite;
pub mod error;
pub mod http_store;
pub mod layout;
pub mod local_store;
pub mod store;

pub use composite::CompositeStore;
pub use error::StoreError;
pub use http_store::HttpStore;
pub use local_store::LocalStore;
pub use store::ArtifactStore;
