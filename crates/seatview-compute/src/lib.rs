//! Client wrappers for the external remote compute backend: model build,
//! batched depth render, and image synthesis.

#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

pub mod backend;
pub mod client;
pub mod dto;
pub mod error;

pub use backend::ComputeBackend;
pub use client::{BuiltModel, ComputeClient, SynthesizedImage};
pub use error::ComputeError;
