//! Domain types, pure geometry, error taxonomy, and cost/retry tables for
//! the seat-view pipeline orchestrator.
//!
//! This crate has no async runtime dependency and performs no I/O; it is
//! shared by `seatview-compute`, `seatview-store`, `seatview-engine`, and
//! `seatview-cli`.

#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

pub mod api_types;
pub mod artifact;
pub mod cost;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod model;
pub mod retry;

pub use error::PipelineError;
pub use ids::{RunId, VenueId};
pub use model::{
    ExecutionControls, ImageModel, InputSnapshot, PipelineResult, ProgressSnapshot, RowLabel,
    Seat, SectionParams, Stage, SurfaceConfig, SurfaceKind, Tier,
};
