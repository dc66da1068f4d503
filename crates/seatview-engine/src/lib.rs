#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

//! Durable, resumable pipeline runner driving a venue through seat
//! generation, model build, depth rendering, and image synthesis.

mod cancel;
mod events;
mod fanout;
mod handle;
mod progress;
mod registry;
mod resume;
mod retry;
mod runner;

pub use cancel::CancelFlag;
pub use events::PipelineEvent;
pub use handle::{start_pipeline, PipelineHandle};
pub use registry::VenueRunRegistry;
