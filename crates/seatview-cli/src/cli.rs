use std::path::PathBuf;

use clap::Parser;
use reqwest::Url;

fn default_local_artifact_root() -> PathBuf {
    PathBuf::from("./artifacts")
}

/// Command-line configuration for a single orchestrator run, built from
/// CLI flags with environment-variable fallbacks, the same precedence
/// `bbr-client::cli::Cli` applies to `BBR_BACKEND_URL` and friends.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seatview-pipeline",
    version,
    about = "Seat-view pipeline orchestrator"
)]
pub struct Cli {
    /// Path to the Input Snapshot JSON file describing the run.
    #[arg(long)]
    pub input: PathBuf,

    /// Base URL of the remote compute backend (model build, depth render,
    /// image synthesis).
    #[arg(long, env = "SEATVIEW_COMPUTE_URL")]
    pub compute_url: Url,

    /// Base URL of the remote artifact store. When absent, runs are
    /// local-disk-only.
    #[arg(long, env = "SEATVIEW_STORE_URL")]
    pub store_url: Option<Url>,

    /// Root directory for the local-disk artifact fallback (and the only
    /// store when `--store-url` is absent).
    #[arg(
        long,
        env = "SEATVIEW_LOCAL_ROOT",
        default_value_os_t = default_local_artifact_root()
    )]
    pub local_root: PathBuf,

    /// Seats per remote depth-render batch call. Overrides the Input
    /// Snapshot's `controls.depth_batch_size` when set.
    #[arg(long, env = "SEATVIEW_DEPTH_BATCH_SIZE")]
    pub depth_batch_size: Option<usize>,

    /// Seats per concurrent image-synthesis batch. Overrides the Input
    /// Snapshot's `controls.parallel_image_batch_size` when set.
    #[arg(long, env = "SEATVIEW_IMAGE_BATCH_SIZE")]
    pub image_batch_size: Option<usize>,
}
