mod cli;
mod shutdown;

use std::sync::Arc;

use clap::Parser;
use reqwest::Url;

use seatview_compute::{ComputeBackend, ComputeClient};
use seatview_core::model::InputSnapshot;
use seatview_core::VenueId;
use seatview_engine::{start_pipeline, PipelineEvent, VenueRunRegistry};
use seatview_store::{ArtifactStore, CompositeStore, HttpStore, LocalStore};

use crate::cli::Cli;
use crate::shutdown::{spawn_ctrl_c_handler, ShutdownController, ShutdownEvent};

fn build_store(store_url: Option<Url>, local_root: std::path::PathBuf) -> Arc<dyn ArtifactStore> {
    let local = LocalStore::new(local_root);
    match store_url {
        Some(url) => Arc::new(CompositeStore::with_remote(HttpStore::new(url), local)),
        None => Arc::new(CompositeStore::local_only(local)),
    }
}

fn load_input(path: &std::path::Path, cli: &Cli) -> anyhow::Result<InputSnapshot> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("reading input snapshot {}: {e}", path.display()))?;
    let mut input: InputSnapshot = serde_json::from_slice(&bytes)
        .map_err(|e| anyhow::anyhow!("parsing input snapshot {}: {e}", path.display()))?;
    if let Some(batch_size) = cli.depth_batch_size {
        input.controls.depth_batch_size = batch_size;
    }
    if let Some(batch_size) = cli.image_batch_size {
        input.controls.parallel_image_batch_size = batch_size;
    }
    Ok(input)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let input = load_input(&cli.input, &cli)?;
    let venue_id = VenueId::new(input.venue_id.clone());

    let compute: Arc<dyn ComputeBackend> = Arc::new(ComputeClient::new(cli.compute_url.clone()));
    let store = build_store(cli.store_url.clone(), cli.local_root.clone());
    let registry = Arc::new(VenueRunRegistry::new());

    let handle = start_pipeline(venue_id, input, compute, store, registry);

    let shutdown = Arc::new(ShutdownController::new());
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::unbounded_channel::<ShutdownEvent>();
    spawn_ctrl_c_handler(shutdown, shutdown_tx);

    println!(
        "seatview-pipeline {} run_id={} venue={}",
        env!("CARGO_PKG_VERSION"),
        handle.run_id(),
        cli.input.display()
    );

    let mut events = handle.subscribe();
    let mut immediate_exit = false;

    loop {
        tokio::select! {
            ev = shutdown_rx.recv() => {
                match ev {
                    Some(ShutdownEvent::Graceful) => {
                        println!("stop requested — finishing the current stage before exiting (press CTRL+C again to exit immediately)");
                        handle.cancel();
                    }
                    Some(ShutdownEvent::Immediate) => {
                        eprintln!("stop requested again — exiting immediately");
                        immediate_exit = true;
                        break;
                    }
                    None => {}
                }
            }
            evt = events.recv() => {
                match evt {
                    Ok(PipelineEvent::StageChanged { stage, message, .. }) => {
                        println!("[{stage:?}] {message}");
                    }
                    Ok(PipelineEvent::Retrying { operation, attempt, error, .. }) => {
                        println!("retrying {operation} (attempt {attempt}): {error}");
                    }
                    Ok(PipelineEvent::ItemFailed { seat_id, error, .. }) => {
                        eprintln!("seat {seat_id} failed: {error}");
                    }
                    Ok(PipelineEvent::CancelRequested { .. }) => {}
                    Ok(PipelineEvent::Started { .. }) => {}
                    Ok(PipelineEvent::Finished { .. }) => break,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    if immediate_exit {
        std::process::exit(130);
    }

    let result = handle.wait().await?;
    println!(
        "done: success={} images={} failed={} cost=${:.2} duration={:.1}s",
        result.success,
        result.images_generated,
        result.failed_seats.len(),
        result.total_cost,
        result.duration_seconds,
    );

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
