//! `focusmeow-host`: the FocusMeow authority as a headless process.
//!
//! Reads tab events and surface requests as JSON lines on stdin, writes
//! renderer deliveries and replies as JSON lines on stdout. Logs go to
//! stderr so they never interleave with the protocol.

mod bridge;
mod config;

use anyhow::Context;
use bridge::{read_inputs, write_outputs, StdioRenderer};
use config::{HostConfig, StoreLocation};
use focusmeow_session::{EventRouter, RouterConfig, SessionState, TabRegistry};
use focusmeow_storage::{RuleStoreRef, SqliteRuleStore};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn open_store(location: &StoreLocation) -> anyhow::Result<RuleStoreRef> {
    let store = match location {
        StoreLocation::Memory => {
            tracing::info!("using in-memory settings");
            SqliteRuleStore::open_in_memory()?
        }
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            tracing::info!(path = %path.display(), "opening settings");
            SqliteRuleStore::open(path)
                .with_context(|| format!("opening settings at {}", path.display()))?
        }
    };
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,focusmeow=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = HostConfig::from_env();
    let store = open_store(&config.store)?;

    let session = Arc::new(SessionState::new(store));
    if let Err(e) = session.init().await {
        tracing::warn!(error = %e, "failed to seed settings, continuing with defaults");
    }

    let tabs = Arc::new(TabRegistry::new());
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let renderer = Arc::new(StdioRenderer::new(out_tx.clone(), tabs.clone()));
    let router = Arc::new(EventRouter::new(session, tabs, renderer));
    let (handle, router_task) = router.start(RouterConfig {
        queue_capacity: config.queue_capacity,
    });

    let writer = tokio::spawn(write_outputs(tokio::io::stdout(), out_rx));

    let reader = BufReader::new(tokio::io::stdin());
    read_inputs(reader, handle, out_tx).await?;

    // Inputs done: the router drains once its last handle drops, then the
    // renderer's sender goes with it and the writer finishes.
    router_task.await.context("router task panicked")?;
    writer.await.context("writer task panicked")??;
    Ok(())
}
