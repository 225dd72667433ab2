//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every candidate's `self_test`
//! - Feed probe outcomes to the stats tracker
//!
//! # Design Decisions
//! - A successful probe forgives one failure instead of wiping history,
//!   so a recovering node's failure rate improves gradually
//! - Probe errors are logged and recorded, never escape the loop

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use super::node::RouterNode;

pub(super) fn spawn_health_loop(
    router: Arc<RouterNode>,
    interval_secs: u64,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs, "health check loop starting");

        let mut ticker = time::interval(Duration::from_secs(interval_secs));
        // The first tick of a tokio interval fires immediately; consume
        // it so probing starts one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    probe_candidates(&router).await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("health check loop stopping");
                    break;
                }
            }
        }
    })
}

async fn probe_candidates(router: &RouterNode) {
    for node in router.candidates().iter() {
        tracing::debug!(node = %node.id(), "probing candidate");
        match node.self_test().await {
            Ok(()) => {
                router.stats().reset_failure_count(node.id());
            }
            Err(err) => {
                tracing::warn!(node = %node.id(), error = %err, "health probe failed");
                router.stats().record_failure(node.id());
            }
        }
    }
}
