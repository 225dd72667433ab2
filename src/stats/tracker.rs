//! Per-node statistics and the serialized update queue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// A node is demoted when its failure rate crosses this.
pub const FAILURE_RATE_THRESHOLD: f64 = 0.5;

/// A node that has never succeeded is demoted after this many failures.
pub const MAX_UNBROKEN_FAILURES: u64 = 3;

/// EWMA smoothing parameter; closer to 1 weights recent samples more.
pub const EWMA_ALPHA: f64 = 0.5;

/// Rolling per-node statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    pub success: u64,
    pub failure: u64,
    /// Exponentially weighted request latency, seconds.
    pub latency_ewma: f64,
    /// Exponentially weighted throughput, tokens per second.
    pub throughput_ewma: f64,
}

impl NodeStats {
    pub fn attempts(&self) -> u64 {
        self.success + self.failure
    }
}

enum StatsUpdate {
    Success {
        node_id: String,
        latency_secs: f64,
        tokens: u64,
    },
    Failure {
        node_id: String,
    },
    ResetFailure {
        node_id: String,
    },
    /// Barrier: acknowledged once every earlier update is committed.
    Flush(oneshot::Sender<()>),
    /// Drain everything enqueued so far, then stop the consumer.
    Shutdown,
}

/// Tracks success/failure counts, latency and throughput EWMAs, and a
/// binary health flag per node id.
///
/// All `record_*` methods are fire-and-forget: they enqueue an update
/// and return immediately. A dedicated background task drains the queue
/// sequentially, so no two updates for the same node ever interleave.
pub struct StatsTracker {
    stats: Arc<DashMap<String, NodeStats>>,
    health: Arc<DashMap<String, bool>>,
    tx: mpsc::UnboundedSender<StatsUpdate>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl StatsTracker {
    /// Create the tracker and spawn its consumer task. Requires a tokio
    /// runtime.
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats: Arc<DashMap<String, NodeStats>> = Arc::new(DashMap::new());
        let health: Arc<DashMap<String, bool>> = Arc::new(DashMap::new());

        let consumer = tokio::spawn(drain_updates(rx, stats.clone(), health.clone()));

        Arc::new(Self {
            stats,
            health,
            tx,
            consumer: Mutex::new(Some(consumer)),
        })
    }

    /// Record a successful call with its wall-clock latency and the
    /// token (or size proxy) count it produced.
    pub fn record_success(&self, node_id: &str, latency_secs: f64, tokens: u64) {
        let _ = self.tx.send(StatsUpdate::Success {
            node_id: node_id.to_string(),
            latency_secs,
            tokens,
        });
    }

    /// Record a failed call.
    pub fn record_failure(&self, node_id: &str) {
        let _ = self.tx.send(StatsUpdate::Failure {
            node_id: node_id.to_string(),
        });
    }

    /// Forgive one failure, floored at zero. Used by the active health
    /// check loop so a recovering node's rate improves without erasing
    /// history.
    pub fn reset_failure_count(&self, node_id: &str) {
        let _ = self.tx.send(StatsUpdate::ResetFailure {
            node_id: node_id.to_string(),
        });
    }

    /// Whether the node is currently considered healthy. Nodes with no
    /// recorded outcome default to healthy.
    pub fn is_healthy(&self, node_id: &str) -> bool {
        self.health.get(node_id).map(|flag| *flag).unwrap_or(true)
    }

    /// Latest committed stats for one node (zeroed if never updated).
    pub fn get(&self, node_id: &str) -> NodeStats {
        self.stats
            .get(node_id)
            .map(|entry| *entry)
            .unwrap_or_default()
    }

    /// Copy of all committed stats, for strategy scoring.
    pub fn snapshot(&self) -> HashMap<String, NodeStats> {
        self.stats
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Wait until every update enqueued before this call is committed.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(StatsUpdate::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Drain the queue and stop the consumer task. Updates enqueued
    /// before this call are all applied; the wait is bounded by the
    /// queue length at shutdown time.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(StatsUpdate::Shutdown);
        let consumer = self.consumer.lock().unwrap().take();
        if let Some(consumer) = consumer {
            if let Err(err) = consumer.await {
                tracing::debug!(error = %err, "stats consumer join failed");
            }
        }
    }
}

async fn drain_updates(
    mut rx: mpsc::UnboundedReceiver<StatsUpdate>,
    stats: Arc<DashMap<String, NodeStats>>,
    health: Arc<DashMap<String, bool>>,
) {
    while let Some(update) = rx.recv().await {
        match update {
            StatsUpdate::Success {
                node_id,
                latency_secs,
                tokens,
            } => apply_success(&stats, &health, &node_id, latency_secs, tokens),
            StatsUpdate::Failure { node_id } => apply_failure(&stats, &health, &node_id),
            StatsUpdate::ResetFailure { node_id } => {
                if let Some(mut entry) = stats.get_mut(&node_id) {
                    entry.failure = entry.failure.saturating_sub(1);
                }
            }
            StatsUpdate::Flush(ack) => {
                let _ = ack.send(());
            }
            StatsUpdate::Shutdown => {
                tracing::debug!("stats consumer stopping");
                break;
            }
        }
    }
}

fn apply_success(
    stats: &DashMap<String, NodeStats>,
    health: &DashMap<String, bool>,
    node_id: &str,
    latency_secs: f64,
    tokens: u64,
) {
    let mut entry = stats.entry(node_id.to_string()).or_default();
    entry.success += 1;
    entry.latency_ewma = ewma(entry.latency_ewma, latency_secs);

    let throughput = if latency_secs > 0.0 {
        tokens as f64 / latency_secs
    } else {
        0.0
    };
    entry.throughput_ewma = ewma(entry.throughput_ewma, throughput);

    let committed = *entry;
    drop(entry);

    // Any success restores eligibility.
    health.insert(node_id.to_string(), true);

    tracing::debug!(
        node = %node_id,
        latency_secs,
        throughput = committed.throughput_ewma,
        success = committed.success,
        "recorded success"
    );
}

fn apply_failure(
    stats: &DashMap<String, NodeStats>,
    health: &DashMap<String, bool>,
    node_id: &str,
) {
    let mut entry = stats.entry(node_id.to_string()).or_default();
    entry.failure += 1;

    let total = entry.success + entry.failure;
    let failure_rate = entry.failure as f64 / total as f64;
    let never_succeeded = entry.success == 0 && entry.failure >= MAX_UNBROKEN_FAILURES;
    let failures = entry.failure;
    drop(entry);

    if failure_rate > FAILURE_RATE_THRESHOLD || never_succeeded {
        health.insert(node_id.to_string(), false);
        tracing::debug!(
            node = %node_id,
            failures,
            failure_rate,
            "node marked unhealthy"
        );
    } else {
        tracing::debug!(node = %node_id, failures, failure_rate, "recorded failure");
    }
}

fn ewma(current: f64, sample: f64) -> f64 {
    // A zero average means no sample yet; the first sample seeds it.
    if current == 0.0 {
        sample
    } else {
        EWMA_ALPHA * sample + (1.0 - EWMA_ALPHA) * current
    }
}
