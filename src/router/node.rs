//! The router node façade.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::config::RelayConfig;
use crate::dispatch::Dispatcher;
use crate::error::NodeError;
use crate::lifecycle::ShutdownSignal;
use crate::node::{ChatNode, ChatRequest, ChatResponse, ChatStream, NodeRegistry};
use crate::stats::StatsTracker;
use crate::strategy::StrategyKind;

use super::health::spawn_health_loop;

/// Façade backend node that aggregates its sibling nodes.
///
/// Implements [`ChatNode`] itself: callers get a response or stream
/// indistinguishable from a single backend, or a terminal failure only
/// once every candidate has failed.
pub struct RouterNode {
    id: String,
    strategy_kind: StrategyKind,
    fallback_order: Vec<String>,
    health_check_interval_secs: u64,
    registry: Arc<dyn NodeRegistry>,
    stats: Arc<StatsTracker>,
    dispatcher: Arc<Dispatcher>,
    candidates: ArcSwapOption<Vec<Arc<dyn ChatNode>>>,
    shutdown: ShutdownSignal,
    health_task: Mutex<Option<JoinHandle<()>>>,
}

impl RouterNode {
    /// Build a router from its configuration and the host registry.
    /// Requires a tokio runtime (the stats consumer starts here).
    pub fn new(
        id: impl Into<String>,
        config: &RelayConfig,
        registry: Arc<dyn NodeRegistry>,
    ) -> Arc<Self> {
        Self::with_dispatch_options(id, config, registry, false)
    }

    /// As [`RouterNode::new`], with strict health mode: when every
    /// remaining candidate is marked unhealthy the request fails
    /// instead of falling back to a known-unhealthy node.
    pub fn with_dispatch_options(
        id: impl Into<String>,
        config: &RelayConfig,
        registry: Arc<dyn NodeRegistry>,
        strict_health: bool,
    ) -> Arc<Self> {
        let strategy_kind = config.strategy_kind();
        let stats = StatsTracker::new();
        let dispatcher = Arc::new(
            Dispatcher::new(
                strategy_kind.build(),
                stats.clone(),
                config.resolved_weights(),
            )
            .strict_health(strict_health),
        );

        Arc::new(Self {
            id: id.into(),
            strategy_kind,
            fallback_order: config.fallback_order(),
            health_check_interval_secs: config.health_check_interval_secs(),
            registry,
            stats,
            dispatcher,
            candidates: ArcSwapOption::empty(),
            shutdown: ShutdownSignal::new(),
            health_task: Mutex::new(None),
        })
    }

    /// Start the active health check loop.
    pub fn start(self: &Arc<Self>) {
        let handle = spawn_health_loop(
            Arc::clone(self),
            self.health_check_interval_secs,
            self.shutdown.subscribe(),
        );
        *self.health_task.lock().unwrap() = Some(handle);
    }

    /// Drop the cached candidate list. Hosts call this when nodes are
    /// loaded or unloaded; the list is rebuilt on next use.
    pub fn invalidate_candidates(&self) {
        self.candidates.store(None);
    }

    /// Per-node statistics and health, for host introspection.
    pub fn stats(&self) -> &Arc<StatsTracker> {
        &self.stats
    }

    /// Stop the health loop, then drain and stop the stats tracker.
    /// Cancellation never surfaces as an error.
    pub async fn shutdown(&self) {
        self.shutdown.trigger();
        let health_task = self.health_task.lock().unwrap().take();
        if let Some(task) = health_task {
            if let Err(err) = task.await {
                tracing::debug!(error = %err, "health loop join failed");
            }
        }
        self.stats.shutdown().await;
        tracing::info!(router = %self.id, "router shut down");
    }

    /// Current candidate snapshot, rebuilt if invalidated.
    pub(super) fn candidates(&self) -> Arc<Vec<Arc<dyn ChatNode>>> {
        if let Some(list) = self.candidates.load_full() {
            return list;
        }
        let list = Arc::new(self.load_candidates());
        self.candidates.store(Some(list.clone()));
        list
    }

    /// Fetch the registry's nodes, excluding this router, ordered by
    /// the configured fallback order with unlisted nodes appended in
    /// discovery order. The weighted strategy keeps discovery order:
    /// its ordering input is the weight map, not the slot sequence.
    fn load_candidates(&self) -> Vec<Arc<dyn ChatNode>> {
        let mut nodes: Vec<Arc<dyn ChatNode>> = self
            .registry
            .list_nodes()
            .into_iter()
            .filter(|node| node.id() != self.id)
            .collect();

        if !self.fallback_order.is_empty() && self.strategy_kind != StrategyKind::Weighted {
            let mut ordered = Vec::with_capacity(nodes.len());
            for wanted in &self.fallback_order {
                if let Some(position) = nodes.iter().position(|node| node.id() == wanted) {
                    ordered.push(nodes.remove(position));
                }
            }
            ordered.append(&mut nodes);
            nodes = ordered;
        }

        for wanted in &self.fallback_order {
            if !nodes.iter().any(|node| node.id() == wanted) {
                tracing::warn!(
                    node = %wanted,
                    "configured weight slot references an unregistered node"
                );
            }
        }

        tracing::debug!(
            router = %self.id,
            candidates = ?nodes.iter().map(|n| n.id()).collect::<Vec<_>>(),
            "candidate list loaded"
        );
        nodes
    }
}

#[async_trait]
impl ChatNode for RouterNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, NodeError> {
        let candidates = self.candidates();
        self.dispatcher
            .execute(&candidates, request)
            .await
            .map_err(NodeError::from)
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, NodeError> {
        let candidates = self.candidates();
        let stream = self
            .dispatcher
            .clone()
            .execute_stream(candidates.as_ref().clone(), request)
            .map_err(NodeError::from)?;
        Ok(Box::pin(stream.map(|item| item.map_err(NodeError::from))))
    }

    async fn self_test(&self) -> Result<(), NodeError> {
        // The router is live as long as it exists; candidate liveness
        // is what the health loop probes.
        Ok(())
    }

    fn models(&self) -> Vec<String> {
        vec!["auto".to_string()]
    }
}
