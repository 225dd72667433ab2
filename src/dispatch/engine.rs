//! The failover execution loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::{NodeError, RelayError};
use crate::node::{ChatNode, ChatRequest, ChatResponse};
use crate::stats::StatsTracker;
use crate::strategy::{SelectionContext, SelectionStrategy};

use super::stream::RelayStream;

/// Chunk buffer between the forwarding task and the caller.
const STREAM_CHANNEL_CAPACITY: usize = 16;

/// Executes calls against a candidate set with strategy-driven
/// selection and retry-on-failure across the remaining candidates.
pub struct Dispatcher {
    strategy: Box<dyn SelectionStrategy>,
    stats: Arc<StatsTracker>,
    weights: HashMap<String, u32>,
    strict_health: bool,
}

impl Dispatcher {
    pub fn new(
        strategy: Box<dyn SelectionStrategy>,
        stats: Arc<StatsTracker>,
        weights: HashMap<String, u32>,
    ) -> Self {
        Self {
            strategy,
            stats,
            weights,
            strict_health: false,
        }
    }

    /// In strict mode the engine never falls back to a known-unhealthy
    /// candidate when the strategy yields none. The default (off)
    /// preserves graceful degradation: some node is always tried while
    /// any remain.
    pub fn strict_health(mut self, strict: bool) -> Self {
        self.strict_health = strict;
        self
    }

    /// Filter the working set to healthy nodes and ask the strategy.
    fn pick(&self, remaining: &[Arc<dyn ChatNode>]) -> Option<Arc<dyn ChatNode>> {
        let healthy: Vec<Arc<dyn ChatNode>> = remaining
            .iter()
            .filter(|node| self.stats.is_healthy(node.id()))
            .cloned()
            .collect();

        let snapshot = self.stats.snapshot();
        let ctx = SelectionContext {
            stats: &snapshot,
            weights: &self.weights,
        };

        match self.strategy.select(&healthy, &ctx) {
            Some(node) => Some(node),
            None if !self.strict_health => remaining.first().map(|node| {
                tracing::debug!(
                    node = %node.id(),
                    "strategy yielded no node, falling back to first candidate"
                );
                node.clone()
            }),
            None => None,
        }
    }

    fn exhausted(last_error: Option<NodeError>) -> RelayError {
        match last_error {
            Some(err) => RelayError::AllNodesFailed(err),
            None => RelayError::NoNodesAvailable,
        }
    }

    /// Single-shot execution with failover.
    pub async fn execute(
        &self,
        candidates: &[Arc<dyn ChatNode>],
        mut request: ChatRequest,
    ) -> Result<ChatResponse, RelayError> {
        if candidates.is_empty() {
            return Err(RelayError::NoNodesAvailable);
        }
        // The backend always uses its own default model.
        request.model = None;

        let request_id = Uuid::new_v4();
        let mut remaining: Vec<Arc<dyn ChatNode>> = candidates.to_vec();
        let mut last_error: Option<NodeError> = None;
        let mut attempt = 0u32;

        while !remaining.is_empty() {
            let Some(node) = self.pick(&remaining) else {
                break;
            };
            attempt += 1;
            tracing::debug!(
                request_id = %request_id,
                node = %node.id(),
                attempt,
                strategy = self.strategy.name(),
                "dispatching chat request"
            );

            let started = Instant::now();
            match node.chat(request.clone()).await {
                Ok(response) => {
                    let elapsed = started.elapsed().as_secs_f64();
                    let (tokens, size) = response.measure();
                    let measured = if tokens > 0 { tokens } else { size };
                    self.stats.record_success(node.id(), elapsed, measured);
                    return Ok(response);
                }
                Err(err) => {
                    tracing::debug!(
                        request_id = %request_id,
                        node = %node.id(),
                        error = %err,
                        "backend call failed, failing over"
                    );
                    self.stats.record_failure(node.id());
                    remaining.retain(|candidate| candidate.id() != node.id());
                    last_error = Some(err);
                }
            }
        }

        Err(Self::exhausted(last_error))
    }

    /// Streaming execution with failover.
    ///
    /// Chunks are forwarded as the selected backend produces them. A
    /// mid-stream error drops the node and restarts the stream on the
    /// next candidate; the failed attempt's chunks are not re-emitted.
    /// The terminal error, if any, arrives as the final stream item.
    pub fn execute_stream(
        self: Arc<Self>,
        candidates: Vec<Arc<dyn ChatNode>>,
        mut request: ChatRequest,
    ) -> Result<RelayStream, RelayError> {
        if candidates.is_empty() {
            return Err(RelayError::NoNodesAvailable);
        }
        request.model = None;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let request_id = Uuid::new_v4();

        tokio::spawn(async move {
            let mut remaining = candidates;
            let mut last_error: Option<NodeError> = None;
            let mut attempt = 0u32;

            while !remaining.is_empty() {
                let Some(node) = self.pick(&remaining) else {
                    break;
                };
                attempt += 1;
                tracing::debug!(
                    request_id = %request_id,
                    node = %node.id(),
                    attempt,
                    strategy = self.strategy.name(),
                    "dispatching streaming chat request"
                );

                let started = Instant::now();
                let mut tokens = 0u64;
                let mut size = 0u64;
                let mut failure: Option<NodeError> = None;
                let mut caller_gone = false;

                match node.chat_stream(request.clone()).await {
                    Ok(mut chunks) => {
                        while let Some(item) = chunks.next().await {
                            match item {
                                Ok(chunk) => {
                                    let (t, s) = chunk.measure();
                                    tokens += t;
                                    size += s;
                                    if tx.send(Ok(chunk)).await.is_err() {
                                        caller_gone = true;
                                        break;
                                    }
                                }
                                Err(err) => {
                                    failure = Some(err);
                                    break;
                                }
                            }
                        }
                    }
                    Err(err) => failure = Some(err),
                }

                match failure {
                    None => {
                        // Caller abandonment is not a backend failure:
                        // the attempt succeeded as far as it went.
                        let elapsed = started.elapsed().as_secs_f64();
                        let measured = if tokens > 0 { tokens } else { size };
                        self.stats.record_success(node.id(), elapsed, measured);
                        if caller_gone {
                            tracing::debug!(
                                request_id = %request_id,
                                node = %node.id(),
                                "caller dropped the stream, stopping forwarding"
                            );
                        }
                        return;
                    }
                    Some(err) => {
                        tracing::debug!(
                            request_id = %request_id,
                            node = %node.id(),
                            error = %err,
                            "streaming call failed, failing over"
                        );
                        self.stats.record_failure(node.id());
                        let failed_id = node.id().to_string();
                        remaining.retain(|candidate| candidate.id() != failed_id);
                        last_error = Some(err);
                    }
                }
            }

            let _ = tx.send(Err(Self::exhausted(last_error))).await;
        });

        Ok(RelayStream::new(rx))
    }
}
