//! Node selection strategies.
//!
//! # Data Flow
//! ```text
//! Dispatcher filters the frozen candidate set to healthy nodes
//!     → SelectionStrategy::select picks one:
//!         - round_robin.rs (shared cursor rotation)
//!         - random.rs (uniform pick)
//!         - weighted.rs (cumulative weight intervals)
//!         - scored.rs (exploration/exploitation scoring)
//!     → Dispatcher invokes the picked node
//! ```
//!
//! # Design Decisions
//! - Strategies are synchronous: scoring reads committed stats
//!   snapshots, never awaits
//! - One strategy instance lives for the router's lifetime; only
//!   round-robin carries mutable state
//! - An unrecognized configured name degrades to random selection

pub mod random;
pub mod round_robin;
pub mod scored;
pub mod weighted;

pub use random::Random;
pub use round_robin::RoundRobin;
pub use scored::{Fastest, LeastFailure};
pub use weighted::Weighted;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::node::ChatNode;
use crate::stats::NodeStats;

/// Shared state a strategy may consult when picking a node.
pub struct SelectionContext<'a> {
    /// Committed per-node stats snapshot.
    pub stats: &'a HashMap<String, NodeStats>,
    /// Resolved node-id → weight mapping (weighted strategy only).
    pub weights: &'a HashMap<String, u32>,
}

impl SelectionContext<'_> {
    pub fn stats_for(&self, node_id: &str) -> NodeStats {
        self.stats.get(node_id).copied().unwrap_or_default()
    }

    /// Weight for a node; nodes absent from the map default to 1.
    pub fn weight_for(&self, node_id: &str) -> u32 {
        self.weights.get(node_id).copied().unwrap_or(1)
    }
}

/// Pick one node from the currently-healthy candidates.
///
/// `candidates` is the healthy subset of the request's frozen working
/// set, recomputed before every attempt. An empty slice yields `None`.
pub trait SelectionStrategy: Send + Sync + Debug {
    fn select(
        &self,
        candidates: &[Arc<dyn ChatNode>],
        ctx: &SelectionContext<'_>,
    ) -> Option<Arc<dyn ChatNode>>;

    /// Strategy name for logging.
    fn name(&self) -> &'static str;
}

/// Closed set of configurable strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    RoundRobin,
    Random,
    Weighted,
    LeastFailure,
    Fastest,
}

impl StrategyKind {
    /// Parse a configured strategy name. Unrecognized names degrade to
    /// random selection.
    pub fn parse(name: &str) -> Self {
        match name {
            "round_robin" => Self::RoundRobin,
            "random" => Self::Random,
            "weighted" => Self::Weighted,
            "least_failure" => Self::LeastFailure,
            "fastest" => Self::Fastest,
            other => {
                tracing::warn!(strategy = %other, "unrecognized strategy, using random");
                Self::Random
            }
        }
    }

    /// Build the strategy instance for this kind.
    pub fn build(self) -> Box<dyn SelectionStrategy> {
        match self {
            Self::RoundRobin => Box::new(RoundRobin::new()),
            Self::Random => Box::new(Random),
            Self::Weighted => Box::new(Weighted::new()),
            Self::LeastFailure => Box::new(LeastFailure::new()),
            Self::Fastest => Box::new(Fastest::new()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::error::NodeError;
    use crate::node::{ChatNode, ChatRequest, ChatResponse, ChatStream};

    /// Inert node carrying only an id, for selection tests.
    #[derive(Debug)]
    pub struct IdNode(pub &'static str);

    #[async_trait]
    impl ChatNode for IdNode {
        fn id(&self) -> &str {
            self.0
        }

        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, NodeError> {
            Ok(ChatResponse::from_text(self.0))
        }

        async fn chat_stream(&self, _request: ChatRequest) -> Result<ChatStream, NodeError> {
            Err(NodeError::Upstream("not streamable".into()))
        }

        async fn self_test(&self) -> Result<(), NodeError> {
            Ok(())
        }
    }

    pub fn nodes(ids: &[&'static str]) -> Vec<Arc<dyn ChatNode>> {
        ids.iter()
            .map(|&id| Arc::new(IdNode(id)) as Arc<dyn ChatNode>)
            .collect()
    }
}
