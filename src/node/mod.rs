//! Backend node abstraction.
//!
//! # Data Flow
//! ```text
//! Host registers backends implementing ChatNode
//!     → NodeRegistry lists them for the router
//!     → Router excludes itself, orders candidates
//!     → Dispatcher invokes chat / chat_stream on the selected node
//!     → ChatResponse::measure feeds the stats tracker
//! ```
//!
//! # Design Decisions
//! - The contract is a trait object, not a concrete client: the core
//!   never owns backend connections
//! - `self_test` is a lightweight liveness probe, distinct from `chat`
//! - Node ids are stable strings, unique within the registry

pub mod message;

pub use message::{ChatRequest, ChatResponse, ContentPart, Usage};

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::NodeError;

/// Chunked streaming response: each item is one incremental response
/// fragment, or the error that broke the stream.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatResponse, NodeError>> + Send>>;

/// Uniform call contract every backend candidate exposes to the core.
#[async_trait]
pub trait ChatNode: Send + Sync {
    /// Stable identifier, unique within the node set.
    fn id(&self) -> &str;

    /// Single-shot chat completion.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, NodeError>;

    /// Streaming chat completion.
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, NodeError>;

    /// Lightweight liveness probe used by active health checks.
    async fn self_test(&self) -> Result<(), NodeError>;

    /// Model names this node serves, for host display purposes.
    fn models(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Host-side node discovery interface.
///
/// The registry returns the full known node set in discovery order. On
/// node load/unload the host calls
/// [`RouterNode::invalidate_candidates`](crate::router::RouterNode::invalidate_candidates)
/// so the router rebuilds its candidate list on next use.
pub trait NodeRegistry: Send + Sync {
    fn list_nodes(&self) -> Vec<Arc<dyn ChatNode>>;
}
