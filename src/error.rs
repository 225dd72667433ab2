//! Library error types.
//!
//! # Design Decisions
//! - Per-node failures (`NodeError`) are recovered inside the failover
//!   loop and never surface individually
//! - Callers only ever see `RelayError`: nothing to dispatch to, or
//!   every candidate exhausted (carrying the last underlying failure)

use thiserror::Error;

/// Failure of a single backend node call or probe.
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    /// The upstream service rejected or failed the call.
    #[error("upstream call failed: {0}")]
    Upstream(String),

    /// A streaming response broke after it started.
    #[error("stream interrupted: {0}")]
    Stream(String),

    /// The liveness probe failed.
    #[error("health probe failed: {0}")]
    Probe(String),
}

/// Terminal errors surfaced to callers of the router.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The candidate list was empty before the first attempt.
    #[error("no backend node available")]
    NoNodesAvailable,

    /// Every candidate was attempted and failed.
    #[error("all backend nodes failed")]
    AllNodesFailed(#[source] NodeError),
}

impl From<RelayError> for NodeError {
    fn from(err: RelayError) -> Self {
        match err {
            // Exhaustion propagates the most recent underlying failure
            // for diagnostic context.
            RelayError::AllNodesFailed(last) => last,
            RelayError::NoNodesAvailable => {
                NodeError::Upstream("no backend node available".to_string())
            }
        }
    }
}
