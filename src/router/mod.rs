//! Router node subsystem.
//!
//! # Data Flow
//! ```text
//! Host chat call → RouterNode (a ChatNode itself)
//!     → candidate snapshot (registry minus self, fallback-ordered)
//!     → Dispatcher (strategy pick, failover loop)
//!     → selected backend node
//!
//! Background: health.rs probes every candidate's self_test on a
//! configurable interval, feeding the stats tracker
//! ```
//!
//! # Design Decisions
//! - The router implements the same contract as its candidates, so a
//!   host cannot tell it from a single backend
//! - Candidate list is cached and invalidated by the host on node-set
//!   changes; rebuilt lazily on first use after invalidation
//! - The router never selects itself

mod health;
mod node;

pub use node::RouterNode;
