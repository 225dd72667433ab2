//! Health & stats tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / health loop observe an outcome
//!     → record_* enqueues an update (non-blocking)
//!     → single consumer task applies updates in FIFO order
//!     → stats map (counters, EWMAs) and health map committed
//!     → candidate filter and strategies read latest committed state
//! ```
//!
//! # Design Decisions
//! - One consumer task is the only writer; the queue is the
//!   serialization point, so per-node counters need no locks
//! - Reads are lock-free and tolerably stale: stale health is
//!   acceptable for a load-balancing decision
//! - Stats entries are created lazily and never deleted; the node set
//!   is small and static per configuration

mod tracker;

pub use tracker::{
    NodeStats, StatsTracker, EWMA_ALPHA, FAILURE_RATE_THRESHOLD, MAX_UNBROKEN_FAILURES,
};
