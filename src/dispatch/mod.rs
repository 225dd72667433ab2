//! Dispatch & failover subsystem.
//!
//! # Data Flow
//! ```text
//! Router hands over a frozen candidate snapshot
//!     → engine.rs filters healthy nodes, asks the strategy
//!     → invokes the picked node (single-shot or streaming)
//!     → outcome enqueued on the stats tracker (fire-and-forget)
//!     → on failure: node dropped from the working set, loop retries
//!     → on success: response returned / chunks forwarded, loop ends
//! ```
//!
//! # Design Decisions
//! - Per-node failures never surface; only exhaustion of the whole
//!   working set reaches the caller, carrying the last error
//! - The working set is private to one request: a node dropped after a
//!   failure is not retried within that request
//! - Streaming forwards chunks as produced through a bounded channel;
//!   a dropped receiver ends forwarding without counting as a failure

mod engine;
mod stream;

pub use engine::Dispatcher;
pub use stream::RelayStream;
