//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Router start:
//!     spawn stats consumer → spawn health check loop
//!
//! Router shutdown:
//!     trigger signal → health loop exits → await its handle
//!     → stats tracker drains its queue → consumer exits
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: probes stop before the stats queue closes, so
//!   probe outcomes are never lost
//! - Cancellation is cooperative and never surfaces as an error

pub mod shutdown;

pub use shutdown::ShutdownSignal;
