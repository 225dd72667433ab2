//! llm-relay: request routing and failover for chat-completion backends.
//!
//! An in-process library that fronts a set of interchangeable backend
//! nodes with one façade node, spreading load with a pluggable strategy
//! and failing over across the remaining candidates until one succeeds
//! or all are exhausted.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  LLM RELAY                    │
//!                    │                                               │
//!   Host chat call   │  ┌────────┐    ┌──────────┐    ┌──────────┐  │
//!   ─────────────────┼─▶│ router │───▶│ dispatch │───▶│ strategy │  │
//!                    │  │  node  │    │ failover │    │   pick   │  │
//!                    │  └────┬───┘    └────┬─────┘    └──────────┘  │
//!                    │       │             │                        │
//!                    │       │             ▼                        │
//!   Response/stream  │       │       ┌──────────┐                   │
//!   ◀────────────────┼───────┼───────│ selected │◀──────────────────┼── Backend
//!                    │       │       │ backend  │                   │    nodes
//!                    │       │       └────┬─────┘                   │
//!                    │       │            │ outcome                 │
//!                    │       ▼            ▼                         │
//!                    │  ┌────────┐   ┌─────────┐                    │
//!                    │  │ health │──▶│  stats  │ (queue + single    │
//!                    │  │  loop  │   │ tracker │  consumer task)    │
//!                    │  └────────┘   └─────────┘                    │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! The router is itself a [`ChatNode`]: hosts register it next to real
//! backends and callers cannot tell the difference. All state is
//! in-memory and rebuilt from zero on restart.

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod node;
pub mod router;

// Traffic management
pub mod stats;
pub mod strategy;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;

pub use config::{RelayConfig, WeightSlot};
pub use dispatch::{Dispatcher, RelayStream};
pub use error::{NodeError, RelayError};
pub use lifecycle::ShutdownSignal;
pub use node::{ChatNode, ChatRequest, ChatResponse, ChatStream, NodeRegistry};
pub use router::RouterNode;
pub use stats::{NodeStats, StatsTracker};
pub use strategy::{SelectionStrategy, StrategyKind};
