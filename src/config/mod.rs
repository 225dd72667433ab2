//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! host config (TOML or in-process values)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (immutable for the router's lifetime)
//!     → lenient accessors derive strategy kind, interval,
//!       fallback order and resolved weights
//! ```
//!
//! # Design Decisions
//! - Interval and weights stay string-typed as the host supplies them;
//!   parsing happens in accessors with documented defaults
//! - All fields have defaults to allow minimal configs
//! - Validation warns about values that will silently degrade

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{RelayConfig, WeightSlot};
