//! Configuration schema definitions.
//!
//! The host supplies these values as loosely-typed strings (the way its
//! own config surface encodes them); accessors parse leniently and fall
//! back to defaults rather than failing a request path.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

/// Strategy used when the configured name is unrecognized.
pub const DEFAULT_STRATEGY: &str = "random";

/// Health check interval used when the configured value fails to parse.
pub const DEFAULT_HEALTH_CHECK_INTERVAL_SECS: u64 = 30;

/// Weight slot keys follow `weight_node_<index>`.
pub const WEIGHT_SLOT_PREFIX: &str = "weight_node_";

/// Router configuration, immutable for the router's lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Selection strategy name: one of `round_robin`, `random`,
    /// `weighted`, `least_failure`, `fastest`.
    pub strategy: String,

    /// Active health check interval, string-encoded seconds.
    pub health_check_interval: String,

    /// Weight slots: slot name → node assignment and weight.
    pub weights: BTreeMap<String, WeightSlot>,
}

/// One weight slot assigning a node and its weight.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightSlot {
    /// Assigned node id; empty means the slot is unused.
    pub node: String,

    /// String-encoded positive integer weight.
    pub weight: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL_SECS.to_string(),
            weights: BTreeMap::new(),
        }
    }
}

impl RelayConfig {
    /// Parsed strategy kind; unrecognized names degrade to random.
    pub fn strategy_kind(&self) -> StrategyKind {
        StrategyKind::parse(&self.strategy)
    }

    /// Parsed health check interval in seconds.
    pub fn health_check_interval_secs(&self) -> u64 {
        self.health_check_interval
            .trim()
            .parse()
            .unwrap_or(DEFAULT_HEALTH_CHECK_INTERVAL_SECS)
    }

    /// Fallback/priority order: assigned nodes of `weight_node_<i>`
    /// slots, ordered by slot index.
    pub fn fallback_order(&self) -> Vec<String> {
        let mut slots: Vec<(u64, &WeightSlot)> = self
            .weights
            .iter()
            .filter(|(key, slot)| key.starts_with(WEIGHT_SLOT_PREFIX) && !slot.node.is_empty())
            .filter_map(|(key, slot)| {
                key.rsplit('_')
                    .next()
                    .and_then(|suffix| suffix.parse().ok())
                    .map(|index| (index, slot))
            })
            .collect();
        slots.sort_by_key(|(index, _)| *index);
        slots
            .into_iter()
            .map(|(_, slot)| slot.node.clone())
            .collect()
    }

    /// Node-id → weight mapping for the weighted strategy.
    ///
    /// Unparsable weights fall back to 1; parsed non-positive weights
    /// resolve to 0, which excludes the node from weighted selection.
    pub fn resolved_weights(&self) -> HashMap<String, u32> {
        self.weights
            .values()
            .filter(|slot| !slot.node.is_empty())
            .map(|slot| {
                let weight = match slot.weight.trim().parse::<i64>() {
                    Ok(parsed) if parsed > 0 => parsed.min(u32::MAX as i64) as u32,
                    Ok(_) => 0,
                    Err(_) => 1,
                };
                (slot.node.clone(), weight)
            })
            .collect()
    }
}
