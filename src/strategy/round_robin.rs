//! Round-robin selection strategy.

use std::sync::{Arc, Mutex};

use crate::node::ChatNode;
use crate::strategy::{SelectionContext, SelectionStrategy};

/// Rotates through candidates with a single shared cursor.
///
/// The cursor is only meaningful while the candidate composition is
/// stable; after membership changes it drifts, which is acceptable for
/// load spreading.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for RoundRobin {
    fn select(
        &self,
        candidates: &[Arc<dyn ChatNode>],
        _ctx: &SelectionContext<'_>,
    ) -> Option<Arc<dyn ChatNode>> {
        if candidates.is_empty() {
            return None;
        }

        let mut cursor = self.cursor.lock().unwrap();
        let picked = candidates[*cursor % candidates.len()].clone();
        *cursor = (*cursor + 1) % candidates.len();
        Some(picked)
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::nodes;
    use std::collections::HashMap;

    #[test]
    fn test_full_cycle_visits_every_node_once() {
        let strategy = RoundRobin::new();
        let candidates = nodes(&["a", "b", "c"]);
        let stats = HashMap::new();
        let weights = HashMap::new();
        let ctx = SelectionContext {
            stats: &stats,
            weights: &weights,
        };

        for expected in ["a", "b", "c", "a", "b", "c"] {
            let picked = strategy.select(&candidates, &ctx).unwrap();
            assert_eq!(picked.id(), expected);
        }
    }

    #[test]
    fn test_single_candidate_is_deterministic() {
        let strategy = RoundRobin::new();
        let candidates = nodes(&["only"]);
        let stats = HashMap::new();
        let weights = HashMap::new();
        let ctx = SelectionContext {
            stats: &stats,
            weights: &weights,
        };

        for _ in 0..5 {
            assert_eq!(strategy.select(&candidates, &ctx).unwrap().id(), "only");
        }
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let strategy = RoundRobin::new();
        let stats = HashMap::new();
        let weights = HashMap::new();
        let ctx = SelectionContext {
            stats: &stats,
            weights: &weights,
        };
        assert!(strategy.select(&[], &ctx).is_none());
    }
}
