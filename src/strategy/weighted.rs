//! Weighted random selection strategy.

use std::sync::Arc;

use rand::Rng;

use crate::node::ChatNode;
use crate::strategy::{RoundRobin, SelectionContext, SelectionStrategy};

/// Weighted random pick over cumulative weight intervals.
///
/// Candidates absent from the weight map count as weight 1;
/// non-positive weights exclude the candidate. With no usable weights
/// the pick delegates to round-robin.
#[derive(Debug, Default)]
pub struct Weighted {
    fallback: RoundRobin,
}

impl Weighted {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for Weighted {
    fn select(
        &self,
        candidates: &[Arc<dyn ChatNode>],
        ctx: &SelectionContext<'_>,
    ) -> Option<Arc<dyn ChatNode>> {
        if candidates.is_empty() {
            return None;
        }
        if ctx.weights.is_empty() {
            return self.fallback.select(candidates, ctx);
        }

        let mut intervals = Vec::with_capacity(candidates.len());
        let mut total: u64 = 0;
        for node in candidates {
            let weight = ctx.weight_for(node.id()) as u64;
            if weight > 0 {
                total += weight;
                intervals.push((node, total));
            }
        }

        if total == 0 {
            return self.fallback.select(candidates, ctx);
        }

        let draw = rand::thread_rng().gen_range(0..total);
        for (node, end) in intervals {
            if draw < end {
                return Some(node.clone());
            }
        }

        // Unreachable: the draw is below the final interval end.
        self.fallback.select(candidates, ctx)
    }

    fn name(&self) -> &'static str {
        "weighted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::nodes;
    use std::collections::HashMap;

    #[test]
    fn test_proportions_converge_to_weights() {
        let strategy = Weighted::new();
        let candidates = nodes(&["a", "b"]);
        let stats = HashMap::new();
        let weights = HashMap::from([("a".to_string(), 9u32), ("b".to_string(), 1u32)]);
        let ctx = SelectionContext {
            stats: &stats,
            weights: &weights,
        };

        let trials = 5000;
        let mut a_hits = 0u32;
        for _ in 0..trials {
            if strategy.select(&candidates, &ctx).unwrap().id() == "a" {
                a_hits += 1;
            }
        }

        let ratio = a_hits as f64 / trials as f64;
        assert!(
            (ratio - 0.9).abs() < 0.05,
            "expected ~90% picks for weight 9/1, got {ratio:.3}"
        );
    }

    #[test]
    fn test_zero_weight_excludes_candidate() {
        let strategy = Weighted::new();
        let candidates = nodes(&["a", "b"]);
        let stats = HashMap::new();
        let weights = HashMap::from([("a".to_string(), 0u32), ("b".to_string(), 3u32)]);
        let ctx = SelectionContext {
            stats: &stats,
            weights: &weights,
        };

        for _ in 0..50 {
            assert_eq!(strategy.select(&candidates, &ctx).unwrap().id(), "b");
        }
    }

    #[test]
    fn test_unlisted_candidate_defaults_to_weight_one() {
        let strategy = Weighted::new();
        let candidates = nodes(&["a", "b"]);
        let stats = HashMap::new();
        let weights = HashMap::from([("a".to_string(), 1u32)]);
        let ctx = SelectionContext {
            stats: &stats,
            weights: &weights,
        };

        let mut b_hits = 0u32;
        for _ in 0..400 {
            if strategy.select(&candidates, &ctx).unwrap().id() == "b" {
                b_hits += 1;
            }
        }
        assert!(b_hits > 0, "unlisted candidate should still be selectable");
    }

    #[test]
    fn test_all_zero_weights_delegate_to_round_robin() {
        let strategy = Weighted::new();
        let candidates = nodes(&["a", "b"]);
        let stats = HashMap::new();
        let weights = HashMap::from([("a".to_string(), 0u32), ("b".to_string(), 0u32)]);
        let ctx = SelectionContext {
            stats: &stats,
            weights: &weights,
        };

        let first = strategy.select(&candidates, &ctx).unwrap();
        let second = strategy.select(&candidates, &ctx).unwrap();
        assert_ne!(first.id(), second.id(), "round-robin fallback rotates");
    }

    #[test]
    fn test_empty_weight_map_delegates_to_round_robin() {
        let strategy = Weighted::new();
        let candidates = nodes(&["a", "b"]);
        let stats = HashMap::new();
        let weights = HashMap::new();
        let ctx = SelectionContext {
            stats: &stats,
            weights: &weights,
        };

        assert_eq!(strategy.select(&candidates, &ctx).unwrap().id(), "a");
        assert_eq!(strategy.select(&candidates, &ctx).unwrap().id(), "b");
    }
}
