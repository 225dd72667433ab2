//! Exploration/exploitation scored strategies.
//!
//! Both strategies score every candidate as `base + exploration bonus`
//! and pick weighted-random over the scores. The bonus shrinks as a
//! node accumulates attempts, so rarely-tried nodes keep getting
//! sampled while proven nodes dominate.

use std::sync::Arc;

use rand::Rng;

use crate::node::ChatNode;
use crate::stats::NodeStats;
use crate::strategy::{SelectionContext, SelectionStrategy};

/// Default exploration factor for both scored strategies.
pub const EXPLORATION_FACTOR: f64 = 2.0;

/// Bonus multiplier for a node that was never attempted: large enough
/// to all but guarantee untried nodes are sampled first.
const UNTRIED_BONUS_MULTIPLIER: f64 = 10.0;

fn exploration_bonus(factor: f64, attempts: u64) -> f64 {
    if attempts > 0 {
        let n = attempts as f64;
        factor * ((n + 1.0).ln() / n).sqrt()
    } else {
        factor * UNTRIED_BONUS_MULTIPLIER
    }
}

fn select_by_score(
    candidates: &[Arc<dyn ChatNode>],
    ctx: &SelectionContext<'_>,
    factor: f64,
    base_score: impl Fn(&NodeStats) -> f64,
) -> Option<Arc<dyn ChatNode>> {
    if candidates.is_empty() {
        return None;
    }

    let mut scored = Vec::with_capacity(candidates.len());
    let mut total = 0.0;
    for node in candidates {
        let stats = ctx.stats_for(node.id());
        let score = base_score(&stats) + exploration_bonus(factor, stats.attempts());
        total += score;
        scored.push((node, score));
    }

    if total > 0.0 {
        let draw = rand::thread_rng().gen_range(0.0..total);
        let mut cumulative = 0.0;
        for (node, score) in &scored {
            cumulative += score;
            if draw <= cumulative {
                return Some((*node).clone());
            }
        }
    }

    // All scores zero: fall back to a uniform pick.
    let index = rand::thread_rng().gen_range(0..candidates.len());
    Some(candidates[index].clone())
}

/// Prefers nodes with the best success rate.
///
/// Base score is `success / attempts`; never-attempted nodes score an
/// optimistic 1.0 to force exploration.
#[derive(Debug)]
pub struct LeastFailure {
    factor: f64,
}

impl LeastFailure {
    pub fn new() -> Self {
        Self {
            factor: EXPLORATION_FACTOR,
        }
    }
}

impl Default for LeastFailure {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for LeastFailure {
    fn select(
        &self,
        candidates: &[Arc<dyn ChatNode>],
        ctx: &SelectionContext<'_>,
    ) -> Option<Arc<dyn ChatNode>> {
        select_by_score(candidates, ctx, self.factor, |stats| {
            if stats.attempts() > 0 {
                stats.success as f64 / stats.attempts() as f64
            } else {
                1.0
            }
        })
    }

    fn name(&self) -> &'static str {
        "least_failure"
    }
}

/// Prefers nodes with the highest observed throughput.
///
/// Base score is the throughput EWMA; unmeasured nodes score 0 and rely
/// on the exploration bonus.
#[derive(Debug)]
pub struct Fastest {
    factor: f64,
}

impl Fastest {
    pub fn new() -> Self {
        Self {
            factor: EXPLORATION_FACTOR,
        }
    }
}

impl Default for Fastest {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for Fastest {
    fn select(
        &self,
        candidates: &[Arc<dyn ChatNode>],
        ctx: &SelectionContext<'_>,
    ) -> Option<Arc<dyn ChatNode>> {
        select_by_score(candidates, ctx, self.factor, |stats| stats.throughput_ewma)
    }

    fn name(&self) -> &'static str {
        "fastest"
    }
}
