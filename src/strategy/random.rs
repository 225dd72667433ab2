//! Uniform random selection strategy.

use std::sync::Arc;

use rand::Rng;

use crate::node::ChatNode;
use crate::strategy::{SelectionContext, SelectionStrategy};

/// Uniform pick among the candidates.
#[derive(Debug, Default)]
pub struct Random;

impl SelectionStrategy for Random {
    fn select(
        &self,
        candidates: &[Arc<dyn ChatNode>],
        _ctx: &SelectionContext<'_>,
    ) -> Option<Arc<dyn ChatNode>> {
        if candidates.is_empty() {
            return None;
        }

        let index = rand::thread_rng().gen_range(0..candidates.len());
        Some(candidates[index].clone())
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
