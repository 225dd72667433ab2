//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Flag weight slots that will silently degrade at runtime
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Lenient runtime fallbacks (weight → 1, interval → 30) still apply;
//!   validation only surfaces what the operator probably got wrong

use crate::config::schema::{RelayConfig, WEIGHT_SLOT_PREFIX};

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.health_check_interval.trim().parse::<u64>().is_err() {
        errors.push(ValidationError {
            field: "health_check_interval".into(),
            message: format!(
                "'{}' is not an integer; the default of 30s will be used",
                config.health_check_interval
            ),
        });
    }

    for (key, slot) in &config.weights {
        if !key.starts_with(WEIGHT_SLOT_PREFIX) {
            errors.push(ValidationError {
                field: format!("weights.{}", key),
                message: format!("slot names must start with '{}'", WEIGHT_SLOT_PREFIX),
            });
        }
        if slot.node.is_empty() {
            continue;
        }
        match slot.weight.trim().parse::<i64>() {
            Ok(parsed) if parsed <= 0 => errors.push(ValidationError {
                field: format!("weights.{}", key),
                message: format!("weight {} excludes node '{}' from selection", parsed, slot.node),
            }),
            Err(_) => errors.push(ValidationError {
                field: format!("weights.{}", key),
                message: format!("weight '{}' is not an integer; 1 will be used", slot.weight),
            }),
            Ok(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
