//! Achievement rule engine.
//!
//! `progress_for` is a pure function of the aggregate counters; `evaluate_all`
//! couples it to the store's insert-if-absent unlock, which is what makes
//! repeated evaluation idempotent.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AchievementRule, Difficulty, RuleDimension, RULES};
use crate::domain::ports::ProgressStore;

/// Current progress toward one rule, selected by its single dimension.
pub fn progress_for(
    rule: &AchievementRule,
    by_category: &HashMap<String, u32>,
    by_difficulty: &HashMap<Difficulty, u32>,
    total: u32,
) -> u32 {
    match rule.dimension {
        RuleDimension::Category(category) => by_category.get(category).copied().unwrap_or(0),
        RuleDimension::Difficulty(difficulty) => {
            by_difficulty.get(&difficulty).copied().unwrap_or(0)
        }
        RuleDimension::Total => total,
    }
}

/// Evaluate the full catalog against a user's current aggregates and attempt
/// to unlock every satisfied rule. Returns the rules newly unlocked by this
/// call; a second call with unchanged progress returns an empty list.
pub async fn evaluate_all(
    store: &Arc<dyn ProgressStore>,
    user_id: i64,
) -> DomainResult<Vec<&'static AchievementRule>> {
    let by_category = store.aggregate_by_category(user_id).await?;
    let by_difficulty = store.aggregate_by_difficulty(user_id).await?;
    let total = store.total_completed(user_id).await?;

    let mut newly_unlocked = Vec::new();
    for rule in RULES {
        let progress = progress_for(rule, &by_category, &by_difficulty, total);
        if progress >= rule.required && store.unlock(user_id, rule.key).await? {
            newly_unlocked.push(rule);
        }
    }
    Ok(newly_unlocked)
}
