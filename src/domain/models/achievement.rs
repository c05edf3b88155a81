//! Achievement rules and unlock records.
//!
//! The rule catalog is fixed at deploy time. Each rule measures exactly one
//! progress dimension and unlocks at most once per user; the unlock record is
//! what makes re-evaluation idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::Difficulty;

/// The single progress counter a rule is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDimension {
    /// Completed tasks in one category label.
    Category(&'static str),
    /// Completed tasks at one difficulty.
    Difficulty(Difficulty),
    /// All completed tasks.
    Total,
}

/// One milestone rule from the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementRule {
    /// Stable key persisted in unlock records.
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub dimension: RuleDimension,
    /// Progress threshold at which the rule is satisfied.
    pub required: u32,
}

/// The deployed rule catalog.
///
/// Adding or removing rules here does not retroactively alter existing
/// unlock records.
pub const RULES: &[AchievementRule] = &[
    AchievementRule {
        key: "array_10",
        name: "Array Master",
        description: "Complete 10 Array problems",
        dimension: RuleDimension::Category("Array"),
        required: 10,
    },
    AchievementRule {
        key: "medium_1",
        name: "Medium Starter",
        description: "Complete 1 Medium problem",
        dimension: RuleDimension::Difficulty(Difficulty::Medium),
        required: 1,
    },
    AchievementRule {
        key: "hard_1",
        name: "Hard Hitter",
        description: "Complete 1 Hard problem",
        dimension: RuleDimension::Difficulty(Difficulty::Hard),
        required: 1,
    },
    AchievementRule {
        key: "dp_5",
        name: "DP Apprentice",
        description: "Complete 5 Dynamic Programming problems",
        dimension: RuleDimension::Category("Dynamic Programming"),
        required: 5,
    },
    AchievementRule {
        key: "total_25",
        name: "Quarter Century",
        description: "Complete 25 total problems",
        dimension: RuleDimension::Total,
        required: 25,
    },
];

/// Look up a catalog rule by its stable key.
pub fn rule_by_key(key: &str) -> Option<&'static AchievementRule> {
    RULES.iter().find(|r| r.key == key)
}

/// A persisted unlock of one rule for one user.
///
/// Unique per `(user_id, rule_key)`; the store enforces this at the schema
/// level and `unlock` is insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub id: i64,
    pub user_id: i64,
    pub rule_key: String,
    pub unlocked_at: DateTime<Utc>,
}
