//! Assigned task domain model.
//!
//! An assigned task is one practice problem handed to one user. It moves from
//! pending (`completed_at` unset) to completed exactly once, only by the
//! reconciler, and is never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Problem difficulty as reported by the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// One practice problem assigned to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub id: i64,
    pub user_id: i64,
    /// Stable external identifier of the problem.
    pub slug: String,
    pub difficulty: Difficulty,
    /// Free-text category label (first topic tag from the catalog).
    pub category: String,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AssignedTask {
    pub fn is_pending(&self) -> bool {
        self.completed_at.is_none()
    }
}
