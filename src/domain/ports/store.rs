//! Persistence port for users, assigned tasks, and achievement records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AchievementRecord, AssignedTask, Difficulty, User};

/// Durable state store.
///
/// All operations are atomic with respect to each other for a single row or
/// group; `unlock` in particular must be an atomic insert-if-absent, since it
/// is the sole at-most-once guarantee for achievement unlocks.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Idempotent upsert keyed by the opaque handle.
    async fn get_or_create_user(&self, handle: &str) -> DomainResult<User>;

    /// Fetch a user by handle.
    async fn get_user(&self, handle: &str) -> DomainResult<Option<User>>;

    /// Bind the external catalog username. Uniqueness across users is not
    /// enforced.
    async fn set_leetcode_username(&self, handle: &str, username: &str) -> DomainResult<()>;

    /// Users with a non-null linked username and at least one pending task.
    /// Bounds the reconciler's per-sweep fan-out.
    async fn list_users_with_pending_work(&self) -> DomainResult<Vec<User>>;

    /// Create a new pending assignment.
    async fn add_assignment(
        &self,
        user_id: i64,
        slug: &str,
        difficulty: Difficulty,
        category: &str,
    ) -> DomainResult<AssignedTask>;

    /// Pending tasks in stable assignment order.
    async fn list_pending(&self, user_id: i64) -> DomainResult<Vec<AssignedTask>>;

    /// Completed tasks in assignment order.
    async fn list_completed(&self, user_id: i64) -> DomainResult<Vec<AssignedTask>>;

    /// Set the completion timestamp. Safe to call twice; the second call
    /// overwrites rather than erroring, since a retried sweep may re-observe
    /// the same slug.
    async fn mark_completed(&self, task_id: i64, completed_at: DateTime<Utc>) -> DomainResult<()>;

    /// Completed-task counts per category, recomputed on demand.
    async fn aggregate_by_category(&self, user_id: i64) -> DomainResult<HashMap<String, u32>>;

    /// Completed-task counts per difficulty, recomputed on demand.
    async fn aggregate_by_difficulty(&self, user_id: i64)
        -> DomainResult<HashMap<Difficulty, u32>>;

    /// Total completed tasks. Monotonic across sweeps.
    async fn total_completed(&self, user_id: i64) -> DomainResult<u32>;

    /// Atomic insert-if-absent of an unlock record. Returns `true` iff this
    /// call performed the unlock.
    async fn unlock(&self, user_id: i64, rule_key: &str) -> DomainResult<bool>;

    /// All unlock records for a user.
    async fn list_achievements(&self, user_id: i64) -> DomainResult<Vec<AchievementRecord>>;
}
