//! SQLite implementation of the ProgressStore port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;

use super::{parse_datetime, parse_optional_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AchievementRecord, AssignedTask, Difficulty, User};
use crate::domain::ports::ProgressStore;

#[derive(Clone)]
pub struct SqliteProgressStore {
    pool: SqlitePool,
}

impl SqliteProgressStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    handle: String,
    leetcode_username: Option<String>,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> DomainResult<Self> {
        Ok(User {
            id: row.id,
            handle: row.handle,
            leetcode_username: row.leetcode_username,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    slug: String,
    difficulty: String,
    category: String,
    assigned_at: String,
    completed_at: Option<String>,
}

impl TryFrom<TaskRow> for AssignedTask {
    type Error = DomainError;

    fn try_from(row: TaskRow) -> DomainResult<Self> {
        let difficulty = Difficulty::from_str(&row.difficulty).ok_or_else(|| {
            DomainError::Serialization(format!("unknown difficulty: {}", row.difficulty))
        })?;
        Ok(AssignedTask {
            id: row.id,
            user_id: row.user_id,
            slug: row.slug,
            difficulty,
            category: row.category,
            assigned_at: parse_datetime(&row.assigned_at)?,
            completed_at: parse_optional_datetime(row.completed_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AchievementRow {
    id: i64,
    user_id: i64,
    rule_key: String,
    unlocked_at: String,
}

impl TryFrom<AchievementRow> for AchievementRecord {
    type Error = DomainError;

    fn try_from(row: AchievementRow) -> DomainResult<Self> {
        Ok(AchievementRecord {
            id: row.id,
            user_id: row.user_id,
            rule_key: row.rule_key,
            unlocked_at: parse_datetime(&row.unlocked_at)?,
        })
    }
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn get_or_create_user(&self, handle: &str) -> DomainResult<User> {
        // INSERT OR IGNORE keeps this a single idempotent upsert keyed on the
        // handle's UNIQUE constraint.
        sqlx::query("INSERT OR IGNORE INTO users (handle, created_at) VALUES (?, ?)")
            .bind(handle)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        let row: UserRow = sqlx::query_as("SELECT * FROM users WHERE handle = ?")
            .bind(handle)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_user(&self, handle: &str) -> DomainResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE handle = ?")
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn set_leetcode_username(&self, handle: &str, username: &str) -> DomainResult<()> {
        let result = sqlx::query("UPDATE users SET leetcode_username = ? WHERE handle = ?")
            .bind(username)
            .bind(handle)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(handle.to_string()));
        }
        Ok(())
    }

    async fn list_users_with_pending_work(&self) -> DomainResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r"SELECT DISTINCT u.* FROM users u
              JOIN assigned_tasks t ON t.user_id = u.id
              WHERE t.completed_at IS NULL AND u.leetcode_username IS NOT NULL
              ORDER BY u.id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn add_assignment(
        &self,
        user_id: i64,
        slug: &str,
        difficulty: Difficulty,
        category: &str,
    ) -> DomainResult<AssignedTask> {
        let assigned_at = Utc::now();
        let result = sqlx::query(
            r"INSERT INTO assigned_tasks (user_id, slug, difficulty, category, assigned_at)
              VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(slug)
        .bind(difficulty.as_str())
        .bind(category)
        .bind(assigned_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(AssignedTask {
            id: result.last_insert_rowid(),
            user_id,
            slug: slug.to_string(),
            difficulty,
            category: category.to_string(),
            assigned_at,
            completed_at: None,
        })
    }

    async fn list_pending(&self, user_id: i64) -> DomainResult<Vec<AssignedTask>> {
        // Assignment order (rowid) keeps multi-match resolution deterministic.
        let rows: Vec<TaskRow> = sqlx::query_as(
            r"SELECT * FROM assigned_tasks
              WHERE user_id = ? AND completed_at IS NULL
              ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(AssignedTask::try_from).collect()
    }

    async fn list_completed(&self, user_id: i64) -> DomainResult<Vec<AssignedTask>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            r"SELECT * FROM assigned_tasks
              WHERE user_id = ? AND completed_at IS NOT NULL
              ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(AssignedTask::try_from).collect()
    }

    async fn mark_completed(&self, task_id: i64, completed_at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query("UPDATE assigned_tasks SET completed_at = ? WHERE id = ?")
            .bind(completed_at.to_rfc3339())
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TaskNotFound(task_id));
        }
        Ok(())
    }

    async fn aggregate_by_category(&self, user_id: i64) -> DomainResult<HashMap<String, u32>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r"SELECT category, COUNT(*) FROM assigned_tasks
              WHERE user_id = ? AND completed_at IS NOT NULL
              GROUP BY category",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(category, count)| (category, count as u32))
            .collect())
    }

    async fn aggregate_by_difficulty(
        &self,
        user_id: i64,
    ) -> DomainResult<HashMap<Difficulty, u32>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r"SELECT difficulty, COUNT(*) FROM assigned_tasks
              WHERE user_id = ? AND completed_at IS NOT NULL
              GROUP BY difficulty",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::new();
        for (difficulty, count) in rows {
            let difficulty = Difficulty::from_str(&difficulty).ok_or_else(|| {
                DomainError::Serialization(format!("unknown difficulty: {difficulty}"))
            })?;
            counts.insert(difficulty, count as u32);
        }
        Ok(counts)
    }

    async fn total_completed(&self, user_id: i64) -> DomainResult<u32> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM assigned_tasks WHERE user_id = ? AND completed_at IS NOT NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u32)
    }

    async fn unlock(&self, user_id: i64, rule_key: &str) -> DomainResult<bool> {
        // INSERT OR IGNORE against the (user_id, rule_key) UNIQUE constraint
        // is the at-most-once guarantee; rows_affected tells us whether this
        // call won.
        let result = sqlx::query(
            "INSERT OR IGNORE INTO achievements (user_id, rule_key, unlocked_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(rule_key)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_achievements(&self, user_id: i64) -> DomainResult<Vec<AchievementRecord>> {
        let rows: Vec<AchievementRow> =
            sqlx::query_as("SELECT * FROM achievements WHERE user_id = ? ORDER BY unlocked_at")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(AchievementRecord::try_from).collect()
    }
}
