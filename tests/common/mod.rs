//! Shared fixtures: in-memory store setup and scripted port implementations.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::SqlitePool;

use leettrack::adapters::sqlite::{
    all_embedded_migrations, create_test_pool, Migrator, SqliteProgressStore,
};
use leettrack::domain::errors::{DomainError, DomainResult};
use leettrack::domain::ports::{
    ActivitySource, AggregateStats, Notifier, ProblemInfo, Profile, ProgressStore,
    SkillBreakdown, Suggester, SuggestionBatch,
};

/// Fresh in-memory store with migrations applied. The pool holds a single
/// connection so every statement sees the same database.
pub async fn setup_test_store() -> (SqlitePool, Arc<dyn ProgressStore>) {
    let pool = create_test_pool().await.expect("failed to create test pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .expect("failed to run migrations");
    let store: Arc<dyn ProgressStore> = Arc::new(SqliteProgressStore::new(pool.clone()));
    (pool, store)
}

/// Activity source scripted per test: recent slugs per username, a problem
/// catalog, and usernames whose requests fail transiently.
#[derive(Default)]
pub struct ScriptedActivitySource {
    pub recent: Mutex<HashMap<String, Vec<String>>>,
    pub problems: HashMap<String, ProblemInfo>,
    pub profiles: HashMap<String, Profile>,
    pub failing_usernames: HashSet<String>,
}

impl ScriptedActivitySource {
    pub fn with_recent(username: &str, slugs: &[&str]) -> Self {
        let source = Self::default();
        source.set_recent(username, slugs);
        source
    }

    pub fn set_recent(&self, username: &str, slugs: &[&str]) {
        self.recent.lock().unwrap().insert(
            username.to_string(),
            slugs.iter().map(|s| (*s).to_string()).collect(),
        );
    }

    pub fn add_problem(mut self, info: ProblemInfo) -> Self {
        self.problems.insert(info.slug.clone(), info);
        self
    }

    pub fn failing_for(mut self, username: &str) -> Self {
        self.failing_usernames.insert(username.to_string());
        self
    }

    fn check_failure(&self, username: &str) -> DomainResult<()> {
        if self.failing_usernames.contains(username) {
            return Err(DomainError::Upstream("scripted network failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivitySource for ScriptedActivitySource {
    async fn fetch_profile(&self, username: &str) -> DomainResult<Option<Profile>> {
        self.check_failure(username)?;
        Ok(self.profiles.get(username).cloned())
    }

    async fn fetch_recent_slugs(&self, username: &str, limit: u32) -> DomainResult<Vec<String>> {
        self.check_failure(username)?;
        let mut slugs = self
            .recent
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_default();
        slugs.truncate(limit as usize);
        Ok(slugs)
    }

    async fn fetch_solved_stats(&self, username: &str) -> DomainResult<AggregateStats> {
        self.check_failure(username)?;
        Ok(self
            .profiles
            .get(username)
            .map(|p| p.stats)
            .unwrap_or_default())
    }

    async fn fetch_skill_breakdown(&self, username: &str) -> DomainResult<SkillBreakdown> {
        self.check_failure(username)?;
        Ok(SkillBreakdown::default())
    }

    async fn validate_problem(&self, slug: &str) -> DomainResult<Option<ProblemInfo>> {
        Ok(self.problems.get(slug).cloned())
    }
}

/// Notifier that records every message for assertions.
#[derive(Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl CollectingNotifier {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for CollectingNotifier {
    async fn notify(&self, handle: &str, text: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((handle.to_string(), text.to_string()));
    }
}

/// Notifier whose deliveries block until the test hands out a permit,
/// so a test can hold the loop mid-delivery and observe what happens next.
pub struct GatedNotifier {
    permits: tokio::sync::Semaphore,
    entered: tokio::sync::Notify,
    messages: Mutex<Vec<(String, String)>>,
}

impl Default for GatedNotifier {
    fn default() -> Self {
        Self {
            permits: tokio::sync::Semaphore::new(0),
            entered: tokio::sync::Notify::new(),
            messages: Mutex::new(Vec::new()),
        }
    }
}

impl GatedNotifier {
    /// Resolves once a delivery is in flight and waiting on a permit.
    pub async fn delivery_started(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self, count: usize) {
        self.permits.add_permits(count);
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for GatedNotifier {
    async fn notify(&self, handle: &str, text: &str) {
        self.entered.notify_one();
        let permit = self.permits.acquire().await.expect("semaphore closed");
        permit.forget();
        self.messages
            .lock()
            .unwrap()
            .push((handle.to_string(), text.to_string()));
    }
}

/// Suggester that returns a fixed batch.
pub struct FixedSuggester {
    pub batch: SuggestionBatch,
}

#[async_trait]
impl Suggester for FixedSuggester {
    async fn propose(
        &self,
        _stats: &AggregateStats,
        _breakdown: &SkillBreakdown,
        _excluded_slugs: &[String],
    ) -> DomainResult<SuggestionBatch> {
        Ok(self.batch.clone())
    }
}
