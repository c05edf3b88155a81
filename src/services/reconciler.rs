//! Background reconciliation loop.
//!
//! Periodically sweeps every user with pending work, matches their recent
//! accepted submissions against pending assignments, marks completions, and
//! evaluates the achievement catalog. One user's failure never aborts the
//! sweep; the next sweep is the only retry.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{TrackerConfig, User};
use crate::domain::ports::{ActivitySource, Notifier, ProgressStore};
use crate::services::achievements;

/// Outcome of one sweep, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Users enumerated for this sweep.
    pub users_checked: usize,
    /// Users whose processing failed and was deferred to the next sweep.
    pub users_failed: usize,
    /// Tasks newly marked completed.
    pub tasks_completed: usize,
    /// Achievements newly unlocked.
    pub achievements_unlocked: usize,
}

/// Handle to stop a running reconciler.
///
/// Stop is observed at the sleep point between sweeps; a sweep in progress
/// finishes its current per-task commit before the loop exits.
#[derive(Debug, Clone)]
pub struct ReconcilerHandle {
    stop_flag: Arc<AtomicBool>,
    stop_notify: Arc<Notify>,
}

impl ReconcilerHandle {
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        // The stored permit wakes the loop out of its sleep even when stop
        // is requested before the loop reaches the select point.
        self.stop_notify.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }
}

/// The reconciliation loop.
pub struct Reconciler {
    store: Arc<dyn ProgressStore>,
    activity: Arc<dyn ActivitySource>,
    notifier: Arc<dyn Notifier>,
    config: TrackerConfig,
    stop_flag: Arc<AtomicBool>,
    stop_notify: Arc<Notify>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        activity: Arc<dyn ActivitySource>,
        notifier: Arc<dyn Notifier>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            store,
            activity,
            notifier,
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            stop_notify: Arc::new(Notify::new()),
        }
    }

    pub fn handle(&self) -> ReconcilerHandle {
        ReconcilerHandle {
            stop_flag: self.stop_flag.clone(),
            stop_notify: self.stop_notify.clone(),
        }
    }

    /// Run until stopped. Alternates between one sweep and one interval sleep;
    /// the tick is the cancellation point.
    pub async fn run(self) {
        info!(
            interval_secs = self.config.interval_secs,
            lookback = self.config.lookback_limit,
            "reconciler started"
        );

        let mut timer = interval(Duration::from_secs(self.config.interval_secs));
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; sweep on startup, then every period.
        // The sleep between sweeps is the only cancellation point: a stop
        // requested mid-sweep lets the current per-task commit (completion
        // plus achievement evaluation) finish before the loop exits here.
        loop {
            tokio::select! {
                _ = timer.tick() => {}
                () = self.stop_notify.notified() => break,
            }
            if self.stop_flag.load(Ordering::Acquire) {
                break;
            }

            match self.sweep().await {
                Ok(report) => debug!(?report, "sweep finished"),
                Err(err) => warn!(%err, "sweep could not enumerate users"),
            }

            if self.stop_flag.load(Ordering::Acquire) {
                break;
            }
        }

        info!("reconciler stopped");
    }

    /// One full pass over all users with pending work.
    ///
    /// Failure to enumerate users is the only error this returns; per-user
    /// failures are contained and counted in the report.
    pub async fn sweep(&self) -> DomainResult<SweepReport> {
        let users = self.store.list_users_with_pending_work().await?;
        let mut report = SweepReport {
            users_checked: users.len(),
            ..SweepReport::default()
        };

        for user in &users {
            match self.check_user(user).await {
                Ok((completed, unlocked)) => {
                    report.tasks_completed += completed;
                    report.achievements_unlocked += unlocked;
                }
                Err(err) => {
                    report.users_failed += 1;
                    warn!(handle = %user.handle, %err, "failed to check user, will retry next sweep");
                }
            }
            // Cooperative pause between users to respect upstream rate limits.
            if self.config.user_pause_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.user_pause_ms)).await;
            }
        }

        Ok(report)
    }

    /// Process one user: fetch recent slugs, match pending tasks, commit each
    /// completion with its achievement evaluation and notifications as one
    /// step before moving on.
    async fn check_user(&self, user: &User) -> DomainResult<(usize, usize)> {
        let username = user.linked_username()?;

        // The upstream list is neither sorted nor deduplicated; treat it as a set.
        let recent: HashSet<String> = self
            .activity
            .fetch_recent_slugs(username, self.config.lookback_limit)
            .await?
            .into_iter()
            .collect();

        let pending = self.store.list_pending(user.id).await?;
        let mut completed = 0;
        let mut unlocked = 0;
        // Slugs marked earlier in this sweep are no longer pending; a slug
        // that matches several pending tasks completes only the first in
        // assignment order.
        let mut marked: HashSet<&str> = HashSet::new();

        for task in &pending {
            if !recent.contains(&task.slug) || marked.contains(task.slug.as_str()) {
                continue;
            }
            marked.insert(task.slug.as_str());

            self.store.mark_completed(task.id, Utc::now()).await?;
            completed += 1;
            info!(handle = %user.handle, slug = %task.slug, "task completed");

            self.notifier
                .notify(
                    &user.handle,
                    &format!(
                        "Congrats! You completed {} [{}] 🎉",
                        task.slug,
                        task.difficulty.as_str()
                    ),
                )
                .await;

            let newly_unlocked = achievements::evaluate_all(&self.store, user.id).await?;
            unlocked += newly_unlocked.len();
            for rule in newly_unlocked {
                self.notifier
                    .notify(
                        &user.handle,
                        &format!("🏆 Achievement Unlocked: {}\n{}", rule.name, rule.description),
                    )
                    .await;
            }
        }

        Ok((completed, unlocked))
    }
}
