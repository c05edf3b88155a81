//! Suggestion generation and validation pipeline.
//!
//! Drives the generative collaborator from a user's profile, then validates
//! each candidate against the external catalog before persisting it as a new
//! assignment. Candidates that fail validation are silently dropped.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AssignedTask, Difficulty};
use crate::domain::ports::{ActivitySource, ProgressStore, Suggester, SuggestionCandidate};

/// Most candidates considered per round.
const MAX_CANDIDATES: usize = 3;

/// Result of one suggestion round. `accepted` may be shorter than the
/// candidate list, including empty.
#[derive(Debug, Clone)]
pub struct SuggestionOutcome {
    pub analysis: String,
    pub accepted: Vec<AssignedTask>,
}

pub struct SuggestionService {
    store: Arc<dyn ProgressStore>,
    activity: Arc<dyn ActivitySource>,
    suggester: Arc<dyn Suggester>,
}

impl SuggestionService {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        activity: Arc<dyn ActivitySource>,
        suggester: Arc<dyn Suggester>,
    ) -> Self {
        Self {
            store,
            activity,
            suggester,
        }
    }

    /// Generate, validate, and persist up to three new assignments for one user.
    pub async fn suggest_for(&self, handle: &str) -> DomainResult<SuggestionOutcome> {
        let user = self
            .store
            .get_user(handle)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(handle.to_string()))?;
        let username = user.linked_username()?.to_string();

        let stats = self.activity.fetch_solved_stats(&username).await?;
        let breakdown = self.activity.fetch_skill_breakdown(&username).await?;

        // Slugs already assigned or completed steer generation away from
        // repeats; enforcement stays with the model, not the pipeline.
        let mut excluded: Vec<String> = Vec::new();
        for task in self.store.list_pending(user.id).await? {
            excluded.push(task.slug);
        }
        for task in self.store.list_completed(user.id).await? {
            excluded.push(task.slug);
        }

        let batch = self
            .suggester
            .propose(&stats, &breakdown, &excluded)
            .await?;

        let accepted = self.validate_and_persist(user.id, batch.candidates).await?;
        Ok(SuggestionOutcome {
            analysis: batch.analysis,
            accepted,
        })
    }

    /// Validate candidates in input order and persist the confirmed ones.
    ///
    /// The catalog's difficulty and first topic tag win over the candidate's
    /// hints; when the catalog has neither, the hint applies, then `Medium`
    /// and `"General"`. A candidate whose lookup returns nothing, or errors,
    /// is dropped without retry or substitution.
    async fn validate_and_persist(
        &self,
        user_id: i64,
        candidates: Vec<SuggestionCandidate>,
    ) -> DomainResult<Vec<AssignedTask>> {
        let mut accepted = Vec::new();

        for candidate in candidates.into_iter().take(MAX_CANDIDATES) {
            let problem = match self.activity.validate_problem(&candidate.slug).await {
                Ok(Some(problem)) => problem,
                Ok(None) => {
                    debug!(slug = %candidate.slug, "candidate slug unknown, dropped");
                    continue;
                }
                Err(err) => {
                    warn!(slug = %candidate.slug, %err, "candidate validation failed, dropped");
                    continue;
                }
            };

            let difficulty = problem
                .difficulty
                .or_else(|| candidate.difficulty.as_deref().and_then(Difficulty::from_str))
                .unwrap_or_default();
            let category = problem
                .tags
                .first()
                .cloned()
                .or(candidate.category)
                .unwrap_or_else(|| "General".to_string());

            let task = self
                .store
                .add_assignment(user_id, &problem.slug, difficulty, &category)
                .await?;
            accepted.push(task);
        }

        Ok(accepted)
    }
}
