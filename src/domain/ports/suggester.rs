//! Generative suggestion collaborator port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::ports::activity::{AggregateStats, SkillBreakdown};

/// One raw candidate problem from the generative collaborator. The difficulty
/// and category are hints only; the validation pipeline prefers the catalog's
/// authoritative metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCandidate {
    pub slug: String,
    pub difficulty: Option<String>,
    pub category: Option<String>,
}

/// The collaborator's full response for one suggestion round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionBatch {
    pub analysis: String,
    pub candidates: Vec<SuggestionCandidate>,
}

/// Proposes candidate practice problems from a user's profile.
///
/// Malformed output is reported as an empty batch, never as an error.
#[async_trait]
pub trait Suggester: Send + Sync {
    async fn propose(
        &self,
        stats: &AggregateStats,
        breakdown: &SkillBreakdown,
        excluded_slugs: &[String],
    ) -> DomainResult<SuggestionBatch>;
}
