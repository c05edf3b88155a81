//! External activity source port (the problem catalog / submission history).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::Difficulty;

/// Accepted-submission counts by difficulty for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: u32,
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

/// A user's public profile on the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub stats: AggregateStats,
}

/// Problems solved under one skill tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag_name: String,
    pub problems_solved: u32,
}

/// Per-tag solve counts grouped by the catalog's skill tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBreakdown {
    pub fundamental: Vec<TagCount>,
    pub intermediate: Vec<TagCount>,
    pub advanced: Vec<TagCount>,
}

/// Authoritative metadata for one validated problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemInfo {
    pub slug: String,
    pub title: String,
    /// `None` when the catalog reports a difficulty outside Easy/Medium/Hard.
    pub difficulty: Option<Difficulty>,
    pub tags: Vec<String>,
}

/// Read-only client for the external problem catalog.
///
/// `Ok(None)` means business-level absence (unknown username or slug);
/// `Err(Upstream)` is a transient failure, retried only at the next sweep.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Look up a user's profile; `None` when the username does not exist.
    async fn fetch_profile(&self, username: &str) -> DomainResult<Option<Profile>>;

    /// The user's most recent accepted-submission slugs, newest first, at most
    /// `limit` entries. Not guaranteed sorted or deduplicated; callers treat
    /// the result as a set.
    async fn fetch_recent_slugs(&self, username: &str, limit: u32) -> DomainResult<Vec<String>>;

    /// Aggregate accepted-submission counts by difficulty.
    async fn fetch_solved_stats(&self, username: &str) -> DomainResult<AggregateStats>;

    /// Per-skill-tag solve counts.
    async fn fetch_skill_breakdown(&self, username: &str) -> DomainResult<SkillBreakdown>;

    /// Confirm a slug denotes a real problem and return its authoritative
    /// metadata; `None` when the slug is unknown.
    async fn validate_problem(&self, slug: &str) -> DomainResult<Option<ProblemInfo>>;
}
