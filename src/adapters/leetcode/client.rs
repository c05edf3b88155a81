//! LeetCode GraphQL client with rate limiting.
//!
//! Implements the ActivitySource port over LeetCode's public GraphQL
//! endpoint. A token-bucket rate limiter keeps the poller from hammering the
//! unauthenticated API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Difficulty, LeetCodeConfig};
use crate::domain::ports::{
    ActivitySource, AggregateStats, ProblemInfo, Profile, SkillBreakdown, TagCount,
};

use super::models::{
    GraphQlRequest, GraphQlResponse, MatchedUserData, ProfileUser, QuestionData,
    RecentSubmissionsData, SkillStatsUser,
};

const PROFILE_QUERY: &str = r"
query getUserProfile($username: String!) {
    matchedUser(username: $username) {
        username
        submitStatsGlobal {
            acSubmissionNum { difficulty count }
        }
    }
}";

const RECENT_SUBMISSIONS_QUERY: &str = r"
query recentAcSubmissions($username: String!, $limit: Int!) {
    recentAcSubmissionList(username: $username, limit: $limit) {
        titleSlug
    }
}";

const SKILL_STATS_QUERY: &str = r"
query skillStats($username: String!) {
    matchedUser(username: $username) {
        tagProblemCounts {
            advanced { tagName problemsSolved }
            intermediate { tagName problemsSolved }
            fundamental { tagName problemsSolved }
        }
    }
}";

const QUESTION_QUERY: &str = r"
query getQuestion($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        titleSlug
        title
        difficulty
        topicTags { name }
    }
}";

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. When the bucket is
/// exhausted, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets.
#[derive(Debug)]
struct RateLimiter {
    capacity: u32,
    tokens: u32,
    window: Duration,
    window_start: Instant,
}

impl RateLimiter {
    fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
        } else {
            let remaining = self.window.saturating_sub(elapsed);
            tracing::warn!(
                sleep_ms = remaining.as_millis() as u64,
                "LeetCode rate limit reached, sleeping"
            );
            tokio::time::sleep(remaining).await;
            self.tokens = self.capacity - 1;
            self.window_start = Instant::now();
        }
    }
}

/// HTTP client for the LeetCode GraphQL API.
#[derive(Debug, Clone)]
pub struct LeetCodeClient {
    http: Client,
    graphql_url: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl LeetCodeClient {
    pub fn new(config: &LeetCodeConfig) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Upstream(format!("failed to build HTTP client: {e}")))?;
        let rate_limiter = RateLimiter::new(config.rate_limit_per_minute, Duration::from_secs(60));
        Ok(Self {
            http,
            graphql_url: config.graphql_url.clone(),
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }

    /// Execute one GraphQL query and deserialize the `data` payload.
    async fn query<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
    ) -> DomainResult<T> {
        self.rate_limiter.lock().await.acquire().await;

        let request = GraphQlRequest { query, variables };
        let resp = self
            .http
            .post(&self.graphql_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Upstream(format!("LeetCode request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Upstream(format!(
                "LeetCode returned {status}: {body}"
            )));
        }

        let envelope: GraphQlResponse<T> = resp
            .json()
            .await
            .map_err(|e| DomainError::Upstream(format!("LeetCode response parse failed: {e}")))?;

        if let Some(errors) = &envelope.errors {
            tracing::debug!(?errors, "GraphQL reported errors");
        }

        envelope
            .data
            .ok_or_else(|| DomainError::Upstream("LeetCode response had no data".to_string()))
    }
}

#[async_trait]
impl ActivitySource for LeetCodeClient {
    async fn fetch_profile(&self, username: &str) -> DomainResult<Option<Profile>> {
        let data: MatchedUserData<ProfileUser> = self
            .query(PROFILE_QUERY, json!({ "username": username }))
            .await?;

        Ok(data.matched_user.map(|user| {
            let stats = stats_from_counts(&user.submit_stats_global.ac_submission_num);
            Profile {
                username: user.username,
                stats,
            }
        }))
    }

    async fn fetch_recent_slugs(&self, username: &str, limit: u32) -> DomainResult<Vec<String>> {
        let data: RecentSubmissionsData = self
            .query(
                RECENT_SUBMISSIONS_QUERY,
                json!({ "username": username, "limit": limit }),
            )
            .await?;

        Ok(data
            .recent_ac_submission_list
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.title_slug)
            .collect())
    }

    async fn fetch_solved_stats(&self, username: &str) -> DomainResult<AggregateStats> {
        let data: MatchedUserData<ProfileUser> = self
            .query(PROFILE_QUERY, json!({ "username": username }))
            .await?;

        Ok(data
            .matched_user
            .map(|user| stats_from_counts(&user.submit_stats_global.ac_submission_num))
            .unwrap_or_default())
    }

    async fn fetch_skill_breakdown(&self, username: &str) -> DomainResult<SkillBreakdown> {
        let data: MatchedUserData<SkillStatsUser> = self
            .query(SKILL_STATS_QUERY, json!({ "username": username }))
            .await?;

        let counts = data
            .matched_user
            .and_then(|u| u.tag_problem_counts)
            .unwrap_or_default();

        Ok(SkillBreakdown {
            fundamental: convert_tags(counts.fundamental),
            intermediate: convert_tags(counts.intermediate),
            advanced: convert_tags(counts.advanced),
        })
    }

    async fn validate_problem(&self, slug: &str) -> DomainResult<Option<ProblemInfo>> {
        let data: QuestionData = self
            .query(QUESTION_QUERY, json!({ "titleSlug": slug }))
            .await?;

        Ok(data.question.map(|q| ProblemInfo {
            slug: q.title_slug,
            title: q.title,
            difficulty: Difficulty::from_str(&q.difficulty),
            tags: q.topic_tags.into_iter().map(|t| t.name).collect(),
        }))
    }
}

fn stats_from_counts(counts: &[super::models::DifficultyCount]) -> AggregateStats {
    let mut stats = AggregateStats::default();
    for entry in counts {
        match entry.difficulty.as_str() {
            "All" => stats.total = entry.count,
            "Easy" => stats.easy = entry.count,
            "Medium" => stats.medium = entry.count,
            "Hard" => stats.hard = entry.count,
            _ => {}
        }
    }
    stats
}

fn convert_tags(tags: Vec<super::models::WireTagCount>) -> Vec<TagCount> {
    tags.into_iter()
        .map(|t| TagCount {
            tag_name: t.tag_name,
            problems_solved: t.problems_solved,
        })
        .collect()
}
