//! Wire models for the LeetCode GraphQL API.

use serde::{Deserialize, Serialize};

/// Request envelope for a GraphQL query.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: serde_json::Value,
}

/// Response envelope. `data` is absent or null when the query failed.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct MatchedUserData<T> {
    #[serde(rename = "matchedUser")]
    pub matched_user: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUser {
    pub username: String,
    #[serde(rename = "submitStatsGlobal")]
    pub submit_stats_global: SubmitStats,
}

#[derive(Debug, Deserialize)]
pub struct SubmitStats {
    #[serde(rename = "acSubmissionNum")]
    pub ac_submission_num: Vec<DifficultyCount>,
}

#[derive(Debug, Deserialize)]
pub struct DifficultyCount {
    pub difficulty: String,
    pub count: u32,
}

#[derive(Debug, Deserialize)]
pub struct RecentSubmissionsData {
    #[serde(rename = "recentAcSubmissionList", default)]
    pub recent_ac_submission_list: Option<Vec<RecentSubmission>>,
}

#[derive(Debug, Deserialize)]
pub struct RecentSubmission {
    #[serde(rename = "titleSlug")]
    pub title_slug: String,
}

#[derive(Debug, Deserialize)]
pub struct SkillStatsUser {
    #[serde(rename = "tagProblemCounts")]
    pub tag_problem_counts: Option<TagProblemCounts>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TagProblemCounts {
    #[serde(default)]
    pub fundamental: Vec<WireTagCount>,
    #[serde(default)]
    pub intermediate: Vec<WireTagCount>,
    #[serde(default)]
    pub advanced: Vec<WireTagCount>,
}

#[derive(Debug, Deserialize)]
pub struct WireTagCount {
    #[serde(rename = "tagName")]
    pub tag_name: String,
    #[serde(rename = "problemsSolved")]
    pub problems_solved: u32,
}

#[derive(Debug, Deserialize)]
pub struct QuestionData {
    pub question: Option<WireQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct WireQuestion {
    #[serde(rename = "titleSlug")]
    pub title_slug: String,
    pub title: String,
    pub difficulty: String,
    #[serde(rename = "topicTags", default)]
    pub topic_tags: Vec<TopicTag>,
}

#[derive(Debug, Deserialize)]
pub struct TopicTag {
    pub name: String,
}
