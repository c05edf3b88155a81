//! OpenAI-backed suggestion collaborator.
//!
//! Calls the Chat Completions endpoint with a JSON response format and parses
//! the reply into a SuggestionBatch. Unusable model output degrades to an
//! empty batch; only transport failures surface as errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::OpenAiConfig;
use crate::domain::ports::{
    AggregateStats, SkillBreakdown, Suggester, SuggestionBatch, SuggestionCandidate,
};

const SYSTEM_PROMPT: &str = r#"You are a coding interview coach. You analyze a user's LeetCode profile and recommend specific problems to work on to improve their weak areas.

Always respond with valid JSON in the following format:
{
  "analysis": "Brief analysis of the user's strengths and weaknesses",
  "tasks": [
    {"titleSlug": "two-sum", "difficulty": "Easy", "category": "Array"},
    {"titleSlug": "add-two-numbers", "difficulty": "Medium", "category": "Linked List"},
    {"titleSlug": "longest-substring-without-repeating-characters", "difficulty": "Medium", "category": "Sliding Window"}
  ]
}

Rules:
- Suggest exactly 3 problems.
- Each problem must be a real LeetCode problem with a valid titleSlug.
- Don't suggest problems the user has already solved.
- Focus on weak areas: categories where the user has solved fewer problems.
- Mix difficulties appropriately for the user's level."#;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// The JSON contract the model is prompted to produce.
#[derive(Debug, Deserialize)]
struct ModelReply {
    #[serde(default)]
    analysis: String,
    #[serde(default)]
    tasks: Vec<ModelTask>,
}

#[derive(Debug, Deserialize)]
struct ModelTask {
    #[serde(rename = "titleSlug")]
    title_slug: String,
    difficulty: Option<String>,
    category: Option<String>,
}

/// Chat-completion implementation of the Suggester port.
pub struct OpenAiSuggester {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiSuggester {
    pub fn new(config: OpenAiConfig) -> DomainResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DomainError::Upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn api_key(&self) -> DomainResult<String> {
        if !self.config.api_key.is_empty() {
            return Ok(self.config.api_key.clone());
        }
        std::env::var("OPENAI_API_KEY").map_err(|_| {
            DomainError::Upstream(
                "OpenAI API key not set; configure openai.api_key or OPENAI_API_KEY".to_string(),
            )
        })
    }

    fn user_prompt(
        stats: &AggregateStats,
        breakdown: &SkillBreakdown,
        excluded_slugs: &[String],
    ) -> String {
        let mut excluded: Vec<&str> = excluded_slugs.iter().map(String::as_str).collect();
        excluded.sort_unstable();
        format!(
            "User's solved problems by difficulty:\n{}\n\n\
             User's skill tag breakdown:\n{}\n\n\
             Already assigned/completed problem slugs (do NOT suggest these):\n{}\n\n\
             Analyze this profile, identify 2-3 weak areas, and suggest exactly 3 \
             specific LeetCode problems to work on. Return valid JSON.",
            serde_json::to_string_pretty(stats).unwrap_or_default(),
            serde_json::to_string_pretty(breakdown).unwrap_or_default(),
            serde_json::to_string(&excluded).unwrap_or_default(),
        )
    }

    /// Parse the model's JSON reply. Anything unusable becomes an empty batch.
    fn parse_reply(content: &str) -> SuggestionBatch {
        match serde_json::from_str::<ModelReply>(content) {
            Ok(reply) => SuggestionBatch {
                analysis: reply.analysis,
                candidates: reply
                    .tasks
                    .into_iter()
                    .map(|t| SuggestionCandidate {
                        slug: t.title_slug,
                        difficulty: t.difficulty,
                        category: t.category,
                    })
                    .collect(),
            },
            Err(err) => {
                tracing::warn!(%err, "failed to parse suggestion reply, treating as empty");
                SuggestionBatch::default()
            }
        }
    }
}

#[async_trait]
impl Suggester for OpenAiSuggester {
    async fn propose(
        &self,
        stats: &AggregateStats,
        breakdown: &SkillBreakdown,
        excluded_slugs: &[String],
    ) -> DomainResult<SuggestionBatch> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::user_prompt(stats, breakdown, excluded_slugs),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.7,
        };

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Upstream(format!("OpenAI request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Upstream(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let response: ChatResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Upstream(format!("OpenAI response parse failed: {e}")))?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        Ok(Self::parse_reply(content))
    }
}
