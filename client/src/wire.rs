//! Request and response bodies for the backend JSON API.
//!
//! Request types borrow from the caller; nothing here owns the API key.

use serde::{Deserialize, Serialize};

use ragna_types::{Difficulty, Language, Message, Topic};

#[derive(Debug, Serialize)]
pub(crate) struct ValidateKeyRequest<'a> {
    pub api_key: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProblemHintRequest<'a> {
    pub api_key: &'a str,
    pub problem: &'a str,
}

/// Also used for pattern recognition, which shares the review request shape.
#[derive(Debug, Serialize)]
pub(crate) struct CodeReviewRequest<'a> {
    pub api_key: &'a str,
    pub code: &'a str,
    pub language: Language,
    pub problem_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudyPlanRequest<'a> {
    pub api_key: &'a str,
    pub topics: &'a [Topic],
    pub duration_weeks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TopicProblemsRequest<'a> {
    pub api_key: &'a str,
    pub topic: Topic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub messages: &'a [Message],
    pub api_key: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HintResponse {
    pub hints: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewResponse {
    pub review: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudyPlanResponse {
    pub study_plan: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationsResponse {
    pub recommendations: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PatternResponse {
    pub pattern_analysis: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyChallengeResponse {
    pub daily_challenge: String,
}
