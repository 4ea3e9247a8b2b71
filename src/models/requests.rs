use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendationsQuery {
    #[serde(default = "default_category")]
    pub category: String,
    /// Falls back to the configured default when absent
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<u16>,
}

impl RecommendationsQuery {
    pub fn limit_or(&self, default_limit: u16) -> u16 {
        self.limit.unwrap_or(default_limit)
    }
}

fn default_category() -> String {
    "all".to_string()
}

/// Text submitted for moderation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModerateRequest {
    #[validate(length(min = 1, max = 10000))]
    pub text: String,
}

/// Message submitted to the assistant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IntentRequest {
    #[validate(length(min = 1, max = 2000))]
    #[serde(alias = "message")]
    pub text: String,
}

/// Chat message submitted to the assistant on behalf of a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 2000))]
    #[serde(alias = "message")]
    pub text: String,
}
