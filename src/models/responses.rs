use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::domain::{GroupMatch, Profile, Program, Role, ScoredCandidate};

/// Short view of the requesting user, echoed with recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i64,
    pub name: String,
    pub roles: Vec<Role>,
    pub program: Option<Program>,
    pub level: Option<u8>,
    pub interests: Vec<String>,
    pub competency_count: usize,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.display_name.clone(),
            roles: profile.roles.clone(),
            program: profile.program,
            level: profile.level,
            interests: profile.interests.clone(),
            competency_count: profile.competencies.len(),
        }
    }
}

/// A recommended user or a recommended group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecommendationItem {
    Profile(ScoredCandidate),
    Group(GroupMatch),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub count: usize,
    pub items: Vec<RecommendationItem>,
}

impl CategoryResult {
    pub fn from_candidates(candidates: Vec<ScoredCandidate>) -> Self {
        Self {
            count: candidates.len(),
            items: candidates.into_iter().map(RecommendationItem::Profile).collect(),
        }
    }

    pub fn from_groups(groups: Vec<GroupMatch>) -> Self {
        Self {
            count: groups.len(),
            items: groups.into_iter().map(RecommendationItem::Group).collect(),
        }
    }
}

/// Response for the recommendations endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub user_id: i64,
    pub user_profile: ProfileSummary,
    /// Keyed by category name
    pub recommendations: BTreeMap<String, CategoryResult>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub models: ModelStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelStatus {
    pub embedding: bool,
    pub toxicity: bool,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResponse {
    pub intent: String,
    pub confidence: f64,
}

/// Assistant answer to a chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub intent: String,
    pub confidence: f64,
    pub message: String,
    /// Listed groups or users; absent for intents that list nothing
    pub data: Option<Vec<RecommendationItem>>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentListResponse {
    pub intents: Vec<crate::core::intent::IntentDefinition>,
}
