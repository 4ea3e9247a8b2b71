// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Competency, CompetencyRecord, Explanation, Group, GroupMatch, MatchThresholds, MatchType, Profile,
    ProfileRecord, Program, RawProficiency, Role, RoleFilter, ScoredCandidate, SkillEntry, SwapDetail,
};
pub use requests::{ChatRequest, IntentRequest, ModerateRequest, RecommendationsQuery};
pub use responses::{
    AssistantReply, CategoryResult, ErrorResponse, HealthResponse, IntentListResponse, IntentResponse, ModelStatus,
    ProfileSummary, RecommendationItem, RecommendationsResponse,
};
