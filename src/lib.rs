//! Campus Match - recommendation and matching engine for a student
//! collaboration platform
//!
//! Scores pairs of student profiles on shared interests, academic
//! proximity, competency complementarity, semantic similarity and two-way
//! skill exchange, and blends them into ranked recommendation lists. It also
//! provides the toxicity gate and the French-speaking assistant that answers
//! group, mentor and skill-swap questions from the same pipelines.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    Assistant, Category, ContentModerator, IntentClassifier, ProfileEncoder, RecommendError, RecommendationOrchestrator,
    SkillSwapEngine,
};
pub use models::{Profile, ProfileRecord, RecommendationsResponse, ScoredCandidate, SwapDetail};
pub use services::{InMemoryProfileStore, PostgresProfileStore, ProfileStore};
