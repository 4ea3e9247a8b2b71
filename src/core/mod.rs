// Core algorithm exports
pub mod assistant;
pub mod compatibility;
pub mod encoder;
pub mod intent;
pub mod moderator;
pub mod proficiency;
pub mod recommender;
pub mod similarity;
pub mod skill_swap;

pub use assistant::Assistant;
pub use compatibility::{score_compatibility, CompatibilityLevel, CompatibilityReport, CompatibilityUsers};
pub use encoder::ProfileEncoder;
pub use intent::{default_intents, IntentClassifier, IntentDefinition, IntentMatch};
pub use moderator::{ContentModerator, ModerationAction, ModerationVerdict};
pub use proficiency::normalize_proficiency;
pub use recommender::{Category, RecommendError, RecommendationOrchestrator, DEFAULT_EMBED_CONCURRENCY};
pub use similarity::{cosine_similarity, jaccard, Ranking};
pub use skill_swap::{SkillMap, SkillSwapEngine, SwapWeights};
