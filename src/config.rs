use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::skill_swap::SwapWeights;
use crate::models::MatchThresholds;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    /// Absent means the service runs on the in-memory store
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub models: ModelSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub recommendations: RecommendationSettings,
    #[serde(default)]
    pub moderation: ModerationSettings,
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub fetch_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_seed_file")]
    pub seed_file: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            seed_file: default_seed_file(),
        }
    }
}

fn default_seed_file() -> String { "data/seed.json".to_string() }

/// Inference endpoints; an unset URL means the model is unavailable
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub embedding_url: Option<String>,
    pub toxicity_url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            embedding_url: None,
            toxicity_url: None,
            api_key: None,
            timeout_secs: default_model_timeout(),
        }
    }
}

fn default_model_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> u64 { 10_000 }
fn default_cache_ttl() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// In-flight embedding requests per semantic search
    #[serde(default = "default_embed_concurrency")]
    pub embed_concurrency: usize,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub skill_swap: SwapWeightsConfig,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            request_timeout_secs: default_request_timeout(),
            embed_concurrency: default_embed_concurrency(),
            thresholds: ThresholdsConfig::default(),
            skill_swap: SwapWeightsConfig::default(),
        }
    }
}

fn default_limit() -> u16 { 10 }
fn default_max_limit() -> u16 { 50 }
fn default_request_timeout() -> u64 { 30 }
fn default_embed_concurrency() -> usize { crate::core::DEFAULT_EMBED_CONCURRENCY }

/// Per-category minimum scores
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdsConfig {
    #[serde(default = "default_study_same_program")]
    pub study_same_program: f64,
    #[serde(default = "default_study_interests")]
    pub study_interests: f64,
    #[serde(default = "default_mentor")]
    pub mentor: f64,
    #[serde(default = "default_mentor_senior_bonus")]
    pub mentor_senior_bonus: f64,
    #[serde(default = "default_collaborator")]
    pub collaborator: f64,
    #[serde(default = "default_semantic")]
    pub semantic: f64,
    #[serde(default = "default_skill_swap")]
    pub skill_swap: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            study_same_program: default_study_same_program(),
            study_interests: default_study_interests(),
            mentor: default_mentor(),
            mentor_senior_bonus: default_mentor_senior_bonus(),
            collaborator: default_collaborator(),
            semantic: default_semantic(),
            skill_swap: default_skill_swap(),
        }
    }
}

fn default_study_same_program() -> f64 { 0.3 }
fn default_study_interests() -> f64 { 0.1 }
fn default_mentor() -> f64 { 0.0 }
fn default_mentor_senior_bonus() -> f64 { 0.2 }
fn default_collaborator() -> f64 { 0.3 }
fn default_semantic() -> f64 { 0.3 }
fn default_skill_swap() -> f64 { 0.0 }

impl From<&ThresholdsConfig> for MatchThresholds {
    fn from(config: &ThresholdsConfig) -> Self {
        Self {
            study_same_program: config.study_same_program,
            study_interests: config.study_interests,
            mentor: config.mentor,
            mentor_senior_bonus: config.mentor_senior_bonus,
            collaborator: config.collaborator,
            semantic: config.semantic,
            skill_swap: config.skill_swap,
        }
    }
}

/// Skill-swap sub-score weights
#[derive(Debug, Clone, Deserialize)]
pub struct SwapWeightsConfig {
    #[serde(default = "default_new_skill")]
    pub new_skill: f64,
    #[serde(default = "default_improve")]
    pub improve: f64,
    #[serde(default = "default_teach")]
    pub teach: f64,
    #[serde(default = "default_help_improve")]
    pub help_improve: f64,
    #[serde(default = "default_cross_program")]
    pub cross_program: f64,
    #[serde(default = "default_level_proximity")]
    pub level_proximity: f64,
    #[serde(default = "default_min_teaching_level")]
    pub min_teaching_level: u8,
}

impl Default for SwapWeightsConfig {
    fn default() -> Self {
        Self {
            new_skill: default_new_skill(),
            improve: default_improve(),
            teach: default_teach(),
            help_improve: default_help_improve(),
            cross_program: default_cross_program(),
            level_proximity: default_level_proximity(),
            min_teaching_level: default_min_teaching_level(),
        }
    }
}

fn default_new_skill() -> f64 { 2.0 }
fn default_improve() -> f64 { 1.0 }
fn default_teach() -> f64 { 0.5 }
fn default_help_improve() -> f64 { 0.3 }
fn default_cross_program() -> f64 { 0.5 }
fn default_level_proximity() -> f64 { 0.3 }
fn default_min_teaching_level() -> u8 { 2 }

impl From<&SwapWeightsConfig> for SwapWeights {
    fn from(config: &SwapWeightsConfig) -> Self {
        Self {
            new_skill: config.new_skill,
            improve_skill: config.improve,
            teach_skill: config.teach,
            help_improve: config.help_improve,
            cross_program: config.cross_program,
            level_proximity: config.level_proximity,
            min_teaching_level: config.min_teaching_level,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationSettings {
    #[serde(default = "default_toxic_label")]
    pub toxic_label: String,
    #[serde(default = "default_toxic_threshold")]
    pub threshold: f32,
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self {
            toxic_label: default_toxic_label(),
            threshold: default_toxic_threshold(),
        }
    }
}

fn default_toxic_label() -> String { "toxic".to_string() }
fn default_toxic_threshold() -> f32 { 0.7 }

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_intent_threshold")]
    pub intent_threshold: f64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            intent_threshold: default_intent_threshold(),
        }
    }
}

fn default_intent_threshold() -> f64 { 0.5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl LoggingSettings {
    /// Apply `LOG_LEVEL` / `LOG_FORMAT` style overrides; empty values are ignored
    pub fn with_overrides(mut self, level: Option<String>, format: Option<String>) -> Self {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
        if let Some(format) = format.filter(|f| !f.trim().is_empty()) {
            self.format = format;
        }
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CAMPUS__)
    /// 5. DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CAMPUS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CAMPUS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_database_url(settings)?.try_deserialize()
    }
}

/// DATABASE_URL, when set, wins over any configured database url
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        _ => Ok(settings),
    }
}
