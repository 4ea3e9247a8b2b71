use std::sync::Arc;

use crate::models::Profile;
use crate::services::{EmbeddingCache, EmbeddingModel};

/// Turns profiles into dense vectors through an external embedding model.
///
/// Never fails: a missing model or a failed call yields an empty vector,
/// which callers must treat as "no embedding".
#[derive(Clone)]
pub struct ProfileEncoder {
    model: Option<Arc<dyn EmbeddingModel>>,
    cache: Option<EmbeddingCache>,
}

impl ProfileEncoder {
    pub fn new(model: Option<Arc<dyn EmbeddingModel>>) -> Self {
        Self { model, cache: None }
    }

    /// Encoder with no model behind it; every profile encodes to `[]`
    pub fn unavailable() -> Self {
        Self::new(None)
    }

    pub fn with_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Deterministic text form of a profile fed to the model
    pub fn profile_text(profile: &Profile) -> String {
        let mut text = format!("{} ", profile.display_name);

        if !profile.roles.is_empty() {
            let roles: Vec<&str> = profile.roles.iter().map(|r| r.as_str()).collect();
            text.push_str(&format!("Roles: {} ", roles.join(" ")));
        }
        if let Some(program) = profile.program {
            text.push_str(&format!("Program: {} ", program));
        }
        if let Some(level) = profile.level {
            text.push_str(&format!("Year: {} ", level));
        }
        text.push_str(&format!("Interests: {} ", profile.interests.join(" ")));
        text.push_str(&format!("Skills: {}", profile.competency_names().join(" ")));

        text
    }

    pub async fn encode(&self, profile: &Profile) -> Arc<Vec<f32>> {
        self.encode_text(Self::profile_text(profile)).await
    }

    /// Embed arbitrary text with the same degradation rules as profiles
    pub async fn encode_text(&self, text: String) -> Arc<Vec<f32>> {
        let Some(model) = &self.model else {
            return Arc::new(Vec::new());
        };

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&text).await {
                return hit;
            }
        }

        let vector = match model.embed(&text).await {
            Ok(v) if v.iter().all(|x| x.is_finite()) => Arc::new(v),
            Ok(_) => {
                tracing::warn!("Embedding model returned non-finite values, ignoring vector");
                Arc::new(Vec::new())
            }
            Err(e) => {
                tracing::warn!("Embedding model unavailable: {}", e);
                Arc::new(Vec::new())
            }
        };

        if let Some(cache) = &self.cache {
            cache.insert(text, vector.clone()).await;
        }

        vector
    }
}
