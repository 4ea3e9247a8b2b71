use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// In-memory embedding cache keyed by the serialized profile text.
///
/// Profiles change rarely and stale vectors are acceptable to the scorers,
/// so entries simply expire after the configured TTL.
#[derive(Clone)]
pub struct EmbeddingCache {
    entries: Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { entries }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<f32>>> {
        let hit = self.entries.get(key).await;
        if hit.is_some() {
            tracing::trace!("Embedding cache hit ({} chars)", key.len());
        }
        hit
    }

    /// Store a vector. Empty vectors mean "no embedding" and are never cached,
    /// so a model outage does not outlive the outage itself.
    pub async fn insert(&self, key: String, vector: Arc<Vec<f32>>) {
        if vector.is_empty() {
            return;
        }
        self.entries.insert(key, vector).await;
    }
}
