use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Group, Profile, RoleFilter};

/// Errors raised by profile stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Seed file error: {0}")]
    SeedIo(#[from] std::io::Error),

    #[error("Seed parse error: {0}")]
    SeedParse(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Read-only access to profile snapshots.
///
/// Results only need to be eventually consistent; scorers never rely on two
/// calls observing the same data.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile, `None` when the user does not exist
    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, StoreError>;

    /// Every profile holding an active role accepted by `filter`
    async fn list_candidates(&self, filter: &RoleFilter) -> Result<Vec<Profile>, StoreError>;

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
