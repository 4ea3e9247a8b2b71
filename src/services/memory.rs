use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{Group, Profile, ProfileRecord, RoleFilter};
use crate::services::store::{ProfileStore, StoreError};

/// Seed file layout: `{ "profiles": [...], "groups": [...] }`
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// Profile store held in memory, for tests and database-less deployments
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<Vec<Profile>>>,
    groups: Arc<RwLock<Vec<Group>>>,
}

impl InMemoryProfileStore {
    pub fn new(profiles: Vec<Profile>, groups: Vec<Group>) -> Self {
        Self {
            profiles: Arc::new(RwLock::new(profiles)),
            groups: Arc::new(RwLock::new(groups)),
        }
    }

    pub fn from_records(records: Vec<ProfileRecord>, groups: Vec<Group>) -> Self {
        Self::new(records.into_iter().map(Profile::from_record).collect(), groups)
    }

    /// Load a JSON seed file
    pub async fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let seed: Seed = serde_json::from_str(&raw)?;

        tracing::info!(
            "Loaded seed {} ({} profiles, {} groups)",
            path.as_ref().display(),
            seed.profiles.len(),
            seed.groups.len()
        );

        Ok(Self::from_records(seed.profiles, seed.groups))
    }

    /// Insert or replace a profile
    pub async fn upsert(&self, profile: Profile) {
        let mut profiles = self.profiles.write().await;
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => profiles.push(profile),
        }
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.id == user_id)
            .cloned())
    }

    async fn list_candidates(&self, filter: &RoleFilter) -> Result<Vec<Profile>, StoreError> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .filter(|p| filter.accepts(&p.roles))
            .cloned()
            .collect())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.groups.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn record(id: i64, roles: &[&str]) -> ProfileRecord {
        ProfileRecord {
            id,
            first_name: format!("First{}", id),
            last_name: format!("Last{}", id),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_role_filtered_listing() {
        let store = InMemoryProfileStore::from_records(
            vec![
                record(1, &["student"]),
                record(2, &["mentor"]),
                record(3, &["teacher", "mentor"]),
            ],
            vec![],
        );

        let mentors = store
            .list_candidates(&RoleFilter::AnyOf(vec![Role::Mentor, Role::Teacher]))
            .await
            .unwrap();
        let ids: Vec<i64> = mentors.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);

        assert_eq!(store.list_candidates(&RoleFilter::Any).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_and_upsert() {
        let store = InMemoryProfileStore::default();
        assert!(store.get_profile(1).await.unwrap().is_none());

        store.upsert(Profile::from_record(record(1, &["student"]))).await;
        store.upsert(Profile::from_record(record(1, &["mentor"]))).await;

        assert_eq!(store.len().await, 1);
        let profile = store.get_profile(1).await.unwrap().unwrap();
        assert_eq!(profile.roles, vec![Role::Mentor]);
    }

    #[test]
    fn test_seed_file_loading() {
        let missing = tokio_test::block_on(InMemoryProfileStore::from_seed_file("data/does-not-exist.json"));
        assert!(matches!(missing, Err(StoreError::SeedIo(_))));

        let store = tokio_test::block_on(InMemoryProfileStore::from_seed_file("data/seed.json")).unwrap();
        assert_eq!(tokio_test::block_on(store.len()), 6);
        assert_eq!(tokio_test::block_on(store.list_groups()).unwrap().len(), 3);
    }

    #[test]
    fn test_seed_parses_mixed_proficiency() {
        let seed: Seed = serde_json::from_str(
            r#"{
                "profiles": [{
                    "id": 1,
                    "first_name": "Yanis",
                    "roles": ["student"],
                    "program": "WMD",
                    "level": 2,
                    "competencies": [
                        {"name": "React", "level": "Intermédiaire"},
                        {"name": "CSS", "level": 4}
                    ]
                }],
                "groups": [{"id": 1, "name": "AI Club", "description": "", "interest": "IA"}]
            }"#,
        )
        .unwrap();

        let profile = Profile::from_record(seed.profiles[0].clone());
        assert_eq!(profile.competencies[0].level, 3);
        assert_eq!(profile.competencies[1].level, 4);
        assert_eq!(seed.groups[0].interest, "IA");
    }
}
