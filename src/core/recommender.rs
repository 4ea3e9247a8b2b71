use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::core::compatibility::{self, CompatibilityReport};
use crate::core::encoder::ProfileEncoder;
use crate::core::moderator::{ContentModerator, ModerationVerdict};
use crate::core::similarity::{
    is_senior_same_program, missing_skills, rank_by_interests, rank_by_program_level, rank_cross_program,
    rank_mentors, rank_semantic, shared_labels,
};
use crate::core::skill_swap::{SkillMap, SkillSwapEngine};
use crate::models::{
    CategoryResult, Explanation, GroupMatch, MatchThresholds, MatchType, Profile, ProfileSummary,
    RecommendationsResponse, Role, RoleFilter, ScoredCandidate,
};
use crate::services::{ProfileStore, StoreError};

/// Errors surfaced to callers of the orchestrator
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(i64),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Recommendation category requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    StudyBuddies,
    Mentors,
    Collaborators,
    Semantic,
    Groups,
    SkillSwap,
    All,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::StudyBuddies => "study_buddies",
            Category::Mentors => "mentors",
            Category::Collaborators => "collaborators",
            Category::Semantic => "semantic",
            Category::Groups => "groups",
            Category::SkillSwap => "skill_swap",
            Category::All => "all",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "study_buddies" => Ok(Category::StudyBuddies),
            "mentors" => Ok(Category::Mentors),
            "collaborators" => Ok(Category::Collaborators),
            "semantic" => Ok(Category::Semantic),
            "groups" => Ok(Category::Groups),
            "skill_swap" => Ok(Category::SkillSwap),
            "all" => Ok(Category::All),
            _ => Err(RecommendError::InvalidCategory(s.to_string())),
        }
    }
}

/// Main recommendation orchestrator
///
/// For each category it gathers the candidate pool from the profile store,
/// runs the matching scorer, applies the category threshold, ranks and
/// truncates. Every public call is bounded by the request timeout.
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    store: Arc<dyn ProfileStore>,
    encoder: ProfileEncoder,
    moderator: ContentModerator,
    swap_engine: SkillSwapEngine,
    thresholds: MatchThresholds,
    timeout: Duration,
    embed_concurrency: usize,
}

/// In-flight embedding requests while encoding a candidate pool
pub const DEFAULT_EMBED_CONCURRENCY: usize = 8;

impl RecommendationOrchestrator {
    pub fn new(store: Arc<dyn ProfileStore>, encoder: ProfileEncoder, moderator: ContentModerator) -> Self {
        Self {
            store,
            encoder,
            moderator,
            swap_engine: SkillSwapEngine::default(),
            thresholds: MatchThresholds::default(),
            timeout: Duration::from_secs(30),
            embed_concurrency: DEFAULT_EMBED_CONCURRENCY,
        }
    }

    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_swap_engine(mut self, engine: SkillSwapEngine) -> Self {
        self.swap_engine = engine;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_embed_concurrency(mut self, concurrency: usize) -> Self {
        self.embed_concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    pub fn encoder(&self) -> &ProfileEncoder {
        &self.encoder
    }

    pub fn moderator(&self) -> &ContentModerator {
        &self.moderator
    }

    pub(crate) async fn bounded<T, F>(&self, fut: F) -> Result<T, RecommendError>
    where
        F: std::future::Future<Output = Result<T, RecommendError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| RecommendError::Timeout(self.timeout))?
    }

    pub(crate) async fn load_profile(&self, user_id: i64) -> Result<Profile, RecommendError> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or(RecommendError::ProfileNotFound(user_id))
    }

    /// Candidate pool for a role filter, never containing the target user
    async fn candidates(&self, filter: RoleFilter, exclude: i64) -> Result<Vec<Profile>, RecommendError> {
        let mut pool = self.store.list_candidates(&filter).await?;
        pool.retain(|p| p.id != exclude);
        Ok(pool)
    }

    /// Recommendations for one category, or for every category with `All`
    pub async fn get_recommendations(
        &self,
        user_id: i64,
        category: Category,
        limit: usize,
    ) -> Result<RecommendationsResponse, RecommendError> {
        self.bounded(self.recommend(user_id, category, limit)).await
    }

    async fn recommend(
        &self,
        user_id: i64,
        category: Category,
        limit: usize,
    ) -> Result<RecommendationsResponse, RecommendError> {
        let target = self.load_profile(user_id).await?;
        let mut recommendations = BTreeMap::new();

        match category {
            Category::All => {
                if target.has_role(Role::Student) {
                    recommendations.insert(
                        Category::StudyBuddies.to_string(),
                        CategoryResult::from_candidates(self.study_buddies(&target, limit / 2).await?),
                    );
                    recommendations.insert(
                        Category::Mentors.to_string(),
                        CategoryResult::from_candidates(self.mentors(&target, limit / 3).await?),
                    );
                }
                recommendations.insert(
                    Category::Collaborators.to_string(),
                    CategoryResult::from_candidates(self.collaborators(&target, limit / 3).await?),
                );
                recommendations.insert(
                    Category::Semantic.to_string(),
                    CategoryResult::from_candidates(self.semantic_matches(&target, limit / 4).await?),
                );
                recommendations.insert(
                    Category::Groups.to_string(),
                    CategoryResult::from_groups(self.groups(&target, limit / 2).await?),
                );
                recommendations.insert(
                    Category::SkillSwap.to_string(),
                    CategoryResult::from_candidates(self.skill_swap(&target, limit / 2).await?),
                );
            }
            Category::Groups => {
                recommendations.insert(
                    category.to_string(),
                    CategoryResult::from_groups(self.groups(&target, limit).await?),
                );
            }
            single => {
                let candidates = match single {
                    Category::StudyBuddies => self.study_buddies(&target, limit).await?,
                    Category::Mentors => self.mentors(&target, limit).await?,
                    Category::Collaborators => self.collaborators(&target, limit).await?,
                    Category::Semantic => self.semantic_matches(&target, limit).await?,
                    _ => self.skill_swap(&target, limit).await?,
                };
                recommendations.insert(single.to_string(), CategoryResult::from_candidates(candidates));
            }
        }

        tracing::info!(
            "Recommendations for user {} ({}): {}",
            user_id,
            category,
            recommendations
                .iter()
                .map(|(k, v)| format!("{}={}", k, v.count))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(RecommendationsResponse {
            user_id,
            user_profile: ProfileSummary::from(&target),
            recommendations,
        })
    }

    /// Two-phase study buddy search: same program and close level fill up
    /// to half the slots, shared interests fill the rest
    pub async fn study_buddies(&self, target: &Profile, limit: usize) -> Result<Vec<ScoredCandidate>, RecommendError> {
        let pool = self.candidates(RoleFilter::AnyOf(vec![Role::Student]), target.id).await?;
        let mut results = Vec::with_capacity(limit);
        let mut selected = HashSet::new();

        if target.program.is_some() && target.level.is_some() {
            for (idx, score) in rank_by_program_level(target, &pool).into_iter().take(limit / 2) {
                if score > self.thresholds.study_same_program {
                    let candidate = &pool[idx];
                    selected.insert(candidate.id);
                    results.push(ScoredCandidate {
                        candidate: candidate.clone(),
                        score,
                        match_type: MatchType::SameProgram,
                        explanation: academic_explanation(target, candidate),
                    });
                }
            }
        }

        for (idx, score) in rank_by_interests(target, &pool) {
            if results.len() >= limit {
                break;
            }
            let candidate = &pool[idx];
            if score > self.thresholds.study_interests && !selected.contains(&candidate.id) {
                selected.insert(candidate.id);
                results.push(ScoredCandidate {
                    candidate: candidate.clone(),
                    score,
                    match_type: MatchType::SharedInterests,
                    explanation: Explanation::SharedInterests {
                        shared: shared_labels(&target.interests, &candidate.interests),
                    },
                });
            }
        }

        results.truncate(limit);
        tracing::debug!("Study buddies for {}: {} of {} candidates", target.id, results.len(), pool.len());
        Ok(results)
    }

    /// Mentors and teachers ranked by the share of their skills the student
    /// lacks, with a bonus for seniors of the same program
    pub async fn mentors(&self, student: &Profile, limit: usize) -> Result<Vec<ScoredCandidate>, RecommendError> {
        let pool = self
            .candidates(RoleFilter::AnyOf(vec![Role::Mentor, Role::Teacher]), student.id)
            .await?;

        let mut results: Vec<ScoredCandidate> = rank_mentors(student, &pool)
            .into_iter()
            .filter(|(_, score)| *score > self.thresholds.mentor)
            .map(|(idx, score)| {
                let mentor = &pool[idx];
                let senior = is_senior_same_program(student, mentor);
                ScoredCandidate {
                    candidate: mentor.clone(),
                    score: if senior { score + self.thresholds.mentor_senior_bonus } else { score },
                    match_type: if senior {
                        MatchType::SeniorSameProgram
                    } else {
                        MatchType::SkillComplementarity
                    },
                    explanation: Explanation::Complementarity {
                        missing_skills: missing_skills(student, mentor),
                        senior_bonus: senior,
                    },
                }
            })
            .collect();

        // Re-rank on the bonus-adjusted score
        sort_candidates(&mut results);
        results.truncate(limit);
        Ok(results)
    }

    /// Students from other programs at a similar level
    pub async fn collaborators(&self, target: &Profile, limit: usize) -> Result<Vec<ScoredCandidate>, RecommendError> {
        if target.program.is_none() || target.level.is_none() {
            return Ok(Vec::new());
        }

        let pool = self.candidates(RoleFilter::AnyOf(vec![Role::Student]), target.id).await?;

        Ok(rank_cross_program(target, &pool)
            .into_iter()
            .filter(|(_, score)| *score > self.thresholds.collaborator)
            .take(limit)
            .map(|(idx, score)| ScoredCandidate {
                candidate: pool[idx].clone(),
                score,
                match_type: MatchType::Interdisciplinary,
                explanation: academic_explanation(target, &pool[idx]),
            })
            .collect())
    }

    /// Nearest profiles in embedding space; empty when the model is down
    pub async fn semantic_matches(&self, target: &Profile, limit: usize) -> Result<Vec<ScoredCandidate>, RecommendError> {
        let target_vector = self.encoder.encode(target).await;
        if target_vector.is_empty() {
            tracing::debug!("No embedding for user {}, skipping semantic matches", target.id);
            return Ok(Vec::new());
        }

        let pool = self.candidates(RoleFilter::Any, target.id).await?;
        let encoded: Vec<Arc<Vec<f32>>> = stream::iter(pool.iter())
            .map(|p| self.encoder.encode(p))
            .buffered(self.embed_concurrency)
            .collect()
            .await;
        let vectors: Vec<&[f32]> = encoded.iter().map(|v| v.as_slice()).collect();

        Ok(rank_semantic(&target_vector, &vectors)
            .into_iter()
            .filter(|(_, score)| *score > self.thresholds.semantic)
            .take(limit)
            .map(|(idx, cosine)| ScoredCandidate {
                candidate: pool[idx].clone(),
                score: cosine,
                match_type: MatchType::SemanticSimilarity,
                explanation: Explanation::Semantic { cosine },
            })
            .collect())
    }

    /// Groups whose interest is one of the user's interests
    pub async fn groups(&self, target: &Profile, limit: usize) -> Result<Vec<GroupMatch>, RecommendError> {
        let groups = self.store.list_groups().await?;

        Ok(groups
            .into_iter()
            .filter(|g| target.interests.contains(&g.interest))
            .take(limit)
            .map(|group| GroupMatch {
                group,
                score: 1.0,
                match_type: MatchType::InterestGroup,
            })
            .collect())
    }

    /// Partners with the most valuable two-way skill exchange
    pub async fn skill_swap(&self, requester: &Profile, limit: usize) -> Result<Vec<ScoredCandidate>, RecommendError> {
        let pool = self.candidates(RoleFilter::Any, requester.id).await?;
        let requester_skills = SkillMap::from_profile(requester);

        let mut results: Vec<ScoredCandidate> = pool
            .into_iter()
            .filter_map(|candidate| {
                let candidate_skills = SkillMap::from_profile(&candidate);
                let (score, detail) =
                    self.swap_engine
                        .score_swap(&requester_skills, &candidate_skills, requester, &candidate);
                (score > self.thresholds.skill_swap).then(|| ScoredCandidate {
                    candidate,
                    score,
                    match_type: MatchType::SkillSwap,
                    explanation: Explanation::SkillSwap(detail),
                })
            })
            .collect();

        sort_candidates(&mut results);
        results.truncate(limit);
        Ok(results)
    }

    /// Pairwise compatibility analysis of two users
    pub async fn score_compatibility(&self, user_a: i64, user_b: i64) -> Result<CompatibilityReport, RecommendError> {
        self.bounded(async {
            let (a, b) = tokio::try_join!(self.load_profile(user_a), self.load_profile(user_b))?;
            let (vector_a, vector_b) = tokio::join!(self.encoder.encode(&a), self.encoder.encode(&b));

            let report = compatibility::score_compatibility(&a, &b, &vector_a, &vector_b);
            tracing::info!("Compatibility {} <-> {}: {:.3}", user_a, user_b, report.score);
            Ok::<_, RecommendError>(report)
        })
        .await
    }

    pub async fn moderate(&self, text: &str) -> ModerationVerdict {
        self.moderator.moderate(text).await
    }
}

/// Stable descending sort on score
fn sort_candidates(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

fn academic_explanation(target: &Profile, candidate: &Profile) -> Explanation {
    Explanation::Academic {
        same_program: matches!((target.program, candidate.program), (Some(a), Some(b)) if a == b),
        level_gap: match (target.level, candidate.level) {
            (Some(a), Some(b)) => Some(a.abs_diff(b)),
            _ => None,
        },
    }
}
