use serde::{Deserialize, Serialize};

use crate::core::similarity::{cosine_similarity, jaccard, shared_labels};
use crate::models::{Profile, ProfileSummary, Role};

const SEMANTIC_WEIGHT: f64 = 0.3;
const INTEREST_WEIGHT: f64 = 0.25;
const ACADEMIC_WEIGHT: f64 = 0.2;
const ROLE_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityFactor {
    pub factor: String,
    pub score: f64,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_interests: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub score: f64,
    pub level: CompatibilityLevel,
    pub factors: Vec<CompatibilityFactor>,
    pub narrative: Vec<String>,
    pub users: CompatibilityUsers,
}

/// The two profiles the report compares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityUsers {
    pub user_a: ProfileSummary,
    pub user_b: ProfileSummary,
}

/// Academic proximity: program part (same 0.6, different 0.3) plus level
/// part (0.4 / 0.3 / 0.1 for a distance of 0 / 1 / 2)
pub fn academic_compatibility(a: &Profile, b: &Profile) -> f64 {
    let mut score = 0.0;

    if let (Some(pa), Some(pb)) = (a.program, b.program) {
        score += if pa == pb { 0.6 } else { 0.3 };
    }

    if let (Some(la), Some(lb)) = (a.level, b.level) {
        score += match la.abs_diff(lb) {
            0 => 0.4,
            1 => 0.3,
            2 => 0.1,
            _ => 0.0,
        };
    }

    score
}

pub fn role_compatibility(a: &Profile, b: &Profile) -> f64 {
    let student_mentor = |x: &Profile, y: &Profile| x.has_role(Role::Student) && y.has_role(Role::Mentor);

    if student_mentor(a, b) || student_mentor(b, a) {
        0.9
    } else if a.has_role(Role::Student) && b.has_role(Role::Student) {
        0.7
    } else {
        0.5
    }
}

/// Blend semantic, interest, academic and role signals for a pair of users.
///
/// Vectors may be empty, in which case the semantic factor is omitted.
pub fn score_compatibility(a: &Profile, b: &Profile, vector_a: &[f32], vector_b: &[f32]) -> CompatibilityReport {
    let mut score = 0.0;
    let mut factors = Vec::with_capacity(4);

    if let Some(cosine) = cosine_similarity(vector_a, vector_b) {
        let cosine = cosine.max(0.0);
        score += cosine * SEMANTIC_WEIGHT;
        factors.push(CompatibilityFactor {
            factor: "semantic_similarity".to_string(),
            score: cosine,
            weight: SEMANTIC_WEIGHT,
            shared_interests: None,
        });
    }

    if !a.interests.is_empty() || !b.interests.is_empty() {
        let overlap = jaccard(&a.interests, &b.interests);
        score += overlap * INTEREST_WEIGHT;
        factors.push(CompatibilityFactor {
            factor: "shared_interests".to_string(),
            score: overlap,
            weight: INTEREST_WEIGHT,
            shared_interests: Some(shared_labels(&a.interests, &b.interests)),
        });
    }

    let academic = academic_compatibility(a, b);
    score += academic * ACADEMIC_WEIGHT;
    factors.push(CompatibilityFactor {
        factor: "academic_compatibility".to_string(),
        score: academic,
        weight: ACADEMIC_WEIGHT,
        shared_interests: None,
    });

    let roles = role_compatibility(a, b);
    score += roles * ROLE_WEIGHT;
    factors.push(CompatibilityFactor {
        factor: "role_compatibility".to_string(),
        score: roles,
        weight: ROLE_WEIGHT,
        shared_interests: None,
    });

    let narrative = if score > 0.7 {
        "Highly compatible - excellent match for collaboration"
    } else if score > 0.5 {
        "Good compatibility - worth connecting"
    } else if score > 0.3 {
        "Moderate compatibility - potential for specific projects"
    } else {
        "Low compatibility - may not be the best match"
    };

    let level = if score > 0.7 {
        CompatibilityLevel::High
    } else if score > 0.4 {
        CompatibilityLevel::Medium
    } else {
        CompatibilityLevel::Low
    };

    CompatibilityReport {
        score,
        level,
        factors,
        narrative: vec![narrative.to_string()],
        users: CompatibilityUsers {
            user_a: ProfileSummary::from(a),
            user_b: ProfileSummary::from(b),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Program;

    fn profile(roles: Vec<Role>, program: Option<Program>, level: Option<u8>, interests: &[&str]) -> Profile {
        Profile {
            id: 1,
            display_name: "Test".to_string(),
            roles,
            program,
            level,
            interests: interests.iter().map(|s| s.to_string()).collect(),
            competencies: vec![],
        }
    }

    #[test]
    fn test_student_mentor_same_program() {
        let a = profile(vec![Role::Student], Some(Program::Api), Some(2), &["IA", "Web"]);
        let b = profile(vec![Role::Mentor], Some(Program::Api), Some(3), &["IA"]);

        let report = score_compatibility(&a, &b, &[1.0, 0.0], &[1.0, 0.0]);

        // 0.3 * 1.0 + 0.25 * 0.5 + 0.2 * 0.9 + 0.25 * 0.9
        assert!((report.score - 0.83).abs() < 1e-9, "score was {}", report.score);
        assert_eq!(report.level, CompatibilityLevel::High);
        assert_eq!(report.factors.len(), 4);
        assert_eq!(report.factors[1].shared_interests, Some(vec!["IA".to_string()]));
        assert_eq!(report.users.user_a.roles, vec![Role::Student]);
        assert_eq!(report.users.user_b.roles, vec![Role::Mentor]);
        assert_eq!(report.users.user_b.level, Some(3));
    }

    #[test]
    fn test_missing_vectors_and_interests_skip_factors() {
        let a = profile(vec![Role::Teacher], None, None, &[]);
        let b = profile(vec![Role::Teacher], None, None, &[]);

        let report = score_compatibility(&a, &b, &[], &[]);

        assert_eq!(report.factors.len(), 2);
        assert!((report.score - 0.125).abs() < 1e-9);
        assert_eq!(report.level, CompatibilityLevel::Low);
        assert_eq!(report.narrative, vec!["Low compatibility - may not be the best match"]);
    }

    #[test]
    fn test_negative_cosine_is_clamped() {
        let a = profile(vec![], None, None, &[]);
        let report = score_compatibility(&a, &a, &[1.0, 0.0], &[-1.0, 0.0]);
        assert_eq!(report.factors[0].score, 0.0);
        assert!(report.score >= 0.0);
    }
}
