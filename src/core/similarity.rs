use std::collections::HashSet;

use crate::models::{Profile, Program};

/// Ranking produced by every scorer: (candidate index, score), best first
pub type Ranking = Vec<(usize, f64)>;

/// Sort scores descending. The sort is stable, so equal scores keep
/// candidate input order.
pub fn rank(mut scores: Ranking) -> Ranking {
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    scores
}

/// Jaccard index of two label sets; 0 when both are empty
pub fn jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let a: HashSet<&str> = a.iter().map(|s| s.as_ref()).collect();
    let b: HashSet<&str> = b.iter().map(|s| s.as_ref()).collect();

    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Labels present on both sides, in `a`'s order
pub fn shared_labels(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|label| b.contains(label)).cloned().collect()
}

fn level_gap(a: Option<u8>, b: Option<u8>) -> Option<u8> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.abs_diff(b)),
        _ => None,
    }
}

/// Same-program / close-level score used for study buddies.
///
/// 0.6 for an equal program, plus 0.4 / 0.2 / 0.1 for a level distance of
/// 0 / 1 / 2. Each part is only considered when both sides have a value.
pub fn program_level_score(
    target_program: Option<Program>,
    target_level: Option<u8>,
    candidate: &Profile,
) -> f64 {
    let mut score = 0.0;

    if let (Some(t), Some(c)) = (target_program, candidate.program) {
        if t == c {
            score += 0.6;
        }
    }

    score += match level_gap(target_level, candidate.level) {
        Some(0) => 0.4,
        Some(1) => 0.2,
        Some(2) => 0.1,
        _ => 0.0,
    };

    score
}

/// Cross-program diversity score used for interdisciplinary collaborators.
///
/// 0.5 for a different program, plus 0.5 / 0.3 for a level distance of 0 / 1.
pub fn cross_program_score(
    target_program: Option<Program>,
    target_level: Option<u8>,
    candidate: &Profile,
) -> f64 {
    let mut score = 0.0;

    if let (Some(t), Some(c)) = (target_program, candidate.program) {
        if t != c {
            score += 0.5;
        }
    }

    score += match level_gap(target_level, candidate.level) {
        Some(0) => 0.5,
        Some(1) => 0.3,
        _ => 0.0,
    };

    score
}

/// Cosine similarity; `None` when either vector is empty, the dimensions
/// differ or a vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    cosine.is_finite().then(|| cosine.clamp(-1.0, 1.0))
}

fn skill_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Mentor competencies the student does not have (case-insensitive)
pub fn missing_skills(student: &Profile, mentor: &Profile) -> Vec<String> {
    let student_skills: HashSet<String> = student
        .competencies
        .iter()
        .map(|c| skill_key(&c.name))
        .collect();

    let mut seen = HashSet::new();
    mentor
        .competencies
        .iter()
        .filter(|c| {
            let key = skill_key(&c.name);
            !student_skills.contains(&key) && seen.insert(key)
        })
        .map(|c| c.name.clone())
        .collect()
}

/// Fraction of the mentor's competencies the student lacks; 0 when the
/// mentor lists none
pub fn mentor_complementarity(student: &Profile, mentor: &Profile) -> f64 {
    let mentor_skills: HashSet<String> = mentor
        .competencies
        .iter()
        .map(|c| skill_key(&c.name))
        .collect();

    if mentor_skills.is_empty() {
        return 0.0;
    }

    missing_skills(student, mentor).len() as f64 / mentor_skills.len() as f64
}

/// Whether the mentor is in the student's program at a strictly higher level
pub fn is_senior_same_program(student: &Profile, mentor: &Profile) -> bool {
    match (student.program, mentor.program, student.level, mentor.level) {
        (Some(sp), Some(mp), Some(sl), Some(ml)) => sp == mp && ml > sl,
        _ => false,
    }
}

pub fn rank_by_interests(target: &Profile, candidates: &[Profile]) -> Ranking {
    rank(
        candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (i, jaccard(&target.interests, &c.interests)))
            .collect(),
    )
}

pub fn rank_by_program_level(target: &Profile, candidates: &[Profile]) -> Ranking {
    rank(
        candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (i, program_level_score(target.program, target.level, c)))
            .collect(),
    )
}

pub fn rank_cross_program(target: &Profile, candidates: &[Profile]) -> Ranking {
    rank(
        candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (i, cross_program_score(target.program, target.level, c)))
            .collect(),
    )
}

pub fn rank_mentors(student: &Profile, mentors: &[Profile]) -> Ranking {
    rank(
        mentors
            .iter()
            .enumerate()
            .map(|(i, m)| (i, mentor_complementarity(student, m)))
            .collect(),
    )
}

/// Rank candidate vectors by cosine similarity; candidates without a usable
/// vector are left out
pub fn rank_semantic<V: AsRef<[f32]>>(target: &[f32], candidates: &[V]) -> Ranking {
    rank(
        candidates
            .iter()
            .enumerate()
            .filter_map(|(i, v)| cosine_similarity(target, v.as_ref()).map(|s| (i, s)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Competency;

    fn profile(id: i64, program: Option<Program>, level: Option<u8>, skills: &[&str]) -> Profile {
        Profile {
            id,
            display_name: format!("User {}", id),
            roles: vec![],
            program,
            level,
            interests: vec![],
            competencies: skills
                .iter()
                .map(|s| Competency {
                    name: s.to_string(),
                    level: 3,
                })
                .collect(),
        }
    }

    #[test]
    fn test_jaccard() {
        let a = vec!["ai", "web"];
        let b = vec!["web", "cloud"];
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(jaccard(&a, &a), 1.0);
        let empty: Vec<&str> = vec![];
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }

    #[test]
    fn test_program_level_score() {
        let c = profile(1, Some(Program::Api), Some(3), &[]);
        assert!((program_level_score(Some(Program::Api), Some(3), &c) - 1.0).abs() < 1e-9);
        assert!((program_level_score(Some(Program::Api), Some(2), &c) - 0.8).abs() < 1e-9);
        assert!((program_level_score(Some(Program::Wmd), Some(1), &c) - 0.1).abs() < 1e-9);
        assert!((program_level_score(Some(Program::Wmd), Some(5), &c) - 0.1).abs() < 1e-9);
        assert_eq!(program_level_score(None, None, &c), 0.0);

        let far = profile(2, Some(Program::Api), Some(5), &[]);
        assert_eq!(program_level_score(Some(Program::Wmd), Some(1), &far), 0.0);
        assert!((program_level_score(Some(Program::Api), Some(1), &far) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_cross_program_score() {
        let c = profile(1, Some(Program::Bdai), Some(2), &[]);
        assert!((cross_program_score(Some(Program::Api), Some(2), &c) - 1.0).abs() < 1e-9);
        assert!((cross_program_score(Some(Program::Api), Some(3), &c) - 0.8).abs() < 1e-9);
        assert!((cross_program_score(Some(Program::Bdai), Some(3), &c) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_cosine() {
        let v = vec![0.3, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&v, &[]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_mentor_complementarity() {
        let student = profile(1, None, None, &["Python"]);
        let mentor = profile(2, None, None, &["python", "Rust", "SQL", "Go"]);
        assert!((mentor_complementarity(&student, &mentor) - 0.75).abs() < 1e-9);
        assert_eq!(missing_skills(&student, &mentor), vec!["Rust", "SQL", "Go"]);

        let empty = profile(3, None, None, &[]);
        assert_eq!(mentor_complementarity(&student, &empty), 0.0);
    }

    #[test]
    fn test_rank_is_stable() {
        let ranking = rank(vec![(0, 0.5), (1, 0.9), (2, 0.5), (3, 0.9)]);
        assert_eq!(ranking, vec![(1, 0.9), (3, 0.9), (0, 0.5), (2, 0.5)]);
    }

    #[test]
    fn test_rank_semantic_skips_empty() {
        let target: Vec<f32> = vec![1.0, 0.0];
        let candidates: Vec<Vec<f32>> = vec![vec![], vec![0.0, 1.0], vec![1.0, 0.1]];
        let ranking = rank_semantic(&target, &candidates);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].0, 2);
    }
}
