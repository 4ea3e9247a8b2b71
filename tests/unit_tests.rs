// Unit tests for Campus Match scorers

use campus_match::core::similarity::{
    cosine_similarity, jaccard, program_level_score, rank_by_interests, rank_by_program_level, rank_cross_program,
    rank_mentors,
};
use campus_match::core::{normalize_proficiency, SkillMap, SkillSwapEngine};
use campus_match::models::{Competency, Profile, ProfileRecord, Program, Role};

fn profile(id: i64, program: Option<Program>, level: Option<u8>, interests: &[&str], skills: &[(&str, u8)]) -> Profile {
    Profile {
        id,
        display_name: format!("User {}", id),
        roles: vec![Role::Student],
        program,
        level,
        interests: interests.iter().map(|s| s.to_string()).collect(),
        competencies: skills
            .iter()
            .map(|(name, level)| Competency {
                name: name.to_string(),
                level: *level,
            })
            .collect(),
    }
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_jaccard_range_and_symmetry() {
    let sets = [
        labels(&[]),
        labels(&["IA"]),
        labels(&["IA", "Web"]),
        labels(&["Web", "Cloud", "Design"]),
        labels(&["Robotique"]),
    ];

    for a in &sets {
        for b in &sets {
            let ab = jaccard(a, b);
            assert!((0.0..=1.0).contains(&ab));
            assert_eq!(ab, jaccard(b, a));
        }
    }
}

#[test]
fn test_jaccard_one_iff_equal_and_non_empty() {
    assert_eq!(jaccard(&labels(&["IA", "Web"]), &labels(&["Web", "IA"])), 1.0);
    assert_eq!(jaccard(&labels(&[]), &labels(&[])), 0.0);
    assert!(jaccard(&labels(&["IA", "Web"]), &labels(&["IA"])) < 1.0);
}

#[test]
fn test_program_level_symmetric_under_equal_programs() {
    let a = profile(1, Some(Program::Api), Some(2), &[], &[]);
    let b = profile(2, Some(Program::Api), Some(4), &[], &[]);

    assert_eq!(
        program_level_score(a.program, a.level, &b),
        program_level_score(b.program, b.level, &a)
    );
}

#[test]
fn test_program_level_monotonic_in_level_distance() {
    let target = profile(1, Some(Program::Bdai), Some(1), &[], &[]);

    let scores: Vec<f64> = (1..=5)
        .map(|level| program_level_score(target.program, target.level, &profile(2, Some(Program::Bdai), Some(level), &[], &[])))
        .collect();

    assert_eq!(scores[0], 1.0);
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "{:?}", scores);
    }
}

#[test]
fn test_program_level_ignores_missing_values() {
    let target = profile(1, None, None, &[], &[]);
    let candidate = profile(2, Some(Program::Wmd), Some(3), &[], &[]);
    assert_eq!(program_level_score(target.program, target.level, &candidate), 0.0);
}

#[test]
fn test_swap_score_non_negative() {
    let engine = SkillSwapEngine::default();
    let profiles = [
        profile(1, Some(Program::Api), Some(1), &[], &[("Python", 1)]),
        profile(2, Some(Program::Wmd), Some(5), &[], &[("Python", 5), ("Figma", 3)]),
        profile(3, None, None, &[], &[]),
        profile(4, Some(Program::Ccsn), Some(3), &[], &[("Linux", 4), ("python", 2)]),
    ];

    for a in &profiles {
        for b in &profiles {
            let (score, _) = engine.score_profiles(a, b);
            assert!(score >= 0.0 && score.is_finite());
        }
    }
}

#[test]
fn test_swap_score_zero_for_identical_skills_far_levels() {
    let engine = SkillSwapEngine::default();
    let a = profile(1, Some(Program::Api), Some(1), &[], &[("Python", 3), ("SQL", 4)]);
    let b = profile(2, Some(Program::Api), Some(4), &[], &[("Python", 3), ("SQL", 4)]);

    let (score, detail) = engine.score_profiles(&a, &b);
    assert_eq!(score, 0.0);
    assert!(detail.skills_they_offer.is_empty());
    assert!(detail.skills_you_offer.is_empty());
    assert!(detail.mutual_benefits.is_empty());
}

#[test]
fn test_swap_reference_scenario() {
    let engine = SkillSwapEngine::default();
    let requester = profile(1, Some(Program::Api), Some(2), &[], &[("Python", 3)]);
    let candidate = profile(2, Some(Program::Bdai), Some(3), &[], &[("Python", 5), ("SQL", 2)]);

    let (score, detail) = engine.score_swap(
        &SkillMap::from_profile(&requester),
        &SkillMap::from_profile(&candidate),
        &requester,
        &candidate,
    );

    assert!((score - 2.0).abs() < 1e-9, "score was {}", score);
    assert_eq!(detail.skills_they_offer.len(), 2);
    assert_eq!(detail.skill_gaps_filled, 1);

    let improve = detail
        .skills_they_offer
        .iter()
        .find(|e| e.skill == "Python")
        .unwrap();
    assert_eq!(improve.benefit, "Improve from level 3 to 5");

    let new_skill = detail.skills_they_offer.iter().find(|e| e.skill == "SQL").unwrap();
    assert_eq!(new_skill.your_level, 0);
    assert_eq!(new_skill.benefit, "New skill to learn");
}

#[test]
fn test_proficiency_normalization() {
    assert_eq!(normalize_proficiency("Expert"), 5);
    assert_eq!(normalize_proficiency("2"), 2);
    assert_eq!(normalize_proficiency(""), 0);
    assert_eq!(normalize_proficiency("xyz"), 1);
    assert_eq!(normalize_proficiency("level 7"), 5);
    assert_eq!(normalize_proficiency("Débutant"), 1);
    assert_eq!(normalize_proficiency("Maître"), 5);
}

#[test]
fn test_record_normalization_boundary() {
    let record: ProfileRecord = serde_json::from_str(
        r#"{
            "id": 3,
            "first_name": "Sarah",
            "last_name": "Lambert",
            "roles": ["student", "alien"],
            "program": "bdai",
            "level": 9,
            "interests": ["IA", " IA "],
            "competencies": [
                { "name": "SQL", "level": "Avancé" },
                { "name": "Pandas", "level": 12 },
                { "name": "R" }
            ]
        }"#,
    )
    .unwrap();

    let profile = Profile::from_record(record);

    assert_eq!(profile.roles, vec![Role::Student]);
    assert_eq!(profile.program, Some(Program::Bdai));
    assert_eq!(profile.level, None);
    assert_eq!(profile.interests, vec!["IA".to_string()]);
    let levels: Vec<u8> = profile.competencies.iter().map(|c| c.level).collect();
    assert_eq!(levels, vec![4, 5, 0]);
}

#[test]
fn test_cosine_self_similarity() {
    let vectors: Vec<Vec<f32>> = vec![vec![1.0, 0.0, 0.0], vec![0.3, -0.7, 2.5], vec![1e-3, 4.0, 4.0]];
    for v in &vectors {
        let cosine = cosine_similarity(v, v).unwrap();
        assert!((cosine - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_cosine_undefined_for_empty_vectors() {
    assert!(cosine_similarity(&[], &[1.0, 2.0]).is_none());
    assert!(cosine_similarity(&[1.0], &[]).is_none());
}

#[test]
fn test_scorers_are_idempotent() {
    let target = profile(1, Some(Program::Api), Some(2), &["IA", "Web"], &[("Python", 2)]);
    let candidates: Vec<Profile> = (2..20)
        .map(|i| {
            let program = [Program::Api, Program::Bdai, Program::Wmd, Program::Ccsn][(i % 4) as usize];
            let interests: &[&str] = if i % 2 == 0 { &["IA"] } else { &["Web", "Cloud"] };
            profile(i, Some(program), Some((i % 5 + 1) as u8), interests, &[("Python", 3), ("SQL", 2)])
        })
        .collect();

    assert_eq!(rank_by_interests(&target, &candidates), rank_by_interests(&target, &candidates));
    assert_eq!(rank_by_program_level(&target, &candidates), rank_by_program_level(&target, &candidates));
    assert_eq!(rank_cross_program(&target, &candidates), rank_cross_program(&target, &candidates));
    assert_eq!(rank_mentors(&target, &candidates), rank_mentors(&target, &candidates));
}

#[test]
fn test_rankings_are_stable_on_ties() {
    let target = profile(1, None, None, &["IA"], &[]);
    let candidates: Vec<Profile> = (2..6).map(|i| profile(i, None, None, &["IA"], &[])).collect();

    let indices: Vec<usize> = rank_by_interests(&target, &candidates).into_iter().map(|(i, _)| i).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}
