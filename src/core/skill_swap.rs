use std::collections::HashMap;

use crate::models::{Profile, SkillEntry, SwapDetail};

/// Skill name → normalized proficiency, keyed case-insensitively.
///
/// Keeps first-seen order so explanations are deterministic. Duplicate
/// entries keep the highest level.
#[derive(Debug, Clone, Default)]
pub struct SkillMap {
    order: Vec<(String, String)>,
    levels: HashMap<String, u8>,
}

impl SkillMap {
    /// Competencies without a recorded level (0) are left out
    pub fn from_profile(profile: &Profile) -> Self {
        let mut map = Self::default();
        for competency in profile.competencies.iter().filter(|c| c.level > 0) {
            map.insert(&competency.name, competency.level);
        }
        map
    }

    pub fn insert(&mut self, name: &str, level: u8) {
        let key = name.trim().to_lowercase();
        match self.levels.get_mut(&key) {
            Some(existing) => *existing = (*existing).max(level),
            None => {
                self.order.push((key.clone(), name.trim().to_string()));
                self.levels.insert(key, level);
            }
        }
    }

    /// Level for a skill, `None` when the skill is absent
    pub fn level(&self, name: &str) -> Option<u8> {
        self.levels.get(&name.trim().to_lowercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.order
            .iter()
            .map(move |(key, display)| (display.as_str(), self.levels[key]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Weights of the skill-swap sub-scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapWeights {
    pub new_skill: f64,
    pub improve_skill: f64,
    pub teach_skill: f64,
    pub help_improve: f64,
    pub cross_program: f64,
    pub level_proximity: f64,
    /// Requester level a skill must exceed before it counts as teachable
    pub min_teaching_level: u8,
}

impl Default for SwapWeights {
    fn default() -> Self {
        Self {
            new_skill: 2.0,
            improve_skill: 1.0,
            teach_skill: 0.5,
            help_improve: 0.3,
            cross_program: 0.5,
            level_proximity: 0.3,
            min_teaching_level: 2,
        }
    }
}

/// Bidirectional skill-gap scorer.
///
/// The score is cumulative and unbounded; it is meant for ranking
/// candidates against one requester, not for comparing across requesters.
#[derive(Debug, Clone, Default)]
pub struct SkillSwapEngine {
    weights: SwapWeights,
}

impl SkillSwapEngine {
    pub fn new(weights: SwapWeights) -> Self {
        Self { weights }
    }

    pub fn score_profiles(&self, requester: &Profile, candidate: &Profile) -> (f64, SwapDetail) {
        self.score_swap(
            &SkillMap::from_profile(requester),
            &SkillMap::from_profile(candidate),
            requester,
            candidate,
        )
    }

    pub fn score_swap(
        &self,
        requester_skills: &SkillMap,
        candidate_skills: &SkillMap,
        requester: &Profile,
        candidate: &Profile,
    ) -> (f64, SwapDetail) {
        let w = &self.weights;
        let mut score = 0.0;
        let mut detail = SwapDetail::default();

        // What the candidate brings to the requester
        for (skill, their_level) in candidate_skills.iter() {
            match requester_skills.level(skill) {
                None => {
                    score += w.new_skill * (their_level as f64 / 5.0);
                    detail.skill_gaps_filled += 1;
                    detail.skills_they_offer.push(SkillEntry {
                        skill: skill.to_string(),
                        their_level,
                        your_level: 0,
                        benefit: "New skill to learn".to_string(),
                    });
                }
                Some(your_level) if their_level > your_level => {
                    let gap = (their_level - your_level) as f64;
                    score += w.improve_skill * (gap / 5.0);
                    detail.skills_they_offer.push(SkillEntry {
                        skill: skill.to_string(),
                        their_level,
                        your_level,
                        benefit: format!("Improve from level {} to {}", your_level, their_level),
                    });
                }
                Some(_) => {}
            }
        }

        // What the requester brings back
        for (skill, your_level) in requester_skills.iter() {
            if your_level <= w.min_teaching_level {
                continue;
            }
            match candidate_skills.level(skill) {
                None => {
                    score += w.teach_skill * (your_level as f64 / 5.0);
                    detail.skills_you_offer.push(SkillEntry {
                        skill: skill.to_string(),
                        their_level: 0,
                        your_level,
                        benefit: "You can teach this skill".to_string(),
                    });
                }
                Some(their_level) if your_level > their_level => {
                    let gap = (your_level - their_level) as f64;
                    score += w.help_improve * (gap / 5.0);
                    detail.skills_you_offer.push(SkillEntry {
                        skill: skill.to_string(),
                        their_level,
                        your_level,
                        benefit: format!(
                            "You can help improve from level {} to {}",
                            their_level, your_level
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        if let (Some(mine), Some(theirs)) = (requester.program, candidate.program) {
            if mine != theirs {
                score += w.cross_program;
                detail.complementary_skills = 1;
                detail.mutual_benefits.push(format!(
                    "Cross-program exchange: {} and {} perspectives",
                    mine, theirs
                ));
            }
        }

        if let (Some(mine), Some(theirs)) = (requester.level, candidate.level) {
            if mine.abs_diff(theirs) <= 1 {
                score += w.level_proximity;
                detail.mutual_benefits.push(format!(
                    "Similar academic level (year {} and year {})",
                    mine, theirs
                ));
            }
        }

        (score, detail)
    }
}
