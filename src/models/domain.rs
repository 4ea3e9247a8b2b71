use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::proficiency::normalize_proficiency;

/// Academic program (filière)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Program {
    #[serde(rename = "WMD")]
    Wmd,
    #[serde(rename = "API")]
    Api,
    #[serde(rename = "BDAI")]
    Bdai,
    #[serde(rename = "CCSN")]
    Ccsn,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Wmd => "WMD",
            Program::Api => "API",
            Program::Bdai => "BDAI",
            Program::Ccsn => "CCSN",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Program {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WMD" => Ok(Program::Wmd),
            "API" => Ok(Program::Api),
            "BDAI" => Ok(Program::Bdai),
            "CCSN" => Ok(Program::Ccsn),
            other => Err(format!("unknown program: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Mentor,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Mentor => "mentor",
            Role::Teacher => "teacher",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "mentor" => Ok(Role::Mentor),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Which role assignments a candidate pool is drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleFilter {
    Any,
    AnyOf(Vec<Role>),
}

impl RoleFilter {
    pub fn accepts(&self, roles: &[Role]) -> bool {
        match self {
            RoleFilter::Any => true,
            RoleFilter::AnyOf(wanted) => roles.iter().any(|r| wanted.contains(r)),
        }
    }
}

/// Proficiency as it is persisted: free text ("Avancé", "3", ...) or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawProficiency {
    Number(i64),
    Text(String),
}

impl RawProficiency {
    pub fn normalize(&self) -> u8 {
        match self {
            RawProficiency::Number(n) => (*n).clamp(1, 5) as u8,
            RawProficiency::Text(text) => normalize_proficiency(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyRecord {
    pub name: String,
    #[serde(default)]
    pub level: Option<RawProficiency>,
}

/// Persistence-shaped user record, before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub competencies: Vec<CompetencyRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competency {
    pub name: String,
    /// Normalized proficiency, 1-5 (0 when no level was recorded)
    pub level: u8,
}

/// Normalized profile snapshot seen by every scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub display_name: String,
    pub roles: Vec<Role>,
    pub program: Option<Program>,
    pub level: Option<u8>,
    pub interests: Vec<String>,
    pub competencies: Vec<Competency>,
}

impl Profile {
    /// Build a profile from a raw record.
    ///
    /// This is the only place where enum-like strings and proficiency text are
    /// interpreted. Unknown values are dropped rather than rejected.
    pub fn from_record(record: ProfileRecord) -> Self {
        let display_name = format!("{} {}", record.last_name.trim(), record.first_name.trim())
            .trim()
            .to_string();

        let mut roles: Vec<Role> = Vec::with_capacity(record.roles.len());
        for raw in &record.roles {
            match raw.parse::<Role>() {
                Ok(role) if !roles.contains(&role) => roles.push(role),
                Ok(_) => {}
                Err(e) => tracing::warn!("Profile {}: {}", record.id, e),
            }
        }

        let program = match record.program.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<Program>() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Profile {}: {}", record.id, e);
                    None
                }
            },
        };

        let level = record
            .level
            .filter(|l| (1..=5).contains(l))
            .map(|l| l as u8);

        let mut interests: Vec<String> = Vec::with_capacity(record.interests.len());
        for interest in record.interests {
            let interest = interest.trim().to_string();
            if !interest.is_empty() && !interests.contains(&interest) {
                interests.push(interest);
            }
        }

        let competencies = record
            .competencies
            .into_iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(|c| Competency {
                name: c.name.trim().to_string(),
                level: c.level.as_ref().map(RawProficiency::normalize).unwrap_or(0),
            })
            .collect();

        Self {
            id: record.id,
            display_name,
            roles,
            program,
            level,
            interests,
            competencies,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn competency_names(&self) -> Vec<&str> {
        self.competencies.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Interest group that can be recommended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub interest: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    SameProgram,
    SharedInterests,
    SkillComplementarity,
    SeniorSameProgram,
    Interdisciplinary,
    SemanticSimilarity,
    InterestGroup,
    SkillSwap,
}

/// One skill row of a swap explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub skill: String,
    pub their_level: u8,
    pub your_level: u8,
    pub benefit: String,
}

/// Structured explanation of a skill-swap pairing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapDetail {
    pub skills_they_offer: Vec<SkillEntry>,
    pub skills_you_offer: Vec<SkillEntry>,
    pub mutual_benefits: Vec<String>,
    /// Skills the requester does not have at all
    pub skill_gaps_filled: usize,
    /// 1 when the pair spans two programs, else 0
    pub complementary_skills: usize,
}

/// Evidence attached to a scored candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Explanation {
    Academic {
        same_program: bool,
        level_gap: Option<u8>,
    },
    SharedInterests {
        shared: Vec<String>,
    },
    Complementarity {
        missing_skills: Vec<String>,
        senior_bonus: bool,
    },
    Semantic {
        cosine: f64,
    },
    SkillSwap(SwapDetail),
}

/// Ranked candidate produced by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Profile,
    pub score: f64,
    pub match_type: MatchType,
    pub explanation: Explanation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMatch {
    pub group: Group,
    pub score: f64,
    pub match_type: MatchType,
}

/// Minimum scores and bonuses per recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    pub study_same_program: f64,
    pub study_interests: f64,
    pub mentor: f64,
    pub mentor_senior_bonus: f64,
    pub collaborator: f64,
    pub semantic: f64,
    pub skill_swap: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            study_same_program: 0.3,
            study_interests: 0.1,
            mentor: 0.0,
            mentor_senior_bonus: 0.2,
            collaborator: 0.3,
            semantic: 0.3,
            skill_swap: 0.0,
        }
    }
}
