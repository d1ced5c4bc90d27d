//! Data model shared by the matching engine and its callers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered seniority scale: Entry < Mid < Senior < Lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    pub fn rank(self) -> i8 {
        match self {
            ExperienceLevel::Entry => 0,
            ExperienceLevel::Mid => 1,
            ExperienceLevel::Senior => 2,
            ExperienceLevel::Lead => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "entry" | "entry-level" | "entry level" | "junior" => Some(ExperienceLevel::Entry),
            "mid" | "mid-level" | "mid level" | "intermediate" => Some(ExperienceLevel::Mid),
            "senior" => Some(ExperienceLevel::Senior),
            "lead" => Some(ExperienceLevel::Lead),
            _ => None,
        }
    }
}

impl TryFrom<String> for ExperienceLevel {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
            .ok_or_else(|| format!("unknown experience level '{}': expected Entry, Mid, Senior or Lead", value))
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Mid => "Mid",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Lead => "Lead",
        };
        write!(f, "{}", name)
    }
}

/// Candidate profile with skills, experience, and preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: u32,
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub preferred_roles: Vec<String>,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub career_goals: String,
    #[serde(default)]
    pub resume_text: Option<String>,
}

impl Profile {
    pub fn prefers_remote(&self) -> bool {
        self.preferred_locations
            .iter()
            .any(|loc| loc.to_lowercase().contains("remote"))
    }
}

/// Job posting as supplied by the dataset loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub experience_required: String,
    #[serde(default)]
    pub posted_date: String,
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
}

/// Per-component values (each in [0, 1]) behind a fit score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub semantic: f32,
    pub skill_overlap: f32,
    pub experience_match: f32,
    pub location_match: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Importance {
    High,
    Medium,
    Low,
}

/// A missing skill with a learning recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub importance: Importance,
    pub estimated_learning_time: String,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainabilityBreakdown {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub risk_factors: Vec<String>,
    pub strengths: Vec<String>,
    pub skill_gaps: Vec<SkillGap>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Apply,
    Wait,
    Skip,
    Avoid,
}

impl Decision {
    pub const ALL: [Decision; 4] = [Decision::Apply, Decision::Wait, Decision::Skip, Decision::Avoid];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Decision::Apply => "Apply",
            Decision::Wait => "Wait",
            Decision::Skip => "Skip",
            Decision::Avoid => "Avoid",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CareerImpact {
    Positive,
    Neutral,
    Negative,
}

/// Outcome of the ghost-job check for a single posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostAssessment {
    pub is_ghost: bool,
    pub warning: Option<String>,
    pub quality_score: f32,
}

/// Aggregate result for one (profile, job) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job: Job,
    pub fit_score: u8,
    pub decision: Decision,
    pub decision_reason: String,
    pub explanation: ExplainabilityBreakdown,
    pub competition_level: CompetitionLevel,
    pub career_impact: CareerImpact,
    pub score_breakdown: ScoreBreakdown,
    pub posting_quality: f32,
}

/// One page of the ranked job feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFeed {
    pub jobs: Vec<JobMatch>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCounts {
    #[serde(rename = "Apply")]
    pub apply: usize,
    #[serde(rename = "Wait")]
    pub wait: usize,
    #[serde(rename = "Skip")]
    pub skip: usize,
    #[serde(rename = "Avoid")]
    pub avoid: usize,
}

impl DecisionCounts {
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Apply => self.apply += 1,
            Decision::Wait => self.wait += 1,
            Decision::Skip => self.skip += 1,
            Decision::Avoid => self.avoid += 1,
        }
    }

    pub fn get(&self, decision: Decision) -> usize {
        match decision {
            Decision::Apply => self.apply,
            Decision::Wait => self.wait,
            Decision::Skip => self.skip,
            Decision::Avoid => self.avoid,
        }
    }
}

/// Decision distribution across the whole job collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedStats {
    pub total_jobs: usize,
    pub decisions: DecisionCounts,
    pub recommendation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_level_ordering() {
        assert!(ExperienceLevel::Entry < ExperienceLevel::Mid);
        assert!(ExperienceLevel::Senior < ExperienceLevel::Lead);
        assert_eq!(ExperienceLevel::Lead.rank() - ExperienceLevel::Entry.rank(), 3);
    }

    #[test]
    fn test_profile_deserializes_case_insensitive_level() {
        let json = r#"{
            "user_id": "u1",
            "skills": ["Python"],
            "experience_years": 3,
            "experience_level": "mid",
            "preferred_roles": [],
            "preferred_locations": ["Remote"],
            "career_goals": "grow"
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.experience_level, ExperienceLevel::Mid);
        assert!(profile.resume_text.is_none());
        assert!(profile.prefers_remote());
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let json = r#"{"user_id": "u1", "skills": [], "experience_level": "Wizard"}"#;
        assert!(serde_json::from_str::<Profile>(json).is_err());
    }

    #[test]
    fn test_job_optional_fields_default() {
        let json = r#"{"job_id": "j1", "title": "Engineer", "company": "Acme"}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert!(!job.is_remote);
        assert!(job.company_size.is_none());
        assert!(job.requirements.is_empty());
    }

    #[test]
    fn test_decision_serializes_as_plain_name() {
        assert_eq!(serde_json::to_string(&Decision::Wait).unwrap(), "\"Wait\"");
        assert_eq!(Decision::parse("avoid"), Some(Decision::Avoid));
        assert_eq!(Decision::parse("maybe"), None);
    }

    #[test]
    fn test_decision_counts_serialize_with_decision_names() {
        let mut counts = DecisionCounts::default();
        counts.record(Decision::Apply);
        counts.record(Decision::Apply);
        counts.record(Decision::Skip);
        let value = serde_json::to_value(counts).unwrap();
        assert_eq!(value["Apply"], 2);
        assert_eq!(value["Skip"], 1);
        assert_eq!(counts.get(Decision::Avoid), 0);
    }
}
