//! Tunable policy constants for scoring, decisions and posting heuristics.
//!
//! Every threshold the engine uses lives here so that the decision bands,
//! weights and rule tables are defined exactly once and can be overridden
//! from the configuration file.

use crate::error::{ApplyLessError, Result};
use crate::models::{CareerImpact, CompetitionLevel};
use serde::{Deserialize, Serialize};

/// Risk factors starting with this prefix override the score band to Avoid
pub const CRITICAL_RISK_PREFIX: &str = "Critical:";

const WEIGHT_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub scoring: ScoringPolicy,
    pub decision: DecisionPolicy,
    pub explain: ExplainPolicy,
    pub ghost: GhostPolicy,
    pub competition: CompetitionPolicy,
    pub career: CareerPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub semantic_weight: f32,
    pub skills_weight: f32,
    pub experience_weight: f32,
    pub location_weight: f32,
    /// Credit when the job asks for exactly one level above the candidate
    pub adjacent_level_credit: f32,
    /// Location component when the job is neither remote nor preferred
    pub location_mismatch_score: f32,
    /// Jaro-Winkler similarity at which a skill counts as covering a requirement
    pub fuzzy_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    pub apply_min: u8,
    pub wait_min: u8,
    pub skip_min: u8,
    pub max_missing_for_apply: usize,
}

/// Score band a fit score falls into before override rules are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Promising,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainPolicy {
    pub high_importance_positions: usize,
    pub medium_importance_positions: usize,
    pub high_importance_mentions: usize,
    pub low_experience_threshold: f32,
    pub requirement_overload_ratio: f32,
    pub requirement_overload_min: usize,
    pub low_overlap_threshold: f32,
    pub strong_overlap_threshold: f32,
    pub strong_semantic_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostPolicy {
    pub stale_after_days: i64,
    pub stale_penalty: f32,
    pub min_description_words: usize,
    pub min_words_per_requirement: usize,
    pub thin_description_penalty: f32,
    pub missing_company_size_penalty: f32,
    pub vague_location_penalty: f32,
    pub unknown_date_penalty: f32,
    pub ghost_threshold: f32,
    pub caution_threshold: f32,
    pub vague_locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionPolicy {
    pub remote_points: u8,
    pub large_company_points: u8,
    pub medium_company_points: u8,
    pub high_demand_title_points: u8,
    pub entry_title_points: u8,
    pub high_min: u8,
    pub low_max: u8,
    /// Fit score at or above which an ambiguous posting resolves to Medium
    pub tie_break_fit: u8,
    pub large_company_min_employees: u32,
    pub medium_company_min_employees: u32,
    pub high_demand_titles: Vec<String>,
    pub entry_title_keywords: Vec<String>,
}

impl CompetitionPolicy {
    /// Attractiveness total that sits on the Medium/High boundary
    pub fn ambiguous_points(&self) -> u8 {
        self.high_min.saturating_sub(1)
    }

    pub fn level_for(&self, points: u8, fit_score: u8) -> CompetitionLevel {
        if points >= self.high_min {
            CompetitionLevel::High
        } else if points <= self.low_max {
            CompetitionLevel::Low
        } else if points == self.ambiguous_points() {
            if fit_score >= self.tie_break_fit {
                CompetitionLevel::Medium
            } else {
                CompetitionLevel::High
            }
        } else {
            CompetitionLevel::Medium
        }
    }
}

/// One row of the career impact table; bounds are inclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerRule {
    pub min_level_delta: i8,
    pub max_level_delta: i8,
    pub min_fit: u8,
    pub max_fit: u8,
    pub impact: CareerImpact,
}

impl CareerRule {
    pub fn matches(&self, level_delta: i8, fit_score: u8) -> bool {
        (self.min_level_delta..=self.max_level_delta).contains(&level_delta)
            && (self.min_fit..=self.max_fit).contains(&fit_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerPolicy {
    /// Evaluated in order, first match wins
    pub rules: Vec<CareerRule>,
}

impl CareerPolicy {
    pub fn lookup(&self, level_delta: i8, fit_score: u8) -> Option<CareerImpact> {
        self.rules
            .iter()
            .find(|rule| rule.matches(level_delta, fit_score))
            .map(|rule| rule.impact)
    }
}

impl DecisionPolicy {
    /// Ordered band table, highest threshold first
    pub fn bands(&self) -> [(u8, ScoreBand); 4] {
        [
            (self.apply_min, ScoreBand::Strong),
            (self.wait_min, ScoreBand::Promising),
            (self.skip_min, ScoreBand::Moderate),
            (0, ScoreBand::Weak),
        ]
    }

    pub fn band_for(&self, fit_score: u8) -> Result<ScoreBand> {
        self.bands()
            .iter()
            .find(|(min, _)| fit_score >= *min)
            .map(|(_, band)| *band)
            .ok_or_else(|| ApplyLessError::Policy(format!("no decision band covers fit score {}", fit_score)))
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy {
                semantic_weight: 0.4,
                skills_weight: 0.3,
                experience_weight: 0.2,
                location_weight: 0.1,
                adjacent_level_credit: 0.5,
                location_mismatch_score: 0.3,
                fuzzy_threshold: 0.92,
            },
            decision: DecisionPolicy {
                apply_min: 80,
                wait_min: 60,
                skip_min: 35,
                max_missing_for_apply: 1,
            },
            explain: ExplainPolicy {
                high_importance_positions: 3,
                medium_importance_positions: 6,
                high_importance_mentions: 2,
                low_experience_threshold: 0.75,
                requirement_overload_ratio: 2.0,
                requirement_overload_min: 5,
                low_overlap_threshold: 0.3,
                strong_overlap_threshold: 0.7,
                strong_semantic_threshold: 0.7,
            },
            ghost: GhostPolicy {
                stale_after_days: 30,
                stale_penalty: 0.35,
                min_description_words: 40,
                min_words_per_requirement: 12,
                thin_description_penalty: 0.30,
                missing_company_size_penalty: 0.15,
                vague_location_penalty: 0.15,
                unknown_date_penalty: 0.10,
                ghost_threshold: 0.5,
                caution_threshold: 0.7,
                vague_locations: ["", "tbd", "n/a", "unknown", "various", "multiple locations", "anywhere"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            competition: CompetitionPolicy {
                remote_points: 2,
                large_company_points: 2,
                medium_company_points: 1,
                high_demand_title_points: 1,
                entry_title_points: 1,
                high_min: 4,
                low_max: 1,
                tie_break_fit: 75,
                large_company_min_employees: 1000,
                medium_company_min_employees: 200,
                high_demand_titles: [
                    "software engineer", "software developer", "developer", "data scientist",
                    "data analyst", "product manager", "frontend", "front-end", "full stack",
                    "fullstack", "web developer", "ux designer",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                entry_title_keywords: ["junior", "intern", "entry", "graduate", "associate", "trainee"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            career: CareerPolicy {
                rules: vec![
                    CareerRule { min_level_delta: -3, max_level_delta: -2, min_fit: 0, max_fit: 100, impact: CareerImpact::Negative },
                    CareerRule { min_level_delta: 1, max_level_delta: 3, min_fit: 0, max_fit: 34, impact: CareerImpact::Negative },
                    CareerRule { min_level_delta: 1, max_level_delta: 1, min_fit: 60, max_fit: 100, impact: CareerImpact::Positive },
                    CareerRule { min_level_delta: -3, max_level_delta: 3, min_fit: 0, max_fit: 100, impact: CareerImpact::Neutral },
                ],
            },
        }
    }
}

impl Policy {
    /// Reject policies that would break the scoring invariants
    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        let weights = [s.semantic_weight, s.skills_weight, s.experience_weight, s.location_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ApplyLessError::Policy("scoring weights must be non-negative".to_string()));
        }
        let sum: f32 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ApplyLessError::Policy(format!("scoring weights must sum to 1.0, got {:.4}", sum)));
        }
        for (name, value) in [
            ("adjacent_level_credit", s.adjacent_level_credit),
            ("location_mismatch_score", s.location_mismatch_score),
            ("fuzzy_threshold", s.fuzzy_threshold),
            ("ghost_threshold", self.ghost.ghost_threshold),
            ("caution_threshold", self.ghost.caution_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ApplyLessError::Policy(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }

        let d = &self.decision;
        if !(d.apply_min <= 100 && d.apply_min > d.wait_min && d.wait_min > d.skip_min && d.skip_min > 0) {
            return Err(ApplyLessError::Policy(format!(
                "decision thresholds must satisfy 100 >= apply > wait > skip > 0, got {}/{}/{}",
                d.apply_min, d.wait_min, d.skip_min
            )));
        }

        if self.ghost.ghost_threshold > self.ghost.caution_threshold {
            return Err(ApplyLessError::Policy("ghost_threshold cannot exceed caution_threshold".to_string()));
        }

        let c = &self.competition;
        if c.low_max >= c.high_min {
            return Err(ApplyLessError::Policy("competition low_max must be below high_min".to_string()));
        }

        if self.career.rules.is_empty() {
            return Err(ApplyLessError::Policy("career impact table is empty".to_string()));
        }

        Ok(())
    }
}
