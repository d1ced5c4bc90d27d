//! Apply / Wait / Skip / Avoid recommendation over the policy's score bands

use crate::error::Result;
use crate::models::{Decision, Job, Profile, ScoreBreakdown};
use crate::policy::{Policy, ScoreBand, CRITICAL_RISK_PREFIX};
use log::debug;

const MAX_GAPS_IN_REASON: usize = 3;

pub fn is_critical_risk(risk: &str) -> bool {
    risk.trim_start().starts_with(CRITICAL_RISK_PREFIX)
}

/// Turn a fit score and its explanation signals into a decision and reason.
///
/// Critical risk factors override every band. A band table that fails to
/// cover the score surfaces as a `Policy` error.
pub fn make_decision(
    fit_score: u8,
    profile: &Profile,
    job: &Job,
    missing_skills: &[String],
    risk_factors: &[String],
    breakdown: &ScoreBreakdown,
    policy: &Policy,
) -> Result<(Decision, String)> {
    let band = policy.decision.band_for(fit_score)?;

    if let Some(critical) = risk_factors.iter().find(|r| is_critical_risk(r)) {
        let detail = critical.trim_start()[CRITICAL_RISK_PREFIX.len()..].trim();
        debug!("{}: critical risk overrides {:?} band", job.job_id, band);
        return Ok((Decision::Avoid, format!("Avoid {} at {}: {}", job.title, job.company, detail)));
    }

    let outcome = match band {
        ScoreBand::Strong if missing_skills.len() <= policy.decision.max_missing_for_apply => {
            let reason = match missing_skills.first() {
                Some(gap) => format!(
                    "Strong fit ({}/100) for {}. Apply now and mention your plan to pick up {}",
                    fit_score, job.title, gap
                ),
                None => format!(
                    "Strong fit ({}/100) for {}: your {} profile covers the requirements",
                    fit_score, job.title, profile.experience_level
                ),
            };
            (Decision::Apply, reason)
        }
        ScoreBand::Strong | ScoreBand::Promising => {
            let reason = if missing_skills.is_empty() {
                format!(
                    "Promising fit ({}/100). Strengthen your application before applying to {}",
                    fit_score, job.title
                )
            } else {
                format!(
                    "Promising fit ({}/100). Close these gaps first: {}",
                    fit_score,
                    gap_summary(missing_skills)
                )
            };
            (Decision::Wait, reason)
        }
        ScoreBand::Moderate => (
            Decision::Skip,
            format!(
                "Moderate fit ({}/100), held back mainly by {}",
                fit_score,
                dominant_weak_component(breakdown, policy)
            ),
        ),
        ScoreBand::Weak => (
            Decision::Avoid,
            format!("Low fit ({}/100): this role is far from your current profile", fit_score),
        ),
    };

    Ok(outcome)
}

fn gap_summary(missing_skills: &[String]) -> String {
    let mut summary = missing_skills
        .iter()
        .take(MAX_GAPS_IN_REASON)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if missing_skills.len() > MAX_GAPS_IN_REASON {
        summary.push_str(&format!(" and {} more", missing_skills.len() - MAX_GAPS_IN_REASON));
    }
    summary
}

/// The component losing the most weighted points
pub fn dominant_weak_component(breakdown: &ScoreBreakdown, policy: &Policy) -> &'static str {
    let s = &policy.scoring;
    let losses = [
        ("semantic similarity to the role", s.semantic_weight * (1.0 - breakdown.semantic)),
        ("skill overlap", s.skills_weight * (1.0 - breakdown.skill_overlap)),
        ("experience level", s.experience_weight * (1.0 - breakdown.experience_match)),
        ("location", s.location_weight * (1.0 - breakdown.location_match)),
    ];

    // First entry wins ties
    losses
        .iter()
        .fold(losses[0], |best, item| if item.1 > best.1 { *item } else { best })
        .0
}
