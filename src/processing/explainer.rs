//! Explainability: matched/missing skills, strengths, risks and learning gaps

use crate::models::{ExplainabilityBreakdown, Importance, Job, Profile, ScoreBreakdown, SkillGap};
use crate::policy::{Policy, CRITICAL_RISK_PREFIX};
use crate::processing::scoring::required_level;
use crate::processing::skills::{count_term, learning_resources, SkillCategory, SkillMatcher};

/// Build the explanation for one (profile, job) pair.
///
/// Purely derivational; every list may come back empty when no rule fires.
pub fn generate_explanation(
    profile: &Profile,
    skills: &SkillMatcher,
    job: &Job,
    fit_score: u8,
    breakdown: &ScoreBreakdown,
    policy: &Policy,
) -> ExplainabilityBreakdown {
    let description = job.description.to_lowercase();

    let mut matched_skills: Vec<String> = Vec::new();
    let mut missing: Vec<(usize, String, Importance)> = Vec::new();
    let mut requirement_count = 0;
    let mut covered = 0;

    for requirement in job.requirements.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
        let position = requirement_count;
        requirement_count += 1;

        match skills.covering_skill(requirement) {
            Some(skill) => {
                covered += 1;
                if !matched_skills.iter().any(|m| m.eq_ignore_ascii_case(skill)) {
                    matched_skills.push(skill.to_string());
                }
            }
            None => {
                if !missing.iter().any(|(_, m, _)| m.eq_ignore_ascii_case(requirement)) {
                    let importance = requirement_importance(position, requirement, &description, policy);
                    missing.push((position, requirement.to_string(), importance));
                }
            }
        }
    }

    // Most important gaps first, original order within a tier
    missing.sort_by_key(|(position, _, importance)| (*importance, *position));

    let skill_gaps = missing
        .iter()
        .map(|(_, skill, importance)| skill_gap(skill, *importance))
        .collect();
    let missing_skills = missing.into_iter().map(|(_, skill, _)| skill).collect();

    ExplainabilityBreakdown {
        matched_skills,
        missing_skills,
        risk_factors: risk_factors(profile, job, breakdown, requirement_count, covered, policy),
        strengths: strengths(profile, job, fit_score, breakdown, requirement_count, covered, policy),
        skill_gaps,
    }
}

/// Early requirements and ones the description keeps repeating matter most
pub fn requirement_importance(position: usize, requirement: &str, description: &str, policy: &Policy) -> Importance {
    let rules = &policy.explain;
    let mentions = count_term(description, &requirement.to_lowercase());

    if position < rules.high_importance_positions || mentions >= rules.high_importance_mentions {
        Importance::High
    } else if position < rules.medium_importance_positions || mentions >= 1 {
        Importance::Medium
    } else {
        Importance::Low
    }
}

pub fn skill_gap(skill: &str, importance: Importance) -> SkillGap {
    let category = SkillCategory::classify(skill);
    SkillGap {
        skill: skill.to_string(),
        importance,
        estimated_learning_time: category.learning_time().to_string(),
        resources: learning_resources(skill, category),
    }
}

fn risk_factors(
    profile: &Profile,
    job: &Job,
    breakdown: &ScoreBreakdown,
    requirement_count: usize,
    covered: usize,
    policy: &Policy,
) -> Vec<String> {
    let rules = &policy.explain;
    let mut risks = Vec::new();
    let required = required_level(&job.experience_required);

    if breakdown.experience_match <= 0.0 {
        risks.push(format!(
            "{} role expects {} level experience, well above your {} level",
            CRITICAL_RISK_PREFIX, required, profile.experience_level
        ));
    } else if breakdown.experience_match < rules.low_experience_threshold {
        risks.push(format!(
            "Stretch role: expects {} level experience, you are at {} level",
            required, profile.experience_level
        ));
    }

    let skill_count = profile.skills.iter().filter(|s| !s.trim().is_empty()).count();
    if requirement_count >= rules.requirement_overload_min
        && requirement_count as f32 > rules.requirement_overload_ratio * skill_count as f32
    {
        risks.push(format!(
            "Long requirement list: {} requirements against {} skills on your profile",
            requirement_count, skill_count
        ));
    }

    if breakdown.location_match < 1.0 && !job.is_remote {
        let location = if job.location.trim().is_empty() { "Unspecified location" } else { job.location.trim() };
        risks.push(format!(
            "Location mismatch: {} is not among your preferred locations and the role is not remote",
            location
        ));
    }

    if requirement_count > 0 && breakdown.skill_overlap < rules.low_overlap_threshold {
        risks.push(format!(
            "Low skill overlap: only {} of {} requirements covered",
            covered, requirement_count
        ));
    }

    risks
}

fn strengths(
    profile: &Profile,
    job: &Job,
    fit_score: u8,
    breakdown: &ScoreBreakdown,
    requirement_count: usize,
    covered: usize,
    policy: &Policy,
) -> Vec<String> {
    let rules = &policy.explain;
    let mut strengths = Vec::new();

    if fit_score >= policy.decision.apply_min {
        strengths.push(format!("High overall fit ({}/100)", fit_score));
    }

    if requirement_count > 0 && breakdown.skill_overlap >= rules.strong_overlap_threshold {
        strengths.push(format!(
            "Strong skill match: {} of {} requirements covered",
            covered, requirement_count
        ));
    }

    if breakdown.experience_match >= 1.0 {
        strengths.push(format!(
            "Your {} level experience meets the role's {} requirement",
            profile.experience_level,
            required_level(&job.experience_required)
        ));
    }

    if breakdown.semantic >= rules.strong_semantic_threshold {
        strengths.push(format!(
            "Profile closely aligned with the role description ({:.0}% semantic match)",
            breakdown.semantic * 100.0
        ));
    }

    if job.is_remote && profile.prefers_remote() {
        strengths.push("Remote role matches your location preference".to_string());
    }

    strengths
}
