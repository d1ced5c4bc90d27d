//! Composite fit score: semantic similarity plus structured signals

use crate::models::{ExperienceLevel, Job, Profile, ScoreBreakdown};
use crate::policy::ScoringPolicy;
use crate::processing::skills::{contains_term, SkillMatcher};
use once_cell::sync::Lazy;
use regex::Regex;

static YEARS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})\s*\+?\s*(?:(?:-|–|to)\s*\d{1,2}\s*)?(?:years?|yrs?)").expect("valid years regex"));

const LEVEL_KEYWORDS: [(ExperienceLevel, &[&str]); 4] = [
    (ExperienceLevel::Lead, &["lead", "principal", "staff", "head of", "director"]),
    (ExperienceLevel::Senior, &["senior", "sr", "sr."]),
    (ExperienceLevel::Mid, &["mid", "mid-level", "intermediate"]),
    (ExperienceLevel::Entry, &["entry", "junior", "jr", "graduate", "new grad", "intern", "internship"]),
];

/// Interpret a job's free-text experience requirement on the level scale.
///
/// Level keywords win over year counts; text with neither is read as Mid.
/// A year range ("3-5 years", "3 to 5 years") is read by its lower bound.
pub fn required_level(experience_required: &str) -> ExperienceLevel {
    let lower = experience_required.to_lowercase();

    for (level, keywords) in LEVEL_KEYWORDS {
        if keywords.iter().any(|k| contains_term(&lower, k)) {
            return level;
        }
    }

    if let Some(years) = YEARS_PATTERN
        .captures(&lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
    {
        return match years {
            0..=1 => ExperienceLevel::Entry,
            2..=4 => ExperienceLevel::Mid,
            5..=7 => ExperienceLevel::Senior,
            _ => ExperienceLevel::Lead,
        };
    }

    ExperienceLevel::Mid
}

/// 1.0 when the candidate meets the level, partial credit one level short, else 0
pub fn experience_match(candidate: ExperienceLevel, required: ExperienceLevel, policy: &ScoringPolicy) -> f32 {
    match required.rank() - candidate.rank() {
        gap if gap <= 0 => 1.0,
        1 => policy.adjacent_level_credit,
        _ => 0.0,
    }
}

/// 1.0 for remote roles or when a preferred location names the job's
/// location (or the reverse) on word boundaries, so "LA" never matches "Dallas"
pub fn location_match(profile: &Profile, job: &Job, policy: &ScoringPolicy) -> f32 {
    if job.is_remote {
        return 1.0;
    }

    let job_location = job.location.trim().to_lowercase();
    if job_location.is_empty() {
        return policy.location_mismatch_score;
    }

    let preferred = profile.preferred_locations.iter().any(|loc| {
        let loc = loc.trim().to_lowercase();
        !loc.is_empty() && (contains_term(&job_location, &loc) || contains_term(&loc, &job_location))
    });

    if preferred {
        1.0
    } else {
        policy.location_mismatch_score
    }
}

/// Weighted sum of the breakdown, rounded and clamped to [0, 100]
pub fn weighted_score(breakdown: &ScoreBreakdown, policy: &ScoringPolicy) -> u8 {
    let sum = policy.semantic_weight * breakdown.semantic
        + policy.skills_weight * breakdown.skill_overlap
        + policy.experience_weight * breakdown.experience_match
        + policy.location_weight * breakdown.location_match;

    if !sum.is_finite() {
        return 0;
    }
    (sum * 100.0).round().clamp(0.0, 100.0) as u8
}

fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Compute the 0-100 fit score and its per-component breakdown
pub fn calculate_fit_score(
    profile: &Profile,
    skills: &SkillMatcher,
    job: &Job,
    semantic_score: f32,
    policy: &ScoringPolicy,
) -> (u8, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        semantic: unit(semantic_score),
        skill_overlap: unit(skills.overlap_ratio(&job.requirements)),
        experience_match: unit(experience_match(
            profile.experience_level,
            required_level(&job.experience_required),
            policy,
        )),
        location_match: unit(location_match(profile, job, policy)),
    };

    (weighted_score(&breakdown, policy), breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;

    fn policy() -> ScoringPolicy {
        Policy::default().scoring
    }

    fn profile(skills: &[&str], level: ExperienceLevel, locations: &[&str]) -> Profile {
        Profile {
            user_id: "u1".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_years: 3,
            experience_level: level,
            preferred_roles: vec![],
            preferred_locations: locations.iter().map(|s| s.to_string()).collect(),
            career_goals: String::new(),
            resume_text: None,
        }
    }

    fn job(requirements: &[&str], experience: &str, location: &str, remote: bool) -> Job {
        Job {
            job_id: "j1".to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            requirements: requirements.iter().map(|s| s.to_string()).collect(),
            location: location.to_string(),
            experience_required: experience.to_string(),
            posted_date: String::new(),
            company_size: None,
            is_remote: remote,
        }
    }

    #[test]
    fn test_required_level_keywords_and_years() {
        assert_eq!(required_level("Senior"), ExperienceLevel::Senior);
        assert_eq!(required_level("Lead / Principal"), ExperienceLevel::Lead);
        assert_eq!(required_level("Mid-Senior level"), ExperienceLevel::Senior);
        assert_eq!(required_level("Junior developer"), ExperienceLevel::Entry);
        assert_eq!(required_level("3+ years"), ExperienceLevel::Mid);
        assert_eq!(required_level("5-7 years of experience"), ExperienceLevel::Senior);
        assert_eq!(required_level("10 yrs"), ExperienceLevel::Lead);
        assert_eq!(required_level("0-1 years"), ExperienceLevel::Entry);
        assert_eq!(required_level("3 to 5 years"), ExperienceLevel::Mid);
        assert_eq!(required_level("2–4 yrs"), ExperienceLevel::Mid);
        assert_eq!(required_level(""), ExperienceLevel::Mid);
    }

    #[test]
    fn test_experience_match_scale() {
        let p = policy();
        assert_eq!(experience_match(ExperienceLevel::Senior, ExperienceLevel::Mid, &p), 1.0);
        assert_eq!(experience_match(ExperienceLevel::Mid, ExperienceLevel::Mid, &p), 1.0);
        assert_eq!(experience_match(ExperienceLevel::Mid, ExperienceLevel::Senior, &p), 0.5);
        assert_eq!(experience_match(ExperienceLevel::Entry, ExperienceLevel::Senior, &p), 0.0);
        assert_eq!(experience_match(ExperienceLevel::Entry, ExperienceLevel::Lead, &p), 0.0);
    }

    #[test]
    fn test_location_match() {
        let p = policy();
        let candidate = profile(&[], ExperienceLevel::Mid, &["New York", "Remote"]);
        assert_eq!(location_match(&candidate, &job(&[], "", "Berlin", true), &p), 1.0);
        assert_eq!(location_match(&candidate, &job(&[], "", "New York, NY", false), &p), 1.0);
        assert_eq!(location_match(&candidate, &job(&[], "", "Berlin", false), &p), 0.3);
        assert_eq!(location_match(&candidate, &job(&[], "", "", false), &p), 0.3);
    }

    #[test]
    fn test_location_abbreviations_need_word_boundaries() {
        let p = policy();
        let la = profile(&[], ExperienceLevel::Mid, &["LA"]);
        assert_eq!(location_match(&la, &job(&[], "", "Dallas, TX", false), &p), 0.3);
        assert_eq!(location_match(&la, &job(&[], "", "Atlanta", false), &p), 0.3);
        assert_eq!(location_match(&la, &job(&[], "", "LA, CA", false), &p), 1.0);

        let ny = profile(&[], ExperienceLevel::Mid, &["NY"]);
        assert_eq!(location_match(&ny, &job(&[], "", "Sunnyvale, CA", false), &p), 0.3);
        assert_eq!(location_match(&ny, &job(&[], "", "New York, NY", false), &p), 1.0);

        let berlin = profile(&[], ExperienceLevel::Mid, &["Berlin, Germany"]);
        assert_eq!(location_match(&berlin, &job(&[], "", "Berlin", false), &p), 1.0);
    }

    #[test]
    fn test_two_of_three_skills_remote_scenario() {
        let p = policy();
        let candidate = profile(&["Python", "SQL"], ExperienceLevel::Mid, &["Remote"]);
        let posting = job(&["Python", "SQL", "Docker"], "Mid", "Remote", true);
        let skills = SkillMatcher::new(&candidate.skills, p.fuzzy_threshold).unwrap();

        let (score, breakdown) = calculate_fit_score(&candidate, &skills, &posting, 0.6, &p);
        assert!((breakdown.skill_overlap - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(breakdown.location_match, 1.0);
        assert_eq!(breakdown.experience_match, 1.0);
        // 40 * 0.6 + 30 * 2/3 + 20 + 10
        assert_eq!(score, 74);
    }

    #[test]
    fn test_empty_requirements_are_vacuously_satisfied() {
        let p = policy();
        let candidate = profile(&[], ExperienceLevel::Mid, &[]);
        let skills = SkillMatcher::new(&candidate.skills, p.fuzzy_threshold).unwrap();
        let (_, breakdown) = calculate_fit_score(&candidate, &skills, &job(&[], "Mid", "", true), 0.5, &p);
        assert_eq!(breakdown.skill_overlap, 1.0);
    }

    #[test]
    fn test_lead_role_for_entry_candidate_zeroes_experience() {
        let p = policy();
        let candidate = profile(&["Python"], ExperienceLevel::Entry, &["Remote"]);
        let skills = SkillMatcher::new(&candidate.skills, p.fuzzy_threshold).unwrap();
        let posting = job(&["Python", "Kubernetes", "System design"], "Lead", "Remote", true);
        let (score, breakdown) = calculate_fit_score(&candidate, &skills, &posting, 1.0, &p);
        assert_eq!(breakdown.experience_match, 0.0);
        // 40 + 10 + 0 + 10
        assert_eq!(score, 60);
    }

    #[test]
    fn test_score_is_clamped_for_out_of_range_semantics() {
        let p = policy();
        let candidate = profile(&["Python"], ExperienceLevel::Lead, &["Remote"]);
        let skills = SkillMatcher::new(&candidate.skills, p.fuzzy_threshold).unwrap();
        let posting = job(&["Python"], "Entry", "Remote", true);

        let (high, _) = calculate_fit_score(&candidate, &skills, &posting, 7.5, &p);
        let (nan, breakdown) = calculate_fit_score(&candidate, &skills, &posting, f32::NAN, &p);
        let (low, _) = calculate_fit_score(&candidate, &skills, &posting, -3.0, &p);
        assert_eq!(high, 100);
        assert_eq!(breakdown.semantic, 0.0);
        assert_eq!(nan, 60);
        assert_eq!(low, 60);
    }

    #[test]
    fn test_score_is_monotonic_in_semantic_similarity() {
        let p = policy();
        let candidate = profile(&["Python", "SQL"], ExperienceLevel::Mid, &["Berlin"]);
        let skills = SkillMatcher::new(&candidate.skills, p.fuzzy_threshold).unwrap();
        let posting = job(&["Python", "Go", "AWS"], "Senior", "Paris", false);

        let mut previous = 0u8;
        for step in 0..=100 {
            let semantic = step as f32 / 100.0;
            let (score, _) = calculate_fit_score(&candidate, &skills, &posting, semantic, &p);
            assert!(score >= previous, "score dropped at semantic {}", semantic);
            assert!(score <= 100);
            previous = score;
        }
    }
}
