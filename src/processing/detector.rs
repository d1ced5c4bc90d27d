//! Ghost-job detection: stale or low-detail postings that are unlikely to hire

use crate::models::{GhostAssessment, Job};
use crate::policy::{GhostPolicy, CRITICAL_RISK_PREFIX};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static RELATIVE_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)\+?\s*(day|week|month)s?\s+ago$").expect("valid relative date regex"));

/// Age of a posting in whole days relative to `reference_date`.
///
/// Accepts ISO dates, RFC 3339 timestamps, naive timestamps and relative
/// phrases such as "3 days ago". Dates in the future count as age 0.
pub fn posting_age_days(posted_date: &str, reference_date: NaiveDate) -> Option<i64> {
    let raw = posted_date.trim();
    if raw.is_empty() {
        return None;
    }

    let lower = raw.to_lowercase();
    match lower.as_str() {
        "today" | "just posted" => return Some(0),
        "yesterday" => return Some(1),
        _ => {}
    }

    if let Some(caps) = RELATIVE_DATE_PATTERN.captures(&lower) {
        let count: i64 = caps[1].parse().ok()?;
        let unit = match &caps[2] {
            "week" => 7,
            "month" => 30,
            _ => 1,
        };
        return Some(count.saturating_mul(unit));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok().map(|d| d.date()))
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok().map(|d| d.date()))?;

    Some((reference_date - date).num_days().max(0))
}

fn is_thin_description(job: &Job, policy: &GhostPolicy) -> bool {
    let words = job.description.unicode_words().count();
    let requirements = job.requirements.iter().filter(|r| !r.trim().is_empty()).count();
    words < policy.min_description_words || words < requirements * policy.min_words_per_requirement
}

fn is_vague_location(job: &Job, policy: &GhostPolicy) -> bool {
    if job.is_remote {
        return false;
    }
    let location = job.location.trim().to_lowercase();
    policy.vague_locations.iter().any(|v| v.trim().eq_ignore_ascii_case(&location))
}

/// Score a posting's quality and flag likely ghost jobs.
///
/// Each signal subtracts its penalty from a perfect 1.0. Below the ghost
/// threshold the warning carries the critical prefix so the decision engine
/// overrides to Avoid; between the ghost and caution thresholds it is a
/// plain caution.
pub fn detect_ghost_job(job: &Job, policy: &GhostPolicy, reference_date: NaiveDate) -> GhostAssessment {
    let mut signals: Vec<String> = Vec::new();
    let mut penalty = 0.0f32;

    match posting_age_days(&job.posted_date, reference_date) {
        Some(age) if age > policy.stale_after_days => {
            penalty += policy.stale_penalty;
            signals.push(format!("posted {} days ago", age));
        }
        Some(_) => {}
        None => {
            penalty += policy.unknown_date_penalty;
            signals.push("no usable posting date".to_string());
        }
    }

    if is_thin_description(job, policy) {
        penalty += policy.thin_description_penalty;
        signals.push(format!(
            "thin description for {} requirements",
            job.requirements.iter().filter(|r| !r.trim().is_empty()).count()
        ));
    }

    if job.company_size.as_deref().map_or(true, |s| s.trim().is_empty()) {
        penalty += policy.missing_company_size_penalty;
        signals.push("company size not disclosed".to_string());
    }

    if is_vague_location(job, policy) {
        penalty += policy.vague_location_penalty;
        signals.push("vague location".to_string());
    }

    let quality_score = (1.0 - penalty).clamp(0.0, 1.0);
    let is_ghost = quality_score < policy.ghost_threshold;

    let warning = if is_ghost {
        Some(format!(
            "{} likely ghost job ({})",
            CRITICAL_RISK_PREFIX,
            signals.join(", ")
        ))
    } else if quality_score < policy.caution_threshold {
        Some(format!("Caution: posting may be stale or low-effort ({})", signals.join(", ")))
    } else {
        None
    };

    GhostAssessment {
        is_ghost,
        warning,
        quality_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn policy() -> GhostPolicy {
        Policy::default().ghost
    }

    fn detailed_description() -> String {
        "You will own the ingestion pipeline that feeds our analytics platform. ".repeat(6)
    }

    fn job(posted: &str, description: &str, requirements: usize, size: Option<&str>) -> Job {
        Job {
            job_id: "j1".to_string(),
            title: "Data Engineer".to_string(),
            company: "Acme".to_string(),
            description: description.to_string(),
            requirements: (0..requirements).map(|i| format!("Skill {}", i)).collect(),
            location: "Berlin".to_string(),
            experience_required: "Mid".to_string(),
            posted_date: posted.to_string(),
            company_size: size.map(|s| s.to_string()),
            is_remote: false,
        }
    }

    #[test]
    fn test_posting_age_formats() {
        let today = reference();
        assert_eq!(posting_age_days("2024-05-31", today), Some(1));
        assert_eq!(posting_age_days("2024-03-03T10:00:00Z", today), Some(90));
        assert_eq!(posting_age_days("2024-05-01T08:30:00", today), Some(31));
        assert_eq!(posting_age_days("3 days ago", today), Some(3));
        assert_eq!(posting_age_days("2 weeks ago", today), Some(14));
        assert_eq!(posting_age_days("30+ days ago", today), Some(30));
        assert_eq!(posting_age_days("today", today), Some(0));
        assert_eq!(posting_age_days("2024-07-01", today), Some(0));
        assert_eq!(posting_age_days("sometime", today), None);
        assert_eq!(posting_age_days("", today), None);
    }

    #[test]
    fn test_well_described_fresh_posting_is_clean() {
        let posting = job("2024-05-25", &detailed_description(), 3, Some("201-500"));
        let assessment = detect_ghost_job(&posting, &policy(), reference());

        assert!(!assessment.is_ghost);
        assert_eq!(assessment.warning, None);
        assert_eq!(assessment.quality_score, 1.0);
    }

    #[test]
    fn test_stale_thin_posting_without_company_size_is_ghost() {
        let posting = job(
            "2024-01-15",
            "Great opportunity. Apply now.",
            10,
            None,
        );
        let assessment = detect_ghost_job(&posting, &policy(), reference());

        assert!(assessment.is_ghost);
        assert!(assessment.quality_score < 0.5);
        assert!((assessment.quality_score - 0.2).abs() < 1e-5);
        let warning = assessment.warning.unwrap();
        assert!(warning.starts_with(CRITICAL_RISK_PREFIX));
        assert!(warning.contains("posted 138 days ago"));
        assert!(warning.contains("company size not disclosed"));
    }

    #[test]
    fn test_single_signal_yields_caution_not_ghost() {
        let posting = job("2024-01-15", &detailed_description(), 3, Some("Large"));
        let assessment = detect_ghost_job(&posting, &policy(), reference());

        assert!(!assessment.is_ghost);
        assert!((assessment.quality_score - 0.65).abs() < 1e-5);
        let warning = assessment.warning.unwrap();
        assert!(warning.starts_with("Caution:"));
        assert!(!warning.starts_with(CRITICAL_RISK_PREFIX));
    }

    #[test]
    fn test_unknown_date_and_vague_location() {
        let mut posting = job("", &detailed_description(), 2, Some("Large"));
        posting.location = "TBD".to_string();
        let assessment = detect_ghost_job(&posting, &policy(), reference());
        assert!((assessment.quality_score - 0.75).abs() < 1e-5);
        assert_eq!(assessment.warning, None);

        posting.is_remote = true;
        let remote = detect_ghost_job(&posting, &policy(), reference());
        assert!((remote.quality_score - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_quality_is_clamped_at_zero() {
        let mut rules = policy();
        rules.stale_penalty = 0.9;
        let posting = job("2020-01-01", "", 4, None);
        let assessment = detect_ghost_job(&posting, &rules, reference());
        assert_eq!(assessment.quality_score, 0.0);
        assert!(assessment.is_ghost);
    }
}
