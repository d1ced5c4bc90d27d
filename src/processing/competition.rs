//! Applicant competition estimate from posting attractiveness proxies

use crate::models::{CompetitionLevel, Job};
use crate::policy::CompetitionPolicy;
use crate::processing::skills::contains_term;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADCOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,]*)\s*(?:\+|-\s*(\d[\d,]*))?").expect("valid headcount regex"));

/// Rough company size bucket parsed from the free-text `company_size` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

pub fn company_size(raw: &str, policy: &CompetitionPolicy) -> Option<CompanySize> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    if let Some(caps) = HEADCOUNT_PATTERN.captures(&lower) {
        let parse = |m: regex::Match<'_>| m.as_str().replace(',', "").parse::<u32>().ok();
        // Ranges are bucketed by their upper bound
        let headcount = caps.get(2).and_then(parse).or_else(|| caps.get(1).and_then(parse));
        if let Some(headcount) = headcount {
            return Some(if headcount >= policy.large_company_min_employees {
                CompanySize::Large
            } else if headcount >= policy.medium_company_min_employees {
                CompanySize::Medium
            } else {
                CompanySize::Small
            });
        }
    }

    if ["large", "enterprise", "corporation", "big"].iter().any(|k| contains_term(&lower, k)) {
        Some(CompanySize::Large)
    } else if ["medium", "mid-size", "midsize", "mid-sized", "scaleup", "scale-up"]
        .iter()
        .any(|k| contains_term(&lower, k))
    {
        Some(CompanySize::Medium)
    } else if ["small", "startup", "start-up", "boutique"].iter().any(|k| contains_term(&lower, k)) {
        Some(CompanySize::Small)
    } else {
        None
    }
}

/// Attractiveness points the posting collects under the competition table
pub fn attractiveness_points(job: &Job, policy: &CompetitionPolicy) -> u8 {
    let title = job.title.to_lowercase();
    let mut points = 0u8;

    if job.is_remote {
        points = points.saturating_add(policy.remote_points);
    }

    match job.company_size.as_deref().and_then(|s| company_size(s, policy)) {
        Some(CompanySize::Large) => points = points.saturating_add(policy.large_company_points),
        Some(CompanySize::Medium) => points = points.saturating_add(policy.medium_company_points),
        Some(CompanySize::Small) | None => {}
    }

    if policy.high_demand_titles.iter().any(|t| contains_term(&title, &t.to_lowercase())) {
        points = points.saturating_add(policy.high_demand_title_points);
    }

    if policy.entry_title_keywords.iter().any(|k| contains_term(&title, &k.to_lowercase())) {
        points = points.saturating_add(policy.entry_title_points);
    }

    points
}

/// Estimate competition for a posting.
///
/// The candidate's fit only resolves postings sitting exactly on the
/// Medium/High boundary; it never moves a clear-cut posting.
pub fn estimate_competition(job: &Job, fit_score: u8, policy: &CompetitionPolicy) -> CompetitionLevel {
    policy.level_for(attractiveness_points(job, policy), fit_score)
}
