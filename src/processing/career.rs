//! Career impact of taking a role, from the level delta and the fit score

use crate::error::{ApplyLessError, Result};
use crate::models::{CareerImpact, Job, Profile};
use crate::policy::CareerPolicy;
use crate::processing::scoring::required_level;

/// Levels the job asks for above (positive) or below (negative) the candidate
pub fn level_delta(job: &Job, profile: &Profile) -> i8 {
    required_level(&job.experience_required).rank() - profile.experience_level.rank()
}

/// Look the (level delta, fit) pair up in the career table.
///
/// A table with no row for the pair is a configuration fault and is reported
/// as a `Policy` error.
pub fn assess_career_impact(job: &Job, profile: &Profile, fit_score: u8, policy: &CareerPolicy) -> Result<CareerImpact> {
    let delta = level_delta(job, profile);
    policy.lookup(delta, fit_score).ok_or_else(|| {
        ApplyLessError::Policy(format!(
            "career impact table has no rule for level delta {} at fit {}",
            delta, fit_score
        ))
    })
}
