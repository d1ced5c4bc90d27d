//! Composition of the matcher and rule components into `JobMatch` results

use crate::error::{ApplyLessError, Result};
use crate::models::{Decision, DecisionCounts, FeedStats, Job, JobFeed, JobMatch, Profile};
use crate::policy::Policy;
use crate::processing::career::assess_career_impact;
use crate::processing::competition::estimate_competition;
use crate::processing::decision::make_decision;
use crate::processing::detector::detect_ghost_job;
use crate::processing::explainer::generate_explanation;
use crate::processing::matcher::SemanticMatcher;
use crate::processing::scoring::calculate_fit_score;
use crate::processing::skills::SkillMatcher;
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};

/// Scores profiles against job collections.
///
/// Holds no per-request state: every call takes the profile and jobs
/// explicitly. The only shared pieces are the provider behind the matcher
/// and its embedding memo.
pub struct MatchEngine {
    matcher: SemanticMatcher,
    policy: Policy,
    reference_date: NaiveDate,
}

impl MatchEngine {
    pub fn new(matcher: SemanticMatcher, policy: Policy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            matcher,
            policy,
            reference_date: Local::now().date_naive(),
        })
    }

    /// Pin the date posting ages are measured against
    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }

    pub fn matcher(&self) -> &SemanticMatcher {
        &self.matcher
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Jobs ordered by semantic similarity to the profile
    pub fn rank_jobs<'a>(&self, profile: &Profile, jobs: &'a [Job]) -> Result<Vec<(&'a Job, f32)>> {
        self.matcher.rank_jobs(profile, jobs)
    }

    pub fn score_one(&self, profile: &Profile, job: &Job) -> Result<JobMatch> {
        let skills = self.skill_matcher(profile)?;
        let semantic = self.matcher.score(profile, job)?;
        self.build_match(profile, &skills, job, semantic)
    }

    /// Score every job, best fit first.
    ///
    /// This intentionally differs from `rank_jobs`: a job that reads closest
    /// to the profile can still fall behind one with better skill, experience
    /// or location fit. Equal fit scores keep the semantic ranking order,
    /// which itself breaks ties by job id, so the output order is fully
    /// deterministic.
    pub fn score_all(&self, profile: &Profile, jobs: &[Job]) -> Result<Vec<JobMatch>> {
        let ranked = self.rank_jobs(profile, jobs)?;
        let skills = self.skill_matcher(profile)?;

        let mut matches = ranked
            .into_iter()
            .map(|(job, semantic)| self.build_match(profile, &skills, job, semantic))
            .collect::<Result<Vec<_>>>()?;
        matches.sort_by(|a, b| b.fit_score.cmp(&a.fit_score));

        info!("Scored {} jobs for profile {}", matches.len(), profile.user_id);
        Ok(matches)
    }

    /// One 1-based page of the scored feed, optionally restricted to a decision
    pub fn feed(
        &self,
        profile: &Profile,
        jobs: &[Job],
        page: usize,
        page_size: usize,
        decision_filter: Option<Decision>,
    ) -> Result<JobFeed> {
        if page == 0 || page_size == 0 {
            return Err(ApplyLessError::InvalidInput(format!(
                "page and page size must be at least 1, got page {} size {}",
                page, page_size
            )));
        }

        let matches: Vec<JobMatch> = self
            .score_all(profile, jobs)?
            .into_iter()
            .filter(|m| decision_filter.map_or(true, |d| m.decision == d))
            .collect();

        let total_count = matches.len();
        let jobs = matches
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Ok(JobFeed {
            jobs,
            total_count,
            page,
            page_size,
        })
    }

    pub fn job_detail(&self, profile: &Profile, jobs: &[Job], job_id: &str) -> Result<JobMatch> {
        let job = jobs
            .iter()
            .find(|j| j.job_id == job_id)
            .ok_or_else(|| ApplyLessError::InvalidInput(format!("Job not found: {}", job_id)))?;
        self.score_one(profile, job)
    }

    /// Decision distribution over the whole collection
    pub fn stats(&self, profile: &Profile, jobs: &[Job]) -> Result<FeedStats> {
        let matches = self.score_all(profile, jobs)?;
        Ok(summarize(&matches))
    }

    fn skill_matcher(&self, profile: &Profile) -> Result<SkillMatcher> {
        SkillMatcher::new(&profile.skills, self.policy.scoring.fuzzy_threshold)
    }

    fn build_match(&self, profile: &Profile, skills: &SkillMatcher, job: &Job, semantic: f32) -> Result<JobMatch> {
        let policy = &self.policy;
        let (fit_score, score_breakdown) = calculate_fit_score(profile, skills, job, semantic, &policy.scoring);
        let mut explanation = generate_explanation(profile, skills, job, fit_score, &score_breakdown, policy);

        // The ghost warning must lead the risk list before the decision reads it
        let ghost = detect_ghost_job(job, &policy.ghost, self.reference_date);
        if let Some(warning) = &ghost.warning {
            explanation.risk_factors.retain(|r| r != warning);
            explanation.risk_factors.insert(0, warning.clone());
        }
        if ghost.is_ghost {
            warn!("{} ({}) looks like a ghost job, quality {:.2}", job.job_id, job.company, ghost.quality_score);
        }

        let (decision, decision_reason) = make_decision(
            fit_score,
            profile,
            job,
            &explanation.missing_skills,
            &explanation.risk_factors,
            &score_breakdown,
            policy,
        )?;
        let competition_level = estimate_competition(job, fit_score, &policy.competition);
        let career_impact = assess_career_impact(job, profile, fit_score, &policy.career)?;

        debug!(
            "{}: semantic {:.3}, fit {}, decision {}",
            job.job_id, score_breakdown.semantic, fit_score, decision
        );

        Ok(JobMatch {
            job: job.clone(),
            fit_score,
            decision,
            decision_reason,
            explanation,
            competition_level,
            career_impact,
            score_breakdown,
            posting_quality: ghost.quality_score,
        })
    }
}

/// Counts per decision plus the headline recommendation
pub fn summarize(matches: &[JobMatch]) -> FeedStats {
    let mut decisions = DecisionCounts::default();
    for m in matches {
        decisions.record(m.decision);
    }

    FeedStats {
        total_jobs: matches.len(),
        recommendation: format!("Focus on the {} jobs marked 'Apply'", decisions.apply),
        decisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchingConfig;
    use crate::models::{CareerImpact, ExperienceLevel};
    use crate::policy::CRITICAL_RISK_PREFIX;
    use crate::processing::embeddings::EmbeddingProvider;
    use std::sync::Arc;

    /// Profiles embed to [1, 0] and jobs to [s, sqrt(1 - s^2)], so every
    /// job's semantic similarity is the `s` it was registered with
    struct FixedSimilarityProvider {
        similarities: Vec<(String, f32)>,
    }

    impl EmbeddingProvider for FixedSimilarityProvider {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.starts_with("Skills:") {
                return Ok(vec![1.0, 0.0]);
            }
            let s = self
                .similarities
                .iter()
                .find(|(title, _)| text.starts_with(&format!("Job title: {}.", title)))
                .map_or(0.5, |(_, s)| *s);
            Ok(vec![s, (1.0 - s * s).max(0.0).sqrt()])
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn engine(similarities: &[(&str, f32)]) -> MatchEngine {
        let provider = Arc::new(FixedSimilarityProvider {
            similarities: similarities.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
        });
        let config = MatchingConfig { enable_caching: true, resume_excerpt_chars: 200 };
        MatchEngine::new(SemanticMatcher::new(provider, &config), Policy::default())
            .unwrap()
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn profile() -> Profile {
        Profile {
            user_id: "u1".to_string(),
            skills: vec!["Python".to_string(), "SQL".to_string()],
            experience_years: 3,
            experience_level: ExperienceLevel::Mid,
            preferred_roles: vec!["Data Engineer".to_string()],
            preferred_locations: vec!["Remote".to_string()],
            career_goals: String::new(),
            resume_text: None,
        }
    }

    fn job(id: &str, title: &str, requirements: &[&str]) -> Job {
        Job {
            job_id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            description: "Build and operate the data platform that powers reporting for every team. ".repeat(5),
            requirements: requirements.iter().map(|s| s.to_string()).collect(),
            location: "Remote".to_string(),
            experience_required: "Mid".to_string(),
            posted_date: "2024-05-28".to_string(),
            company_size: Some("201-500".to_string()),
            is_remote: true,
        }
    }

    #[test]
    fn test_one_missing_skill_waits() {
        let engine = engine(&[("Data Engineer", 0.6)]);
        let result = engine
            .score_one(&profile(), &job("j1", "Data Engineer", &["Python", "SQL", "Docker"]))
            .unwrap();

        assert_eq!(result.fit_score, 74);
        assert_eq!(result.decision, Decision::Wait);
        assert_eq!(result.explanation.missing_skills, vec!["Docker"]);
        assert!(result.decision_reason.contains("Docker"));
        assert_eq!(result.career_impact, CareerImpact::Neutral);
    }

    #[test]
    fn test_full_coverage_applies() {
        let engine = engine(&[("Analytics Engineer", 0.9)]);
        let result = engine
            .score_one(&profile(), &job("j1", "Analytics Engineer", &["Python", "SQL"]))
            .unwrap();

        assert_eq!(result.fit_score, 96);
        assert_eq!(result.decision, Decision::Apply);
        assert_eq!(result.posting_quality, 1.0);
    }

    #[test]
    fn test_ghost_warning_leads_and_forces_avoid() {
        let engine = engine(&[("Analytics Engineer", 0.9)]);
        let mut posting = job("j1", "Analytics Engineer", &["Python", "SQL"]);
        posting.posted_date = "2023-11-01".to_string();
        posting.description = "Great team. Apply today.".to_string();
        posting.company_size = None;

        let result = engine.score_one(&profile(), &posting).unwrap();
        assert!(result.explanation.risk_factors[0].starts_with(CRITICAL_RISK_PREFIX));
        assert!(result.explanation.risk_factors[0].contains("ghost"));
        assert_eq!(result.decision, Decision::Avoid);
        assert!(result.posting_quality < 0.5);
    }

    #[test]
    fn test_feed_paginates_and_filters() {
        let engine = engine(&[("Strong", 0.95), ("Partial", 0.6), ("Weak", 0.0)]);
        let mut weak = job("j3", "Weak", &["Figma", "Sketch", "Illustrator"]);
        weak.is_remote = false;
        weak.location = "Tokyo".to_string();
        let jobs = vec![
            job("j1", "Strong", &["Python", "SQL"]),
            job("j2", "Partial", &["Python", "SQL", "Docker"]),
            weak,
        ];

        let first = engine.feed(&profile(), &jobs, 1, 2, None).unwrap();
        assert_eq!(first.total_count, 3);
        assert_eq!(first.jobs.len(), 2);
        assert_eq!(first.jobs[0].job.job_id, "j1");
        assert_eq!(first.jobs[1].job.job_id, "j2");

        let second = engine.feed(&profile(), &jobs, 2, 2, None).unwrap();
        assert_eq!(second.jobs.len(), 1);
        assert_eq!(second.jobs[0].job.job_id, "j3");

        let beyond = engine.feed(&profile(), &jobs, 5, 2, None).unwrap();
        assert!(beyond.jobs.is_empty());
        assert_eq!(beyond.total_count, 3);

        let waits = engine.feed(&profile(), &jobs, 1, 20, Some(Decision::Wait)).unwrap();
        assert_eq!(waits.total_count, 1);
        assert_eq!(waits.jobs[0].job.job_id, "j2");

        assert!(matches!(
            engine.feed(&profile(), &jobs, 0, 20, None),
            Err(ApplyLessError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_fit_order_overrides_semantic_order() {
        let engine = engine(&[("Close", 0.95), ("Covered", 0.7)]);
        let jobs = vec![
            job("j1", "Close", &["Rust", "Go", "Kafka"]),
            job("j2", "Covered", &["Python", "SQL"]),
        ];

        let semantic: Vec<&str> = engine
            .rank_jobs(&profile(), &jobs)
            .unwrap()
            .into_iter()
            .map(|(job, _)| job.job_id.as_str())
            .collect();
        assert_eq!(semantic, vec!["j1", "j2"]);

        let scored = engine.score_all(&profile(), &jobs).unwrap();
        assert_eq!(scored[0].job.job_id, "j2");
        assert_eq!(scored[0].fit_score, 88);
        assert_eq!(scored[1].job.job_id, "j1");
        assert_eq!(scored[1].fit_score, 68);
    }

    #[test]
    fn test_stats_and_detail() {
        let engine = engine(&[("Strong", 0.95), ("Partial", 0.6)]);
        let jobs = vec![
            job("j1", "Strong", &["Python", "SQL"]),
            job("j2", "Partial", &["Python", "SQL", "Docker"]),
        ];

        let stats = engine.stats(&profile(), &jobs).unwrap();
        assert_eq!(stats.total_jobs, 2);
        assert_eq!(stats.decisions.apply, 1);
        assert_eq!(stats.decisions.wait, 1);
        assert_eq!(stats.recommendation, "Focus on the 1 jobs marked 'Apply'");

        let detail = engine.job_detail(&profile(), &jobs, "j2").unwrap();
        assert_eq!(detail.job.job_id, "j2");
        assert!(matches!(
            engine.job_detail(&profile(), &jobs, "missing"),
            Err(ApplyLessError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_collection_is_rejected() {
        let engine = engine(&[]);
        assert!(matches!(engine.score_all(&profile(), &[]), Err(ApplyLessError::EmptyInput(_))));
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let provider = Arc::new(FixedSimilarityProvider { similarities: vec![] });
        let config = MatchingConfig { enable_caching: false, resume_excerpt_chars: 0 };
        let mut policy = Policy::default();
        policy.scoring.location_weight = 0.5;
        assert!(MatchEngine::new(SemanticMatcher::new(provider, &config), policy).is_err());
    }
}
