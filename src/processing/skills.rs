//! Skill coverage matching and the skill difficulty lookup

use crate::error::{ApplyLessError, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// Matches a candidate's skills against free-text job requirements.
///
/// A requirement is covered when a profile skill equals it, appears inside
/// it on word boundaries ("Python" covers "3+ years of Python"), contains
/// it on word boundaries, or is a close spelling variant of it.
pub struct SkillMatcher {
    matcher: Option<AhoCorasick>,
    skills: Vec<String>,
    fuzzy_threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    Tool,
    Language,
    Foundation,
    Soft,
    General,
}

impl SkillMatcher {
    pub fn new(skills: &[String], fuzzy_threshold: f32) -> Result<Self> {
        let mut skills: Vec<String> = skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Longest first so multi-word skills win over their fragments
        skills.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        skills.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        let matcher = if skills.is_empty() {
            None
        } else {
            let patterns: Vec<&str> = skills.iter().map(|s| s.as_str()).collect();
            Some(
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .match_kind(MatchKind::LeftmostLongest)
                    .build(&patterns)
                    .map_err(|e| ApplyLessError::Processing(format!("Failed to build skill matcher: {}", e)))?,
            )
        };

        Ok(Self {
            matcher,
            skills,
            fuzzy_threshold: fuzzy_threshold.clamp(0.0, 1.0),
        })
    }

    /// Return the profile skill that covers `requirement`, if any
    pub fn covering_skill(&self, requirement: &str) -> Option<&str> {
        let requirement = requirement.trim();
        if requirement.is_empty() {
            return None;
        }
        let requirement_lower = requirement.to_lowercase();

        if let Some(skill) = self.skills.iter().find(|s| s.to_lowercase() == requirement_lower) {
            return Some(skill.as_str());
        }

        if let Some(matcher) = &self.matcher {
            for mat in matcher.find_iter(requirement) {
                if is_word_bounded(requirement, mat.start(), mat.end()) {
                    return Some(self.skills[mat.pattern().as_usize()].as_str());
                }
            }
        }

        if let Some(skill) = self
            .skills
            .iter()
            .find(|s| contains_term(&s.to_lowercase(), &requirement_lower))
        {
            return Some(skill.as_str());
        }

        self.skills
            .iter()
            .map(|s| (s, jaro_winkler(&s.to_lowercase(), &requirement_lower) as f32))
            .filter(|(_, score)| *score >= self.fuzzy_threshold)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s.as_str())
    }

    /// Fraction of requirements covered; an empty list is vacuously satisfied
    pub fn overlap_ratio(&self, requirements: &[String]) -> f32 {
        let total = requirements.iter().filter(|r| !r.trim().is_empty()).count();
        if total == 0 {
            return 1.0;
        }
        let covered = requirements
            .iter()
            .filter(|r| !r.trim().is_empty())
            .filter(|r| self.covering_skill(r).is_some())
            .count();
        covered as f32 / total as f32
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }
}

/// Whether the byte range `[start, end)` of `text` sits on word boundaries
pub fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    let is_word = |c: char| c.is_alphanumeric();
    !before.map_or(false, is_word) && !after.map_or(false, is_word)
}

/// Count word-bounded occurrences of `term` in `haystack` (both lowercase)
pub fn count_term(haystack: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    haystack
        .match_indices(term)
        .filter(|(start, m)| is_word_bounded(haystack, *start, start + m.len()))
        .count()
}

pub fn contains_term(haystack: &str, term: &str) -> bool {
    count_term(haystack, term) > 0
}

impl SkillCategory {
    /// Classify a skill (or a requirement mentioning one) for learning estimates
    pub fn classify(skill: &str) -> Self {
        let lower = skill.to_lowercase();
        let hit = |terms: &[&str]| terms.iter().any(|t| contains_term(&lower, t));

        if hit(FOUNDATION_TERMS) {
            SkillCategory::Foundation
        } else if hit(LANGUAGE_TERMS) {
            SkillCategory::Language
        } else if hit(TOOL_TERMS) {
            SkillCategory::Tool
        } else if hit(SOFT_TERMS) {
            SkillCategory::Soft
        } else {
            SkillCategory::General
        }
    }

    pub fn learning_time(self) -> &'static str {
        match self {
            SkillCategory::Tool => "1-3 weeks",
            SkillCategory::Language => "1-3 months",
            SkillCategory::Foundation => "2-6 months",
            SkillCategory::Soft => "Ongoing practice (1-3 months)",
            SkillCategory::General => "2-6 weeks",
        }
    }
}

/// Placeholder resource references for closing a skill gap
pub fn learning_resources(skill: &str, category: SkillCategory) -> Vec<String> {
    let query = skill.split_whitespace().collect::<Vec<_>>().join("+");
    let mut resources = vec![format!("Official {} documentation", skill)];
    match category {
        SkillCategory::Tool | SkillCategory::General => {
            resources.push(format!("Hands-on tutorial: build a small project with {}", skill));
        }
        SkillCategory::Language => {
            resources.push(format!("Interactive {} exercises (e.g. Exercism track)", skill));
        }
        SkillCategory::Foundation => {
            resources.push(format!("Structured course covering {} fundamentals", skill));
        }
        SkillCategory::Soft => {
            resources.push(format!("Mentorship or workshop focused on {}", skill));
        }
    }
    resources.push(format!("https://www.coursera.org/search?query={}", query));
    resources
}

const TOOL_TERMS: &[&str] = &[
    // Frameworks
    "react", "vue", "angular", "svelte", "django", "flask", "fastapi", "spring", "rails",
    "express", "node.js", "nextjs", "next.js", "tailwind", "bootstrap", "jquery",
    "tensorflow", "pytorch", "sklearn", "scikit-learn", "pandas", "numpy", "spark",
    // Infrastructure and tooling
    "docker", "kubernetes", "terraform", "ansible", "jenkins", "gitlab", "github", "git",
    "ci/cd", "cicd", "aws", "azure", "gcp", "redis", "elasticsearch", "nginx", "kafka",
    "airflow", "postgresql", "postgres", "mysql", "mongodb", "dynamodb", "sqlite",
    "graphql", "grpc", "rest", "jira", "figma", "tableau", "excel", "linux", "webpack",
    "jest", "pytest", "selenium", "cypress",
];

const LANGUAGE_TERMS: &[&str] = &[
    "rust", "python", "javascript", "typescript", "java", "c++", "c#", "go", "golang",
    "ruby", "php", "swift", "kotlin", "scala", "haskell", "r", "matlab", "sql", "html",
    "css", "bash",
];

const FOUNDATION_TERMS: &[&str] = &[
    "machine learning", "deep learning", "statistics", "algorithms", "data structures",
    "system design", "distributed systems", "computer science", "security", "networking",
    "cloud architecture", "software architecture", "microservices", "nlp",
    "computer vision", "data modeling", "mathematics", "linear algebra",
];

const SOFT_TERMS: &[&str] = &[
    "leadership", "communication", "teamwork", "problem solving", "critical thinking",
    "mentoring", "coaching", "presentation", "negotiation", "stakeholder management",
    "project management", "collaboration", "time management",
];
