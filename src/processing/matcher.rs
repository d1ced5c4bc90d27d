//! Semantic matching between a profile and job postings

use crate::config::MatchingConfig;
use crate::error::{ApplyLessError, Result};
use crate::models::{Job, Profile};
use crate::processing::embeddings::{cosine_similarity, ProviderHandle};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Embeds profiles and jobs through the shared provider and ranks jobs by
/// cosine similarity.
///
/// Embeddings are memoized by entity id; an entry is reused only while the
/// entity's embedding text hashes to the same value, so an edited profile
/// or job is re-embedded automatically.
pub struct SemanticMatcher {
    provider: ProviderHandle,
    cache: RwLock<HashMap<String, CachedEmbedding>>,
    enable_cache: bool,
    resume_excerpt_chars: usize,
}

#[derive(Clone)]
struct CachedEmbedding {
    content_hash: String,
    embedding: Arc<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub cache_size: usize,
    pub model_name: String,
    pub enabled: bool,
}

impl SemanticMatcher {
    pub fn new(provider: ProviderHandle, config: &MatchingConfig) -> Self {
        Self {
            provider,
            cache: RwLock::new(HashMap::new()),
            enable_cache: config.enable_caching,
            resume_excerpt_chars: config.resume_excerpt_chars,
        }
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.provider.embed(text)
    }

    pub fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        cosine_similarity(a, b)
    }

    /// Representative text for a profile: skills (sorted, weighted by
    /// repetition), preferred roles, career goals and a resume excerpt
    pub fn profile_text(&self, profile: &Profile) -> String {
        let mut skills: Vec<&str> = profile
            .skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        skills.sort_by_key(|s| s.to_lowercase());
        skills.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        let skills = skills.join(", ");

        let mut text = format!(
            "Skills: {}. Core skills: {}. Preferred roles: {}. Career goals: {}",
            skills,
            skills,
            profile.preferred_roles.join(", "),
            profile.career_goals.trim()
        );

        if let Some(resume) = profile.resume_text.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            let excerpt: String = resume.chars().take(self.resume_excerpt_chars).collect();
            text.push_str(". Resume: ");
            text.push_str(&excerpt);
        }

        text
    }

    /// Representative text for a job: title (twice), requirements, description
    pub fn job_text(&self, job: &Job) -> String {
        format!(
            "Job title: {}. Role: {}. Requirements: {}. {}",
            job.title.trim(),
            job.title.trim(),
            job.requirements.join(", "),
            job.description.trim()
        )
    }

    pub fn create_user_embedding(&self, profile: &Profile) -> Result<Arc<Vec<f32>>> {
        let text = self.profile_text(profile);
        self.cached_embedding(&format!("profile:{}", profile.user_id), &text)
    }

    pub fn create_job_embedding(&self, job: &Job) -> Result<Arc<Vec<f32>>> {
        let text = self.job_text(job);
        self.cached_embedding(&format!("job:{}", job.job_id), &text)
    }

    /// Semantic similarity of a single (profile, job) pair
    pub fn score(&self, profile: &Profile, job: &Job) -> Result<f32> {
        let user_embedding = self.create_user_embedding(profile)?;
        let job_embedding = self.create_job_embedding(job)?;
        self.similarity(&user_embedding, &job_embedding)
    }

    /// Rank jobs by descending similarity; ties go to the smaller job id
    pub fn rank_jobs<'a>(&self, profile: &Profile, jobs: &'a [Job]) -> Result<Vec<(&'a Job, f32)>> {
        if jobs.is_empty() {
            return Err(ApplyLessError::EmptyInput("no jobs to rank".to_string()));
        }

        let user_embedding = self.create_user_embedding(profile)?;
        let job_embeddings = self.job_embeddings(jobs)?;

        let mut ranked = jobs
            .iter()
            .zip(job_embeddings.iter())
            .map(|(job, embedding)| Ok((job, self.similarity(&user_embedding, embedding)?)))
            .collect::<Result<Vec<_>>>()?;

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.job_id.cmp(&b.0.job_id)));

        debug!("Ranked {} jobs for profile {}", ranked.len(), profile.user_id);
        Ok(ranked)
    }

    /// Embeddings for every job, batching the ones missing from the memo
    fn job_embeddings(&self, jobs: &[Job]) -> Result<Vec<Arc<Vec<f32>>>> {
        let entries: Vec<(String, String, String)> = jobs
            .iter()
            .map(|job| {
                let text = self.job_text(job);
                (format!("job:{}", job.job_id), content_hash(&text), text)
            })
            .collect();

        let mut resolved: Vec<Option<Arc<Vec<f32>>>> = entries
            .iter()
            .map(|(key, hash, _)| self.lookup(key, hash))
            .collect();

        let missing: Vec<usize> = (0..entries.len()).filter(|i| resolved[*i].is_none()).collect();
        if !missing.is_empty() {
            let texts: Vec<String> = missing.iter().map(|i| entries[*i].2.clone()).collect();
            let embeddings = self.provider.embed_batch(&texts)?;
            if embeddings.len() != texts.len() {
                return Err(ApplyLessError::Embedding(format!(
                    "Provider returned {} embeddings for {} texts",
                    embeddings.len(),
                    texts.len()
                )));
            }
            for (i, embedding) in missing.into_iter().zip(embeddings) {
                let (key, hash, _) = &entries[i];
                let embedding = Arc::new(embedding);
                self.store(key, hash, Arc::clone(&embedding));
                resolved[i] = Some(embedding);
            }
        }

        resolved
            .into_iter()
            .map(|e| e.ok_or_else(|| ApplyLessError::Processing("job embedding missing after batch".to_string())))
            .collect()
    }

    fn cached_embedding(&self, key: &str, text: &str) -> Result<Arc<Vec<f32>>> {
        let hash = content_hash(text);
        if let Some(embedding) = self.lookup(key, &hash) {
            debug!("Embedding cache hit for {}", key);
            return Ok(embedding);
        }

        let embedding = Arc::new(self.provider.embed(text)?);
        self.store(key, &hash, Arc::clone(&embedding));
        Ok(embedding)
    }

    fn lookup(&self, key: &str, hash: &str) -> Option<Arc<Vec<f32>>> {
        if !self.enable_cache {
            return None;
        }
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache
            .get(key)
            .filter(|entry| entry.content_hash == hash)
            .map(|entry| Arc::clone(&entry.embedding))
    }

    fn store(&self, key: &str, hash: &str, embedding: Arc<Vec<f32>>) {
        if !self.enable_cache {
            return;
        }
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            key.to_string(),
            CachedEmbedding {
                content_hash: hash.to_string(),
                embedding,
            },
        );
    }

    /// Forget a memoized profile or job embedding
    pub fn invalidate_profile(&self, user_id: &str) {
        self.remove(&format!("profile:{}", user_id));
    }

    pub fn invalidate_job(&self, job_id: &str) {
        self.remove(&format!("job:{}", job_id));
    }

    fn remove(&self, key: &str) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.remove(key);
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            cache_size: cache.len(),
            model_name: self.provider.model_name().to_string(),
            enabled: self.enable_cache,
        }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}

fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperienceLevel;
    use crate::processing::embeddings::EmbeddingProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Bag-of-keywords embedding over a fixed vocabulary
    struct KeywordProvider {
        calls: AtomicUsize,
    }

    const VOCAB: [&str; 5] = ["python", "sql", "docker", "marketing", "design"];

    impl EmbeddingProvider for KeywordProvider {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let lower = text.to_lowercase();
            Ok(VOCAB.iter().map(|w| lower.matches(w).count() as f32).collect())
        }

        fn model_name(&self) -> &str {
            "keywords"
        }
    }

    fn matcher() -> (SemanticMatcher, Arc<KeywordProvider>) {
        let provider = Arc::new(KeywordProvider { calls: AtomicUsize::new(0) });
        let config = MatchingConfig { enable_caching: true, resume_excerpt_chars: 100 };
        (SemanticMatcher::new(provider.clone(), &config), provider)
    }

    fn profile() -> Profile {
        Profile {
            user_id: "u1".to_string(),
            skills: vec!["SQL".to_string(), "Python".to_string()],
            experience_years: 3,
            experience_level: ExperienceLevel::Mid,
            preferred_roles: vec!["Data Engineer".to_string()],
            preferred_locations: vec!["Remote".to_string()],
            career_goals: "Build data platforms".to_string(),
            resume_text: None,
        }
    }

    fn job(id: &str, title: &str, requirements: &[&str]) -> Job {
        Job {
            job_id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            requirements: requirements.iter().map(|s| s.to_string()).collect(),
            location: "Remote".to_string(),
            experience_required: "Mid".to_string(),
            posted_date: "2026-10-01".to_string(),
            company_size: None,
            is_remote: true,
        }
    }

    #[test]
    fn test_profile_text_is_order_independent() {
        let (matcher, _) = matcher();
        let mut reordered = profile();
        reordered.skills.reverse();
        assert_eq!(matcher.profile_text(&profile()), matcher.profile_text(&reordered));
    }

    #[test]
    fn test_profile_text_includes_resume_excerpt() {
        let (matcher, _) = matcher();
        let mut with_resume = profile();
        with_resume.resume_text = Some("x".repeat(500));
        let text = matcher.profile_text(&with_resume);
        assert!(text.contains("Resume: "));
        assert!(text.ends_with(&"x".repeat(100)));
        assert!(!text.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_rank_jobs_orders_by_similarity() {
        let (matcher, _) = matcher();
        let jobs = vec![
            job("j1", "Marketing Lead", &["Marketing", "Design"]),
            job("j2", "Data Engineer", &["Python", "SQL"]),
            job("j3", "Platform Engineer", &["Python", "Docker"]),
        ];
        let ranked = matcher.rank_jobs(&profile(), &jobs).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|(j, _)| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["j2", "j3", "j1"]);
        assert!(ranked.iter().all(|(_, s)| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn test_rank_jobs_breaks_ties_by_job_id() {
        let (matcher, _) = matcher();
        let jobs = vec![
            job("b", "Data Engineer", &["Python", "SQL"]),
            job("a", "Data Engineer", &["Python", "SQL"]),
        ];
        let ranked = matcher.rank_jobs(&profile(), &jobs).unwrap();
        assert_eq!(ranked[0].0.job_id, "a");
        assert_eq!(ranked[1].0.job_id, "b");
    }

    #[test]
    fn test_rank_jobs_is_idempotent_and_memoized() {
        let (matcher, provider) = matcher();
        let jobs = vec![
            job("j1", "Data Engineer", &["Python"]),
            job("j2", "Analyst", &["SQL"]),
        ];
        let first = matcher.rank_jobs(&profile(), &jobs).unwrap();
        let calls_after_first = provider.calls.load(Ordering::SeqCst);
        let second = matcher.rank_jobs(&profile(), &jobs).unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), calls_after_first);
        assert_eq!(matcher.cache_stats().cache_size, 3);
    }

    #[test]
    fn test_changed_job_is_reembedded() {
        let (matcher, provider) = matcher();
        let original = job("j1", "Data Engineer", &["Python"]);
        matcher.create_job_embedding(&original).unwrap();

        let mut edited = original.clone();
        edited.requirements.push("Docker".to_string());
        matcher.create_job_embedding(&edited).unwrap();
        matcher.create_job_embedding(&edited).unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(matcher.cache_stats().cache_size, 1);
    }

    #[test]
    fn test_invalidate_job_forces_recompute() {
        let (matcher, provider) = matcher();
        let posting = job("j1", "Data Engineer", &["Python"]);
        matcher.create_job_embedding(&posting).unwrap();
        matcher.invalidate_job("j1");
        matcher.create_job_embedding(&posting).unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rank_jobs_rejects_empty_collection() {
        let (matcher, _) = matcher();
        assert!(matches!(
            matcher.rank_jobs(&profile(), &[]),
            Err(ApplyLessError::EmptyInput(_))
        ));
    }
}
