//! Loading profiles, job datasets and resume files from disk

use crate::error::{ApplyLessError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use crate::models::{Job, Profile};
use log::{info, warn};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::fs;

/// A dataset file is either a bare array of jobs or `{ "jobs": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum JobDataset {
    List(Vec<Job>),
    Wrapped { jobs: Vec<Job> },
}

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read a candidate profile from JSON or TOML.
    ///
    /// A missing file is reported as `EmptyInput`: there is no profile to
    /// score against.
    pub async fn load_profile(&self, path: &Path) -> Result<Profile> {
        if !path.exists() {
            return Err(ApplyLessError::EmptyInput(format!("Profile not found: {}", path.display())));
        }

        let content = fs::read_to_string(path).await?;
        let profile: Profile = match FileType::from_path(path)? {
            FileType::Json => serde_json::from_str(&content)?,
            FileType::Toml => toml::from_str(&content)
                .map_err(|e| ApplyLessError::InvalidInput(format!("Invalid profile '{}': {}", path.display(), e)))?,
            _ => {
                return Err(ApplyLessError::UnsupportedFormat(format!(
                    "Profiles must be JSON or TOML: {}",
                    path.display()
                )))
            }
        };

        if profile.user_id.trim().is_empty() {
            return Err(ApplyLessError::InvalidInput("Profile has an empty user_id".to_string()));
        }

        info!("Loaded profile {} with {} skills", profile.user_id, profile.skills.len());
        Ok(profile)
    }

    /// Read the job collection from a JSON dataset file
    pub async fn load_jobs(&self, path: &Path) -> Result<Vec<Job>> {
        if !path.exists() {
            return Err(ApplyLessError::EmptyInput(format!("Job dataset not found: {}", path.display())));
        }
        if FileType::from_path(path)? != FileType::Json {
            return Err(ApplyLessError::UnsupportedFormat(format!(
                "Job datasets must be JSON: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).await?;
        let jobs = match serde_json::from_str::<JobDataset>(&content)? {
            JobDataset::List(jobs) | JobDataset::Wrapped { jobs } => jobs,
        };

        let mut seen = HashSet::new();
        for job in &jobs {
            if !seen.insert(job.job_id.as_str()) {
                warn!("Duplicate job id {} in {}", job.job_id, path.display());
            }
        }

        info!("Loaded {} jobs from {}", jobs.len(), path.display());
        Ok(jobs)
    }

    /// Extract a resume body from a PDF, text or Markdown file
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let key = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached) = self.cache.get(&key) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(ApplyLessError::InvalidInput(format!("File does not exist: {}", path.display())));
        }

        let file_type = FileType::from_path(path)?;
        if !file_type.is_document() {
            return Err(ApplyLessError::UnsupportedFormat(format!(
                "Unsupported resume file type: {}",
                path.display()
            )));
        }

        let text = match file_type {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => PlainTextExtractor.extract(path).await?,
            // Only Markdown is left after the document check
            _ => MarkdownExtractor.extract(path).await?,
        };

        if text.trim().is_empty() {
            return Err(ApplyLessError::EmptyInput(format!("No text found in {}", path.display())));
        }

        if self.enable_cache {
            self.cache.insert(key, text.clone());
        }

        Ok(text)
    }

    /// Fill the profile's resume text from a document on disk
    pub async fn attach_resume(&mut self, profile: &mut Profile, path: &Path) -> Result<()> {
        let text = self.extract_text(path).await?;
        info!("Attached {} characters of resume text to {}", text.chars().count(), profile.user_id);
        profile.resume_text = Some(text);
        Ok(())
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
