//! Report payloads handed to the formatters

use crate::models::{FeedStats, JobFeed, JobMatch};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What a CLI command produced, plus where it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub body: ReportBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportBody {
    Feed(JobFeed),
    Detail(Box<JobMatch>),
    Stats(FeedStats),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub profile_id: String,
    pub embedding_model: String,
    /// Date posting ages were measured against
    pub reference_date: NaiveDate,
}

impl ReportMetadata {
    pub fn new(profile_id: &str, embedding_model: &str, reference_date: NaiveDate) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            profile_id: profile_id.to_string(),
            embedding_model: embedding_model.to_string(),
            reference_date,
        }
    }
}

impl Report {
    pub fn feed(metadata: ReportMetadata, feed: JobFeed) -> Self {
        Self { metadata, body: ReportBody::Feed(feed) }
    }

    pub fn detail(metadata: ReportMetadata, job_match: JobMatch) -> Self {
        Self { metadata, body: ReportBody::Detail(Box::new(job_match)) }
    }

    pub fn stats(metadata: ReportMetadata, stats: FeedStats) -> Self {
        Self { metadata, body: ReportBody::Stats(stats) }
    }

    /// Short label used in suggested file names
    pub fn kind(&self) -> &'static str {
        match self.body {
            ReportBody::Feed(_) => "feed",
            ReportBody::Detail(_) => "job",
            ReportBody::Stats(_) => "stats",
        }
    }
}
