//! CLI interface for the job fit engine

use crate::config::OutputFormat;
use crate::models::Decision;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "applyless")]
#[command(version)]
#[command(about = "Explainable job fit scoring with Apply / Wait / Skip / Avoid decisions")]
#[command(long_about = "Rank job postings against a candidate profile using local embeddings, skill coverage and rule-based checks for competition, career impact and ghost jobs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Inputs every scoring command needs
#[derive(Args, Debug, Clone)]
pub struct MatchArgs {
    /// Candidate profile (JSON or TOML)
    #[arg(short, long)]
    pub profile: PathBuf,

    /// Job dataset (JSON array of postings)
    #[arg(short, long)]
    pub jobs: PathBuf,

    /// Resume file (PDF, TXT, MD) used to enrich the profile
    #[arg(short, long)]
    pub resume: Option<PathBuf>,

    /// Embedding model to use instead of the configured default
    #[arg(short, long)]
    pub embedding: Option<String>,

    /// Measure posting ages against this date (YYYY-MM-DD) instead of today
    #[arg(long, value_parser = parse_reference_date)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format: console, json, markdown
    #[arg(short, long, value_parser = parse_output_format)]
    pub output: Option<OutputFormat>,

    /// Show score breakdowns and learning resources
    #[arg(short, long)]
    pub detailed: bool,

    /// Save output to file
    #[arg(short, long)]
    pub save: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ranked, paginated job feed with a decision for every posting
    Feed {
        #[command(flatten)]
        inputs: MatchArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Jobs per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Only show jobs with this decision: apply, wait, skip, avoid
        #[arg(long, value_parser = parse_decision)]
        decision: Option<Decision>,
    },

    /// Full match detail for a single job
    Job {
        /// Job id from the dataset
        job_id: String,

        #[command(flatten)]
        inputs: MatchArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Decision counts across the whole dataset
    Stats {
        #[command(flatten)]
        inputs: MatchArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Version, embedding model and dataset summary
    Status {
        /// Job dataset to count
        #[arg(short, long)]
        jobs: Option<PathBuf>,
    },

    /// Embedding model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download an embedding model
    Download {
        /// Model name or HuggingFace repo ID
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a downloaded model
    Remove {
        /// Model name to remove
        model: String,
    },

    /// Show model information
    Info {
        /// Model name
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

pub fn parse_decision(value: &str) -> Result<Decision, String> {
    Decision::parse(value).ok_or_else(|| format!("Invalid decision: {}. Supported: apply, wait, skip, avoid", value))
}

pub fn parse_reference_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {} (expected YYYY-MM-DD)", value, e))
}
