//! Console, JSON and Markdown rendering of feeds, job details and stats

use crate::config::OutputFormat;
use crate::error::Result;
use crate::models::{CareerImpact, CompetitionLevel, Decision, FeedStats, Importance, JobFeed, JobMatch};
use crate::output::report::{Report, ReportBody};
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &Report) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Colored terminal output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Dispatches a report to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn decision_color(decision: Decision) -> Color {
    match decision {
        Decision::Apply => Color::Green,
        Decision::Wait => Color::Yellow,
        Decision::Skip => Color::BrightBlack,
        Decision::Avoid => Color::Red,
    }
}

fn decision_icon(decision: Decision) -> &'static str {
    match decision {
        Decision::Apply => "✅",
        Decision::Wait => "⏳",
        Decision::Skip => "⏭️",
        Decision::Avoid => "🚫",
    }
}

fn competition_label(level: CompetitionLevel) -> &'static str {
    match level {
        CompetitionLevel::Low => "Low",
        CompetitionLevel::Medium => "Medium",
        CompetitionLevel::High => "High",
    }
}

fn career_label(impact: CareerImpact) -> &'static str {
    match impact {
        CareerImpact::Positive => "Positive",
        CareerImpact::Neutral => "Neutral",
        CareerImpact::Negative => "Negative",
    }
}

fn importance_label(importance: Importance) -> &'static str {
    match importance {
        Importance::High => "High",
        Importance::Medium => "Medium",
        Importance::Low => "Low",
    }
}

fn total_pages(feed: &JobFeed) -> usize {
    if feed.page_size == 0 {
        return 0;
    }
    (feed.total_count + feed.page_size - 1) / feed.page_size
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_decision_badge(&self, decision: Decision) -> String {
        let label = decision.to_string().to_uppercase();
        if self.use_colors {
            format!("[{}]", label.color(decision_color(decision)).bold())
        } else {
            format!("[{}]", label)
        }
    }

    fn format_match_summary(&self, index: Option<usize>, job_match: &JobMatch) -> String {
        let job = &job_match.job;
        let numbering = index.map(|i| format!("{}. ", i)).unwrap_or_default();
        let remote = if job.is_remote { " (remote)" } else { "" };

        let mut output = format!(
            "{}{} {} {} at {}{}\n",
            numbering,
            decision_icon(job_match.decision),
            self.colorize(&job.title, Color::White),
            self.format_decision_badge(job_match.decision),
            job.company,
            remote
        );
        output.push_str(&format!(
            "   Fit: {}/100 | Competition: {} | Career impact: {} | Job id: {}\n",
            job_match.fit_score,
            competition_label(job_match.competition_level),
            career_label(job_match.career_impact),
            job.job_id
        ));
        output.push_str(&format!("   {}\n", self.colorize(&job_match.decision_reason, Color::Cyan)));

        if let Some(first_risk) = job_match.explanation.risk_factors.first() {
            output.push_str(&format!("   ⚠️  {}\n", self.colorize(first_risk, Color::Red)));
        }
        output
    }

    fn format_match_detail(&self, job_match: &JobMatch) -> String {
        let explanation = &job_match.explanation;
        let breakdown = &job_match.score_breakdown;
        let mut output = self.format_match_summary(None, job_match);

        output.push_str(&self.format_header("Score Breakdown", 3));
        output.push_str(&format!("🎯 Semantic similarity: {:.0}%\n", breakdown.semantic * 100.0));
        output.push_str(&format!("🔍 Skill overlap: {:.0}%\n", breakdown.skill_overlap * 100.0));
        output.push_str(&format!("📈 Experience match: {:.0}%\n", breakdown.experience_match * 100.0));
        output.push_str(&format!("📍 Location match: {:.0}%\n", breakdown.location_match * 100.0));
        output.push_str(&format!("📰 Posting quality: {:.0}%\n", job_match.posting_quality * 100.0));

        if !explanation.strengths.is_empty() {
            output.push_str(&self.format_header("✅ Strengths", 3));
            for strength in &explanation.strengths {
                output.push_str(&format!("  • {}\n", self.colorize(strength, Color::Green)));
            }
        }

        if !explanation.risk_factors.is_empty() {
            output.push_str(&self.format_header("⚠️ Risk Factors", 3));
            for risk in &explanation.risk_factors {
                output.push_str(&format!("  • {}\n", self.colorize(risk, Color::Yellow)));
            }
        }

        if !explanation.matched_skills.is_empty() {
            output.push_str(&format!("\nMatched skills: {}\n", explanation.matched_skills.join(", ")));
        }

        if !explanation.skill_gaps.is_empty() {
            output.push_str(&self.format_header("📚 Skill Gaps", 3));
            for gap in &explanation.skill_gaps {
                output.push_str(&format!(
                    "  • {} [{}] ~ {}\n",
                    self.colorize(&gap.skill, Color::White),
                    importance_label(gap.importance),
                    gap.estimated_learning_time
                ));
                if self.detailed {
                    for resource in &gap.resources {
                        output.push_str(&format!("      - {}\n", self.colorize(resource, Color::BrightBlack)));
                    }
                }
            }
        }

        output
    }

    fn format_feed(&self, feed: &JobFeed) -> String {
        let mut output = self.format_header("📋 JOB FEED", 1);
        output.push_str(&format!(
            "Page {} of {} | {} matching jobs\n\n",
            feed.page,
            total_pages(feed).max(1),
            feed.total_count
        ));

        if feed.jobs.is_empty() {
            output.push_str(&self.colorize("No jobs on this page.\n", Color::BrightBlack));
        }

        let offset = (feed.page.saturating_sub(1)) * feed.page_size;
        for (i, job_match) in feed.jobs.iter().enumerate() {
            if self.detailed {
                output.push_str(&self.format_header(&format!("{}. {}", offset + i + 1, job_match.job.title), 2));
                output.push_str(&self.format_match_detail(job_match));
            } else {
                output.push_str(&self.format_match_summary(Some(offset + i + 1), job_match));
            }
            output.push('\n');
        }
        output
    }

    fn format_stats(&self, stats: &FeedStats) -> String {
        let mut output = self.format_header("📊 FEED STATS", 1);
        output.push_str(&format!("Total jobs: {}\n\n", stats.total_jobs));
        for decision in Decision::ALL {
            output.push_str(&format!(
                "{} {:<6} {}\n",
                decision_icon(decision),
                decision.to_string(),
                self.colorize(&stats.decisions.get(decision).to_string(), decision_color(decision))
            ));
        }
        output.push_str(&format!("\n💡 {}\n", self.colorize(&stats.recommendation, Color::Cyan)));
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = match &report.body {
            ReportBody::Feed(feed) => self.format_feed(feed),
            ReportBody::Detail(job_match) => {
                let mut detail = self.format_header("🔎 JOB DETAIL", 1);
                detail.push_str(&self.format_match_detail(job_match));
                detail
            }
            ReportBody::Stats(stats) => self.format_stats(stats),
        };

        output.push_str(&format!(
            "\n{} ApplyLess v{} | Profile: {} | Model: {}\n",
            self.colorize("ℹ️", Color::Blue),
            report.metadata.version,
            report.metadata.profile_id,
            report.metadata.embedding_model
        ));
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn match_section(heading: &str, job_match: &JobMatch) -> String {
        let job = &job_match.job;
        let explanation = &job_match.explanation;
        let breakdown = &job_match.score_breakdown;

        let mut output = format!("## {}\n\n", heading);
        output.push_str(&format!("**{}** at **{}** ({})\n\n", job.title, job.company, job.job_id));
        output.push_str("| Metric | Value |\n|--------|-------|\n");
        output.push_str(&format!("| Decision | {} |\n", job_match.decision));
        output.push_str(&format!("| Fit score | {}/100 |\n", job_match.fit_score));
        output.push_str(&format!("| Competition | {} |\n", competition_label(job_match.competition_level)));
        output.push_str(&format!("| Career impact | {} |\n", career_label(job_match.career_impact)));
        output.push_str(&format!("| Semantic similarity | {:.0}% |\n", breakdown.semantic * 100.0));
        output.push_str(&format!("| Skill overlap | {:.0}% |\n", breakdown.skill_overlap * 100.0));
        output.push_str(&format!("| Experience match | {:.0}% |\n", breakdown.experience_match * 100.0));
        output.push_str(&format!("| Location match | {:.0}% |\n", breakdown.location_match * 100.0));
        output.push_str(&format!("| Posting quality | {:.0}% |\n\n", job_match.posting_quality * 100.0));
        output.push_str(&format!("> {}\n\n", job_match.decision_reason));

        for (title, items) in [("Strengths", &explanation.strengths), ("Risk factors", &explanation.risk_factors)] {
            if !items.is_empty() {
                output.push_str(&format!("### {}\n\n", title));
                for item in items {
                    output.push_str(&format!("- {}\n", item));
                }
                output.push('\n');
            }
        }

        if !explanation.skill_gaps.is_empty() {
            output.push_str("### Skill gaps\n\n| Skill | Importance | Time to learn |\n|-------|------------|---------------|\n");
            for gap in &explanation.skill_gaps {
                output.push_str(&format!(
                    "| {} | {} | {} |\n",
                    gap.skill,
                    importance_label(gap.importance),
                    gap.estimated_learning_time
                ));
            }
            output.push('\n');
        }

        output
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        match &report.body {
            ReportBody::Feed(feed) => {
                output.push_str("# Job Feed\n\n");
                output.push_str(&format!(
                    "Page {} of {}, {} matching jobs.\n\n",
                    feed.page,
                    total_pages(feed).max(1),
                    feed.total_count
                ));
                let offset = (feed.page.saturating_sub(1)) * feed.page_size;
                for (i, job_match) in feed.jobs.iter().enumerate() {
                    output.push_str(&Self::match_section(&format!("{}. {}", offset + i + 1, job_match.job.title), job_match));
                }
            }
            ReportBody::Detail(job_match) => {
                output.push_str("# Job Detail\n\n");
                output.push_str(&Self::match_section(&job_match.job.title, job_match));
            }
            ReportBody::Stats(stats) => {
                output.push_str("# Feed Stats\n\n");
                output.push_str("| Decision | Jobs |\n|----------|------|\n");
                for decision in Decision::ALL {
                    output.push_str(&format!("| {} | {} |\n", decision, stats.decisions.get(decision)));
                }
                output.push_str(&format!("| **Total** | **{}** |\n\n", stats.total_jobs));
                output.push_str(&format!("**{}**\n\n", stats.recommendation));
            }
        }

        if self.include_metadata {
            let metadata = &report.metadata;
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated {} by ApplyLess v{} for profile {} using {} (posting ages as of {}).*\n",
                metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                metadata.version,
                metadata.profile_id,
                metadata.embedding_model,
                metadata.reference_date
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &Report, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, report: &Report, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", report.metadata.generated_at.format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };

    format!("{}_{}{}.{}", report.metadata.profile_id, report.kind(), timestamp_suffix, extension)
}
