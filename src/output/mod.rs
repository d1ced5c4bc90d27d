//! Output formatting for feeds, job details and stats

pub mod formatter;
pub mod report;

pub use formatter::{save_report_to_file, suggest_filename, OutputFormatter, ReportGenerator};
pub use report::{Report, ReportBody, ReportMetadata};
