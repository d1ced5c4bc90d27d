//! File type detection for resumes, profiles and job datasets

use crate::error::{ApplyLessError, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Text,
    Markdown,
    Json,
    Toml,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "txt" => FileType::Text,
            "md" | "markdown" => FileType::Markdown,
            "json" => FileType::Json,
            "toml" => FileType::Toml,
            _ => FileType::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ApplyLessError::InvalidInput(format!("File has no extension: {}", path.display())))?;
        Ok(Self::from_extension(extension))
    }

    /// Formats a resume body can be extracted from
    pub fn is_document(self) -> bool {
        matches!(self, FileType::Pdf | FileType::Text | FileType::Markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_extension() {
        assert_eq!(FileType::from_extension("PDF"), FileType::Pdf);
        assert_eq!(FileType::from_extension("markdown"), FileType::Markdown);
        assert_eq!(FileType::from_extension("toml"), FileType::Toml);
        assert_eq!(FileType::from_extension("docx"), FileType::Unknown);
    }

    #[test]
    fn test_from_path_requires_extension() {
        assert_eq!(FileType::from_path(&PathBuf::from("jobs.json")).unwrap(), FileType::Json);
        assert!(FileType::from_path(&PathBuf::from("README")).is_err());
        assert!(FileType::Text.is_document());
        assert!(!FileType::Json.is_document());
    }
}
