//! Error handling for the job matching engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplyLessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Policy error: {0}")]
    Policy(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ApplyLessError>;

/// Convert anyhow errors (raised by the model2vec loader) to our error type
impl From<anyhow::Error> for ApplyLessError {
    fn from(err: anyhow::Error) -> Self {
        ApplyLessError::Embedding(err.to_string())
    }
}
