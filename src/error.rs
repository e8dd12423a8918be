// Error types for the route classifier
//
// Fatal errors are reserved for caller contract violations. Data quality
// problems in the dump never fail a batch; they surface as RecordIssue.

use serde::Serialize;
use thiserror::Error;

/// Fatal error type for the classifier and its binary
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type alias using ClassifierError
pub type AppResult<T> = Result<T, ClassifierError>;

impl ClassifierError {
    /// Convert error to user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            ClassifierError::InvalidInput(msg) => {
                format!("The submitted dump could not be read: {}", msg)
            }
            ClassifierError::Config(_) | ClassifierError::ConfigParse(_) => {
                "Configuration error. Check your config file or command-line arguments.".to_string()
            }
            ClassifierError::Io(_) => {
                "File system error. Check the input path and permissions.".to_string()
            }
            ClassifierError::Serialization(_) => {
                "Data format error. This might be a bug, please report it.".to_string()
            }
        }
    }

    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ClassifierError::InvalidInput(_) => "InvalidInput",
            ClassifierError::Config(_) | ClassifierError::ConfigParse(_) => "ConfigError",
            ClassifierError::Io(_) => "IoError",
            ClassifierError::Serialization(_) => "SerializationError",
        }
    }
}

/// A record dropped during a parse pass
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordIssue {
    /// The record lacks fields its bucket requires
    #[error("{bucket} record dropped, missing {}: {record}", .missing.join(", "))]
    MalformedRecord {
        bucket: &'static str,
        missing: Vec<&'static str>,
        record: String,
    },

    /// The record matches no section signature
    #[error("record matches no section: {record}")]
    AmbiguousClassification { record: String },
}

impl RecordIssue {
    pub fn malformed(bucket: &'static str, missing: Vec<&'static str>, record: &str) -> Self {
        RecordIssue::MalformedRecord {
            bucket,
            missing,
            record: record.to_string(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, RecordIssue::MalformedRecord { .. })
    }
}
