use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid bound {value}: {reason}")]
    InvalidBound { value: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Scan cancelled before completion")]
    Cancelled,

    #[error("Scan exceeded the {limit:?} timeout")]
    Timeout { limit: Duration },

    #[error("Scan task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Interrupted,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn invalid_bound(value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidBound {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::InvalidBound { .. } => ErrorCategory::Input,
            ScanError::ConfigError { .. }
            | ScanError::ConfigValidationError { .. }
            | ScanError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ScanError::Cancelled | ScanError::Timeout { .. } => ErrorCategory::Interrupted,
            ScanError::TaskError(_)
            | ScanError::IoError(_)
            | ScanError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Interrupted => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScanError::InvalidBound { .. } => {
                "Pass an integer bound no larger than 4294967296"
            }
            ScanError::ConfigError { .. } | ScanError::ConfigValidationError { .. } => {
                "Check that the configuration file exists and is valid TOML"
            }
            ScanError::InvalidConfigValueError { .. } => {
                "Fix the highlighted configuration value and try again"
            }
            ScanError::Cancelled => "Run the scan again without interrupting it",
            ScanError::Timeout { .. } => {
                "Raise timeout_seconds or lower the bound; the scan is quadratic in the bound"
            }
            ScanError::TaskError(_) => "Re-run with --verbose and inspect the logs",
            ScanError::IoError(_) => "Check file permissions and paths",
            ScanError::SerializationError(_) => "Try the text output format instead",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScanError::InvalidBound { value, reason } => {
                format!("The bound {} cannot be scanned: {}", value, reason)
            }
            ScanError::Cancelled => "The scan was cancelled".to_string(),
            ScanError::Timeout { limit } => {
                format!("The scan did not finish within {:?}", limit)
            }
            other => other.to_string(),
        }
    }

    /// Process exit code for this error, derived from its severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
