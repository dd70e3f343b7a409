use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeqError {
    #[error("Allocation failed during {operation}: {source}")]
    AllocationError {
        operation: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("Counter already released, cannot {operation}")]
    ReleasedError { operation: &'static str },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Resource,
    Usage,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SeqError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SeqError::AllocationError { .. } => ErrorCategory::Resource,
            SeqError::ReleasedError { .. } => ErrorCategory::Usage,
            SeqError::IoError(_) => ErrorCategory::Output,
            SeqError::ConfigError { .. }
            | SeqError::ConfigValidationError { .. }
            | SeqError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SeqError::AllocationError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Exit status for the binary, derived from severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Resource => {
                "Memory is exhausted; lower --max-length or free memory and restart"
            }
            ErrorCategory::Usage => "Initialize a new counter before incrementing",
            ErrorCategory::Output => "Check that the output stream is writable",
            ErrorCategory::Configuration => "Fix the configuration value and rerun",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SeqError::AllocationError { operation, .. } => {
                format!("Out of memory while trying to {}", operation)
            }
            SeqError::ConfigError { message } => format!("Configuration problem: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeqError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn reserve_failure() -> TryReserveError {
        let mut v: Vec<u8> = Vec::new();
        v.try_reserve(usize::MAX).unwrap_err()
    }

    #[test]
    fn test_allocation_error_is_critical() {
        let err = SeqError::AllocationError {
            operation: "increment",
            source: reserve_failure(),
        };
        assert_eq!(err.category(), ErrorCategory::Resource);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("increment"));
        assert!(err.user_friendly_message().contains("increment"));
    }

    #[test]
    fn test_config_errors_exit_with_one() {
        let err = SeqError::InvalidConfigValueError {
            field: "max_length".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 1);
    }
}
