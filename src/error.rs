//! Domain-specific error types for cardio-intake

use thiserror::Error;

/// Main error type for the intake pipeline
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: step {step} is missing required fields: {}", fields.join(", "))]
    Validation { step: usize, fields: Vec<String> },

    #[error("Contract violation ({version}): {message}")]
    ContractViolation { version: String, message: String },

    #[error("Transport error: {message}")]
    Transport { status: Option<u16>, message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Invalid transition: {message}")]
    InvalidTransition { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl IntakeError {
    /// Errors the user can recover from by fixing input or retrying the submission.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IntakeError::Validation { .. }
                | IntakeError::Transport { .. }
                | IntakeError::Timeout { .. }
        )
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        IntakeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for IntakeError {
    fn from(err: toml::de::Error) -> Self {
        IntakeError::Config {
            message: format!("Invalid config file: {}", err),
        }
    }
}

impl From<reqwest::Error> for IntakeError {
    fn from(err: reqwest::Error) -> Self {
        IntakeError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Result type alias for intake operations
pub type Result<T> = std::result::Result<T, IntakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = IntakeError::Validation {
            step: 2,
            fields: vec!["BMI".into(), "Diastolic".into()],
        };
        assert_eq!(
            err.to_string(),
            "Validation error: step 2 is missing required fields: BMI, Diastolic"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_contract_violation_is_fatal() {
        let err = IntakeError::ContractViolation {
            version: "v2".into(),
            message: "missing Systolic".into(),
        };
        assert!(!err.is_recoverable());
    }
}
