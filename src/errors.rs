//! Error handling for the loan-risk explanation runtime
//!
//! Every fallible operation in the crate returns [`RiskResult`]. The three
//! pipeline faults (`DimensionMismatch`, `ModelIncompatible`, `MissingField`)
//! are kept apart from the ambient loading/config failures so callers can map
//! them onto their own transport.

use thiserror::Error;

/// Main error type for the explanation runtime
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model incompatible: {message}")]
    ModelIncompatible { message: String },

    #[error("Structured explanation is missing required field: {field}")]
    MissingField { field: String },

    #[error("Unknown feature: {name}")]
    UnknownFeature { name: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Type alias for Result with RiskError
pub type RiskResult<T> = Result<T, RiskError>;

impl RiskError {
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    pub fn model_incompatible(message: impl Into<String>) -> Self {
        Self::ModelIncompatible {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn unknown_feature(name: impl Into<String>) -> Self {
        Self::UnknownFeature { name: name.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// True when the fault lies in caller-supplied input rather than in the
    /// runtime's own artifacts or contracts.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RiskError::DimensionMismatch { .. }
                | RiskError::UnknownFeature { .. }
                | RiskError::Validation { .. }
        )
    }
}

impl From<std::io::Error> for RiskError {
    fn from(err: std::io::Error) -> Self {
        RiskError::io("io_operation", err)
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(err: serde_json::Error) -> Self {
        RiskError::serialization("json_operation", err)
    }
}

impl From<figment::Error> for RiskError {
    fn from(err: figment::Error) -> Self {
        RiskError::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RiskError::dimension_mismatch(219, 4);
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected 219 features, got 4"
        );

        let err = RiskError::missing_field("base_value");
        assert!(err.to_string().contains("base_value"));
    }

    #[test]
    fn test_error_chaining() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = RiskError::io("reading model artifact", io_err);

        assert!(err.source().is_some());
        assert!(err.to_string().contains("I/O operation failed"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(RiskError::dimension_mismatch(3, 2).is_client_error());
        assert!(RiskError::unknown_feature("FOO").is_client_error());
        assert!(!RiskError::model_incompatible("no linear terms").is_client_error());
        assert!(!RiskError::missing_field("prediction_probability").is_client_error());
    }
}
