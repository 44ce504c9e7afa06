//! Fatal error types for the normalization pipeline.
//!
//! Only configuration and precondition violations are errors. Data-quality
//! problems in the source document are reported as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s and never abort a call.

use thiserror::Error;

/// Errors that abort a weaving or normalization call.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// XML parsing or serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error while reading or writing a document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is neither DMN nor CMMN.
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// No schema location is configured for the detected dialect.
    #[error("No schema location configured for namespace {0}")]
    MissingSchemaLocation(String),

    /// A single-valued extraction found several candidates.
    #[error("Expected at most one {what}, found {count}")]
    MultipleCandidates { what: &'static str, count: usize },

    /// Invalid element or attribute structure.
    #[error("Invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },

    /// Unsupported construct (e.g. multi-object annotations).
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl WeaveError {
    /// Create an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Create an invalid element error.
    pub fn invalid_element(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "element",
            message: message.into(),
        }
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "attribute",
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
