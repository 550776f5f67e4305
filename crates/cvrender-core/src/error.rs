//! Error types for the render pipeline

use serde::Serialize;
use thiserror::Error;

use cvrender_schema::ValidationError;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while turning a payload into a PDF
#[derive(Error, Debug)]
pub enum RenderError {
    /// One or more fields of the payload are invalid
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The payload asks for something that cannot be done
    #[error("{0}")]
    User(String),

    /// The pipeline or one of its services failed
    #[error("{0}")]
    Internal(String),
}

impl RenderError {
    pub fn user(message: impl Into<String>) -> Self {
        RenderError::User(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RenderError::Internal(message.into())
    }

    /// Classification of the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Validation(_) => ErrorKind::Validation,
            RenderError::User(_) => ErrorKind::User,
            RenderError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Error classes, as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    User,
    Internal,
}

impl ErrorKind {
    /// Check if the caller's input caused the error
    pub fn is_client_error(self) -> bool {
        !matches!(self, ErrorKind::Internal)
    }

    /// Tag used in serialized error envelopes
    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::User => "user_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}
