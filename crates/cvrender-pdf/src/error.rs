//! Error types for PDF generation

use cvrender_core::RenderError;
use thiserror::Error;

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur during PDF generation
#[derive(Error, Debug)]
pub enum PdfError {
    /// Typst compilation error
    #[error("Typst compilation failed: {0}")]
    Compilation(String),

    /// Font loading error
    #[error("Font error: {0}")]
    Font(String),

    /// The design reached the compiler without being validated
    #[error("{0}")]
    Design(String),

    /// An entry reached the transpiler without a resolved kind
    #[error("Unnormalized entry in section '{0}'")]
    Unnormalized(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PdfError> for RenderError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Design(message) => RenderError::User(message),
            other => RenderError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvrender_core::ErrorKind;

    #[test]
    fn test_design_errors_are_user_errors() {
        let err: RenderError = PdfError::Design("bad design".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::User);
        assert_eq!(err.to_string(), "bad design");
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err: RenderError = PdfError::Compilation("unknown variable".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("unknown variable"));
    }

    #[test]
    fn test_unnormalized_entries_are_internal() {
        let err: RenderError = PdfError::Unnormalized("Experience".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("Experience"));
    }
}
