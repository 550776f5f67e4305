//! JSON envelopes for results and errors

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use cvrender_core::{ErrorKind, RenderError};

/// Exit status for a successful run
pub const EXIT_OK: u8 = 0;
/// Exit status when the input was at fault
pub const EXIT_CLIENT_ERROR: u8 = 1;
/// Exit status when the pipeline itself failed
pub const EXIT_INTERNAL_ERROR: u8 = 2;

/// `{"pdf_base64": ...}`
pub fn pdf_envelope(pdf: &[u8]) -> Value {
    json!({ "pdf_base64": STANDARD.encode(pdf) })
}

/// Typed error envelope
///
/// Validation errors list every field error with its location, message
/// and rejected input; the other kinds carry a single message.
pub fn error_envelope(err: &RenderError) -> Value {
    let kind = err.kind();
    match err {
        RenderError::Validation(validation) => json!({
            "type": kind.tag(),
            "errors": validation.errors,
        }),
        RenderError::User(message) | RenderError::Internal(message) => json!({
            "type": kind.tag(),
            "message": message,
        }),
    }
}

/// Process exit status for an error
pub fn exit_status(err: &RenderError) -> u8 {
    match err.kind() {
        ErrorKind::Internal => EXIT_INTERNAL_ERROR,
        _ => EXIT_CLIENT_ERROR,
    }
}
