//! Canonical form of a raw payload
//!
//! The canonical form is pretty-printed JSON with key order preserved.
//! Serializing and parsing back yields the same payload: numbers keep their
//! type, booleans and nulls survive, nothing is stringified.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use cvrender_schema::RawPayload;

use crate::error::{RenderError, Result};

/// Serialize a payload to its canonical text
pub fn to_canonical(payload: &RawPayload) -> Result<String> {
    serde_json::to_string_pretty(payload)
        .map_err(|e| RenderError::internal(format!("Failed to serialize payload: {}", e)))
}

/// Parse canonical text back into a payload
///
/// Text that is not a JSON mapping is a user error.
pub fn from_canonical(text: &str) -> Result<RawPayload> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RenderError::user("The input file should contain a mapping at its top level.")),
        Err(e) => Err(RenderError::user(format!("The input file is not valid JSON: {}", e))),
    }
}

/// Write the canonical form of `payload` to `path`
pub fn write_canonical(payload: &RawPayload, path: &Path) -> Result<()> {
    let text = to_canonical(payload)?;
    fs::write(path, text).map_err(|e| {
        RenderError::internal(format!("Failed to write {}: {}", path.display(), e))
    })?;
    debug!(path = %path.display(), "wrote canonical payload");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RawPayload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be a mapping"),
        }
    }

    #[test]
    fn test_round_trip_preserves_types_and_order() {
        let original = payload(json!({
            "cv": {
                "name": "Jane",
                "sections": {
                    "Zeta": ["last"],
                    "Alpha": [{"number": 1, "ratio": 0.5, "on": true, "gone": null}]
                }
            },
            "design": {"theme": "classic"}
        }));

        let text = to_canonical(&original).unwrap();
        let parsed = from_canonical(&text).unwrap();
        assert_eq!(parsed, original);

        let titles: Vec<&String> = parsed["cv"]["sections"].as_object().unwrap().keys().collect();
        assert_eq!(titles, vec!["Zeta", "Alpha"]);
        assert_eq!(parsed["cv"]["sections"]["Alpha"][0]["number"], json!(1));
        assert!(parsed["cv"]["sections"]["Alpha"][0]["number"].is_u64());
    }

    #[test]
    fn test_non_mapping_is_user_error() {
        assert!(matches!(from_canonical("[1, 2]"), Err(RenderError::User(_))));
        assert!(matches!(from_canonical("{oops"), Err(RenderError::User(_))));
    }

    #[test]
    fn test_write_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.json");
        let original = payload(json!({"cv": {"name": "J"}}));
        write_canonical(&original, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(from_canonical(&text).unwrap(), original);
    }
}
