//! Section schema
//!
//! A section descriptor is `{title, entry_type, entries}`. Each entry kind
//! has its own section schema which accepts only entries of that kind.

use serde_json::{json, Value};

use crate::diagnostics::{child, path, ValidationError};
use crate::entry::{EntryKind, SectionEntry};
use crate::reader::FieldReader;

/// A validated, homogeneous section
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub entry_type: EntryKind,
    pub entries: Vec<SectionEntry>,
}

/// Validation rules for sections of one entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSchema {
    kind: EntryKind,
}

impl SectionSchema {
    /// Schema for sections holding `kind` entries
    pub fn for_kind(kind: EntryKind) -> Self {
        Self { kind }
    }

    /// Entry kind this schema accepts
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Build the descriptor this schema validates
    pub fn descriptor(&self, title: &str, entries: Vec<Value>) -> Value {
        json!({
            "title": title,
            "entry_type": self.kind.name(),
            "entries": entries,
        })
    }

    /// Validate a section descriptor
    ///
    /// Errors are located relative to the descriptor
    /// (`entries.<index>.<field>`).
    pub fn validate(&self, descriptor: &Value) -> Result<Section, ValidationError> {
        let mut reader = FieldReader::new(descriptor, &[]).map_err(ValidationError::single)?;

        let title = reader.required_string("title");

        if let Some(entry_type) = reader.required_raw("entry_type") {
            if entry_type.as_str() != Some(self.kind.name()) {
                reader.invalid(
                    "entry_type",
                    format!("Input should be '{}'", self.kind.name()),
                    entry_type,
                );
            }
        }

        let mut entries = Vec::new();
        match reader.required_raw("entries") {
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let location = child(&path(["entries"]), index);
                    match self.kind.validate(item, &location) {
                        Ok(entry) => entries.push(entry),
                        Err(errors) => reader.extend_errors(errors),
                    }
                }
            }
            Some(other) => reader.invalid("entries", "Input should be a valid list", other),
            None => {}
        }

        reader.finish_strict()?;

        Ok(Section {
            title: title.unwrap_or_default(),
            entry_type: self.kind,
            entries,
        })
    }
}
