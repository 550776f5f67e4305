//! Field-level validation diagnostics
//!
//! Every schema check reports a [`FieldError`]: where in the payload the
//! problem is, what is wrong, and the value that was rejected. A failed
//! validation returns all of them at once inside a [`ValidationError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One step of a location path inside the payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Build a location path from anything convertible into segments
pub fn path<I, S>(segments: I) -> Vec<PathSegment>
where
    I: IntoIterator<Item = S>,
    S: Into<PathSegment>,
{
    segments.into_iter().map(Into::into).collect()
}

/// Append one segment to a borrowed location
pub fn child(location: &[PathSegment], segment: impl Into<PathSegment>) -> Vec<PathSegment> {
    let mut location = location.to_vec();
    location.push(segment.into());
    location
}

/// A single rejected field
///
/// # Example
///
/// ```
/// use cvrender_schema::diagnostics::{path, FieldError};
/// use serde_json::json;
///
/// let err = FieldError::new(path(["cv", "name"]), "Field required")
///     .with_input(json!({}));
/// assert_eq!(err.location_string(), "cv.name");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path from the payload root to the offending field
    pub location: Vec<PathSegment>,

    /// Human-readable explanation
    pub message: String,

    /// The value that was rejected
    #[serde(default)]
    pub input: Value,
}

impl FieldError {
    /// Create a new field error with a null input
    pub fn new(location: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            input: Value::Null,
        }
    }

    /// Attach the offending input value
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    /// Prepend segments to the location, e.g. when a nested validator ran
    /// against a sub-document
    pub fn nested_under(mut self, prefix: &[PathSegment]) -> Self {
        let mut location = prefix.to_vec();
        location.append(&mut self.location);
        self.location = location;
        self
    }

    /// Dotted rendering of the location (`cv.sections.Experience.0.company`)
    pub fn location_string(&self) -> String {
        self.location
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}", self.message)?;
        } else {
            write!(f, "{}: {}", self.location_string(), self.message)?;
        }
        if !self.input.is_null() {
            write!(f, " (input: {})", self.input)?;
        }
        Ok(())
    }
}

/// A failed validation carrying every field error found
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{}", summarize(.errors))]
pub struct ValidationError {
    /// All field errors, in discovery order
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    match errors {
        [] => "validation failed".to_string(),
        [single] => format!("validation failed: {}", single),
        [first, rest @ ..] => format!(
            "validation failed: {} (and {} more)",
            first,
            rest.len()
        ),
    }
}

impl ValidationError {
    /// Wrap a list of field errors
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Wrap a single field error
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Number of field errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if there are no field errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the field errors
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

impl From<Vec<FieldError>> for ValidationError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::new(errors)
    }
}

impl From<FieldError> for ValidationError {
    fn from(error: FieldError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for ValidationError {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
