//! Collecting field reader used by every schema validator
//!
//! A [`FieldReader`] walks one mapping, pulls typed values out of it and
//! records a [`FieldError`] for every missing or mistyped field instead of
//! stopping at the first one. Callers read all fields, then call
//! [`FieldReader::finish`] to either get the leftover keys or the full list
//! of errors.

use serde_json::{Map, Value};

use crate::diagnostics::{child, FieldError, PathSegment};

pub(crate) const FIELD_REQUIRED: &str = "Field required";
pub(crate) const EXTRA_FORBIDDEN: &str = "Extra inputs are not permitted";

/// Reads typed fields from one JSON mapping
pub struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    location: Vec<PathSegment>,
    seen: Vec<String>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    /// Start reading `value`, which must be a mapping
    pub fn new(value: &'a Value, location: &[PathSegment]) -> Result<Self, FieldError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map, location)),
            other => Err(FieldError::new(
                location.to_vec(),
                "Input should be a valid dictionary",
            )
            .with_input(other.clone())),
        }
    }

    /// Start reading an already-unwrapped mapping
    pub fn from_map(map: &'a Map<String, Value>, location: &[PathSegment]) -> Self {
        Self {
            map,
            location: location.to_vec(),
            seen: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Location of the mapping being read
    pub fn location(&self) -> &[PathSegment] {
        &self.location
    }

    /// Location of one key of the mapping being read
    pub fn location_of(&self, key: &str) -> Vec<PathSegment> {
        child(&self.location, key)
    }

    /// Record an error produced outside the reader
    pub fn push_error(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Record several errors produced outside the reader
    pub fn extend_errors(&mut self, errors: impl IntoIterator<Item = FieldError>) {
        self.errors.extend(errors);
    }

    /// Check whether errors have been recorded so far
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of errors recorded so far
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Raw access to a key; marks it as consumed. `null` counts as absent.
    pub fn raw(&mut self, key: &str) -> Option<&'a Value> {
        self.seen.push(key.to_string());
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    /// Raw access to a key that must be present
    pub fn required_raw(&mut self, key: &str) -> Option<&'a Value> {
        let value = self.raw(key);
        if value.is_none() {
            self.missing(key);
        }
        value
    }

    /// Optional string field. Numbers are accepted and kept verbatim.
    pub fn optional_string(&mut self, key: &str) -> Option<String> {
        let value = self.raw(key)?;
        self.as_string(key, value)
    }

    /// Required string field
    pub fn required_string(&mut self, key: &str) -> Option<String> {
        let value = self.required_raw(key)?;
        self.as_string(key, value)
    }

    /// Optional boolean field
    pub fn optional_bool(&mut self, key: &str) -> Option<bool> {
        match self.raw(key)? {
            Value::Bool(flag) => Some(*flag),
            other => {
                self.invalid(key, "Input should be a valid boolean", other);
                None
            }
        }
    }

    /// Optional list of strings
    pub fn string_list(&mut self, key: &str) -> Vec<String> {
        let Some(value) = self.raw(key) else {
            return Vec::new();
        };
        let Value::Array(items) = value else {
            self.invalid(key, "Input should be a valid list", value);
            return Vec::new();
        };

        let mut strings = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match scalar_to_string(item) {
                Some(text) => strings.push(text),
                None => {
                    let location = child(&self.location_of(key), index);
                    self.errors.push(
                        FieldError::new(location, "Input should be a valid string")
                            .with_input(item.clone()),
                    );
                }
            }
        }
        strings
    }

    /// Optional nested mapping; a non-mapping value is recorded as an error
    pub fn optional_map(&mut self, key: &str) -> Option<&'a Map<String, Value>> {
        match self.raw(key)? {
            Value::Object(map) => Some(map),
            other => {
                self.invalid(key, "Input should be a valid dictionary", other);
                None
            }
        }
    }

    /// Record a "Field required" error for `key`
    pub fn missing(&mut self, key: &str) {
        let input = Value::Object(self.map.clone());
        let location = self.location_of(key);
        self.errors
            .push(FieldError::new(location, FIELD_REQUIRED).with_input(input));
    }

    /// Record a type or value error for `key`
    pub fn invalid(&mut self, key: &str, message: impl Into<String>, input: &Value) {
        let location = self.location_of(key);
        self.errors
            .push(FieldError::new(location, message).with_input(input.clone()));
    }

    /// Keys that were never read, in payload order
    pub fn unread_keys(&self) -> Vec<&'a String> {
        self.map
            .keys()
            .filter(|key| !self.seen.iter().any(|seen| seen == *key))
            .collect()
    }

    /// Finish reading, rejecting every unread key
    pub fn finish_strict(mut self) -> Result<(), Vec<FieldError>> {
        for key in self.unread_keys() {
            let input = self.map.get(key).cloned().unwrap_or(Value::Null);
            let location = child(&self.location, key.as_str());
            self.errors
                .push(FieldError::new(location, EXTRA_FORBIDDEN).with_input(input));
        }
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Finish reading, returning unread keys as extra fields
    pub fn finish(self) -> Result<Map<String, Value>, Vec<FieldError>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        let extra = self
            .unread_keys()
            .into_iter()
            .filter_map(|key| self.map.get(key).map(|value| (key.clone(), value.clone())))
            .collect();
        Ok(extra)
    }

    fn as_string(&mut self, key: &str, value: &Value) -> Option<String> {
        let text = scalar_to_string(value);
        if text.is_none() {
            self.invalid(key, "Input should be a valid string", value);
        }
        text
    }
}

/// Strings pass through, numbers are printed; everything else is rejected
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
