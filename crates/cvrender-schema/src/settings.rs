//! Render settings

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::date::{CalendarDate, Date};
use crate::diagnostics::{FieldError, PathSegment};
use crate::reader::FieldReader;

/// Files the compile and render services write
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OutputPaths {
    pub typst: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
}

/// Settings of one render, from the payload's `settings` key plus output paths
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RenderSettings {
    /// Date printed in the "last updated" line
    pub current_date: Option<CalendarDate>,
    /// Words emphasised wherever they appear in entry text
    pub bold_keywords: Vec<String>,
    #[serde(skip)]
    pub outputs: OutputPaths,
}

impl RenderSettings {
    /// Validate the `settings` mapping
    pub fn parse(value: &Value, location: &[PathSegment]) -> Result<RenderSettings, Vec<FieldError>> {
        let mut reader = FieldReader::new(value, location).map_err(|e| vec![e])?;

        let current_date = match reader.raw("current_date") {
            None => None,
            Some(raw) => match Date::parse_strict(raw, false) {
                Ok(Date::Calendar(date)) => Some(date),
                Ok(_) => None,
                Err(message) => {
                    reader.invalid("current_date", message, raw);
                    None
                }
            },
        };
        let bold_keywords = reader.string_list("bold_keywords");

        reader.finish_strict()?;
        Ok(RenderSettings {
            current_date,
            bold_keywords,
            outputs: OutputPaths::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::path;
    use serde_json::json;

    #[test]
    fn test_parse_settings() {
        let value = json!({"current_date": "2024-06", "bold_keywords": ["Rust", "Typst"]});
        let settings = RenderSettings::parse(&value, &path(["settings"])).unwrap();
        assert_eq!(settings.current_date.map(|d| d.to_string()).as_deref(), Some("2024-06"));
        assert_eq!(settings.bold_keywords, vec!["Rust", "Typst"]);
        assert_eq!(settings.outputs, OutputPaths::default());
    }

    #[test]
    fn test_invalid_date_located() {
        let value = json!({"current_date": "yesterday", "theme": "x"});
        let errors = RenderSettings::parse(&value, &path(["settings"])).unwrap_err();
        assert_eq!(errors[0].location_string(), "settings.current_date");
        assert_eq!(errors[1].location_string(), "settings.theme");
    }
}
