//! Section entries
//!
//! A section holds entries of exactly one [`EntryKind`]. Plain strings are
//! `TextEntry`; mappings are told apart by the keys they carry. Structured
//! entries keep unknown keys as extra fields so custom data survives
//! validation.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::date::Date;
use crate::diagnostics::{FieldError, PathSegment};
use crate::reader::FieldReader;

/// The closed set of entry kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Text,
    OneLine,
    Normal,
    Experience,
    Education,
    Publication,
    Bullet,
    Numbered,
    ReversedNumbered,
}

impl EntryKind {
    /// Every kind, in inference priority order for mappings
    pub const ALL: [EntryKind; 9] = [
        EntryKind::Experience,
        EntryKind::Education,
        EntryKind::Publication,
        EntryKind::Normal,
        EntryKind::OneLine,
        EntryKind::Bullet,
        EntryKind::Numbered,
        EntryKind::ReversedNumbered,
        EntryKind::Text,
    ];

    /// Schema name, as used in a section's `entry_type`
    pub fn name(self) -> &'static str {
        match self {
            EntryKind::Text => "TextEntry",
            EntryKind::OneLine => "OneLineEntry",
            EntryKind::Normal => "NormalEntry",
            EntryKind::Experience => "ExperienceEntry",
            EntryKind::Education => "EducationEntry",
            EntryKind::Publication => "PublicationEntry",
            EntryKind::Bullet => "BulletEntry",
            EntryKind::Numbered => "NumberedEntry",
            EntryKind::ReversedNumbered => "ReversedNumberedEntry",
        }
    }

    /// Look a kind up by its schema name
    pub fn from_name(name: &str) -> Option<EntryKind> {
        EntryKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Keys whose joint presence identifies this kind
    pub fn characteristic_keys(self) -> &'static [&'static str] {
        match self {
            EntryKind::Text => &[],
            EntryKind::OneLine => &["label", "details"],
            EntryKind::Normal => &["name"],
            EntryKind::Experience => &["company", "position"],
            EntryKind::Education => &["institution", "area"],
            EntryKind::Publication => &["title", "authors"],
            EntryKind::Bullet => &["bullet"],
            EntryKind::Numbered => &["number"],
            EntryKind::ReversedNumbered => &["reversed_number"],
        }
    }

    /// Validate one raw entry as this kind
    pub fn validate(self, value: &Value, location: &[PathSegment]) -> Result<SectionEntry, Vec<FieldError>> {
        if self == EntryKind::Text {
            return validate_text(value, location);
        }

        let mut reader = FieldReader::new(value, location).map_err(|e| vec![e])?;
        let entry = match self {
            EntryKind::OneLine => {
                let label = reader.required_string("label");
                let details = reader.required_string("details");
                let extra = reader.finish()?;
                TypedEntry::OneLine(OneLineEntry {
                    label: label.unwrap_or_default(),
                    details: details.unwrap_or_default(),
                    extra,
                })
            }
            EntryKind::Normal => {
                let name = reader.required_string("name");
                let details = read_details(&mut reader);
                let extra = reader.finish()?;
                TypedEntry::Normal(NormalEntry {
                    name: name.unwrap_or_default(),
                    details,
                    extra,
                })
            }
            EntryKind::Experience => {
                let company = reader.required_string("company");
                let position = reader.required_string("position");
                let details = read_details(&mut reader);
                let extra = reader.finish()?;
                TypedEntry::Experience(ExperienceEntry {
                    company: company.unwrap_or_default(),
                    position: position.unwrap_or_default(),
                    details,
                    extra,
                })
            }
            EntryKind::Education => {
                let institution = reader.required_string("institution");
                let area = reader.required_string("area");
                let degree = reader.optional_string("degree");
                let details = read_details(&mut reader);
                let extra = reader.finish()?;
                TypedEntry::Education(EducationEntry {
                    institution: institution.unwrap_or_default(),
                    area: area.unwrap_or_default(),
                    degree,
                    details,
                    extra,
                })
            }
            EntryKind::Publication => {
                let title = reader.required_string("title");
                let authors = match reader.required_raw("authors") {
                    Some(_) => reader.string_list("authors"),
                    None => Vec::new(),
                };
                let doi = reader.optional_string("doi");
                let url = reader.optional_string("url");
                let journal = reader.optional_string("journal");
                let summary = reader.optional_string("summary");
                let date = read_date(&mut reader, "date", DateRule::Lenient);
                let extra = reader.finish()?;
                TypedEntry::Publication(PublicationEntry {
                    title: title.unwrap_or_default(),
                    authors,
                    doi,
                    url,
                    journal,
                    summary,
                    date,
                    extra,
                })
            }
            EntryKind::Bullet => {
                let bullet = reader.required_string("bullet");
                let extra = reader.finish()?;
                TypedEntry::Bullet(BulletEntry {
                    bullet: bullet.unwrap_or_default(),
                    extra,
                })
            }
            EntryKind::Numbered => {
                let number = reader.required_string("number");
                let extra = reader.finish()?;
                TypedEntry::Numbered(NumberedEntry {
                    number: number.unwrap_or_default(),
                    extra,
                })
            }
            EntryKind::ReversedNumbered => {
                let reversed_number = reader.required_string("reversed_number");
                let extra = reader.finish()?;
                TypedEntry::ReversedNumbered(ReversedNumberedEntry {
                    reversed_number: reversed_number.unwrap_or_default(),
                    extra,
                })
            }
            EntryKind::Text => return validate_text(value, location),
        };
        Ok(SectionEntry::Typed(entry))
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Infer the kind of one raw entry
///
/// Strings are text entries; mappings pick the first kind (in
/// [`EntryKind::ALL`] order) whose characteristic keys are all present.
/// Section normalization calls this on the first entry only.
pub fn infer_entry_kind(value: &Value) -> Option<EntryKind> {
    match value {
        Value::String(_) => Some(EntryKind::Text),
        Value::Object(map) => EntryKind::ALL
            .into_iter()
            .filter(|kind| *kind != EntryKind::Text)
            .find(|kind| {
                kind.characteristic_keys()
                    .iter()
                    .all(|key| map.contains_key(*key))
            }),
        _ => None,
    }
}

/// Fields shared by the dated entry kinds
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EntryDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

impl EntryDetails {
    /// Effective end of the range: an explicit end date, or `present` when
    /// only a start date was given
    pub fn effective_end(&self) -> Option<Date> {
        match (&self.start_date, &self.end_date) {
            (_, Some(end)) => Some(end.clone()),
            (Some(_), None) => Some(Date::Present),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneLineEntry {
    pub label: String,
    pub details: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalEntry {
    pub name: String,
    #[serde(flatten)]
    pub details: EntryDetails,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    #[serde(flatten)]
    pub details: EntryDetails,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationEntry {
    pub institution: String,
    pub area: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(flatten)]
    pub details: EntryDetails,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationEntry {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulletEntry {
    pub bullet: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberedEntry {
    pub number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReversedNumberedEntry {
    pub reversed_number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fully validated structured entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedEntry {
    OneLine(OneLineEntry),
    Normal(NormalEntry),
    Experience(ExperienceEntry),
    Education(EducationEntry),
    Publication(PublicationEntry),
    Bullet(BulletEntry),
    Numbered(NumberedEntry),
    ReversedNumbered(ReversedNumberedEntry),
}

impl TypedEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            TypedEntry::OneLine(_) => EntryKind::OneLine,
            TypedEntry::Normal(_) => EntryKind::Normal,
            TypedEntry::Experience(_) => EntryKind::Experience,
            TypedEntry::Education(_) => EntryKind::Education,
            TypedEntry::Publication(_) => EntryKind::Publication,
            TypedEntry::Bullet(_) => EntryKind::Bullet,
            TypedEntry::Numbered(_) => EntryKind::Numbered,
            TypedEntry::ReversedNumbered(_) => EntryKind::ReversedNumbered,
        }
    }
}

/// One entry of a section, possibly still awaiting normalization
#[derive(Debug, Clone, PartialEq)]
pub enum SectionEntry {
    /// Plain text line
    Text(String),
    /// Validated structured entry
    Typed(TypedEntry),
    /// Mapping the generic parser did not commit to a kind
    Loose(Map<String, Value>),
}

impl SectionEntry {
    /// Known kind of the entry; `None` while it is still loose
    pub fn kind(&self) -> Option<EntryKind> {
        match self {
            SectionEntry::Text(_) => Some(EntryKind::Text),
            SectionEntry::Typed(entry) => Some(entry.kind()),
            SectionEntry::Loose(_) => None,
        }
    }

    /// Check if the entry needs no further normalization
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SectionEntry::Loose(_))
    }

    /// Raw value of the entry, as it would appear in a payload
    pub fn to_value(&self) -> Value {
        match self {
            SectionEntry::Text(text) => Value::String(text.clone()),
            SectionEntry::Typed(entry) => {
                serde_json::to_value(entry).unwrap_or_else(|_| Value::Object(Map::new()))
            }
            SectionEntry::Loose(map) => Value::Object(map.clone()),
        }
    }

    /// Accept a raw entry without committing to a kind
    pub fn loose(value: &Value, location: &[PathSegment]) -> Result<SectionEntry, FieldError> {
        match value {
            Value::String(text) => Ok(SectionEntry::Text(text.clone())),
            Value::Object(map) => Ok(SectionEntry::Loose(map.clone())),
            other => Err(FieldError::new(
                location.to_vec(),
                "Entry should be a string or a dictionary",
            )
            .with_input(other.clone())),
        }
    }
}

fn validate_text(value: &Value, location: &[PathSegment]) -> Result<SectionEntry, Vec<FieldError>> {
    match value {
        Value::String(text) => Ok(SectionEntry::Text(text.clone())),
        other => Err(vec![FieldError::new(
            location.to_vec(),
            "Input should be a valid string",
        )
        .with_input(other.clone())]),
    }
}

#[derive(Clone, Copy)]
enum DateRule {
    Start,
    End,
    Lenient,
}

fn read_date(reader: &mut FieldReader<'_>, key: &str, rule: DateRule) -> Option<Date> {
    let value = reader.raw(key)?;
    let parsed = match rule {
        DateRule::Start => Date::parse_strict(value, false),
        DateRule::End => Date::parse_strict(value, true),
        DateRule::Lenient => Date::parse_lenient(value),
    };
    match parsed {
        Ok(date) => Some(date),
        Err(message) => {
            reader.invalid(key, message, value);
            None
        }
    }
}

fn read_details(reader: &mut FieldReader<'_>) -> EntryDetails {
    let date = read_date(reader, "date", DateRule::Lenient);
    let start_date = read_date(reader, "start_date", DateRule::Start);
    let end_date = read_date(reader, "end_date", DateRule::End);

    if let (Some(Date::Calendar(start)), Some(Date::Calendar(end))) = (&start_date, &end_date) {
        if start > end {
            let input = serde_json::json!({
                "start_date": start.to_string(),
                "end_date": end.to_string(),
            });
            reader.invalid("start_date", "start_date should be before end_date", &input);
        }
    }
    if end_date.is_some() && start_date.is_none() && date.is_none() {
        let input = reader.raw("end_date").cloned().unwrap_or(Value::Null);
        reader.invalid("start_date", "end_date is given but start_date is missing", &input);
    }

    EntryDetails {
        date,
        start_date,
        end_date,
        location: reader.optional_string("location"),
        summary: reader.optional_string("summary"),
        highlights: reader.string_list("highlights"),
    }
}
