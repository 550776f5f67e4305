//! Entry dates
//!
//! Accepted spellings: `YYYY`, `YYYY-MM`, `YYYY-MM-DD` (integer years too),
//! `present` for open-ended ranges, and free text for the `date` field
//! ("Fall 2023").

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A calendar date with optional month and day precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl CalendarDate {
    /// Month index counted from year zero, used for durations
    pub fn months_since_epoch(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month.unwrap_or(1)) - 1
    }
}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month.unwrap_or(1), self.day.unwrap_or(1)).cmp(&(
            other.year,
            other.month.unwrap_or(1),
            other.day.unwrap_or(1),
        ))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
            if let Some(day) = self.day {
                write!(f, "-{:02}", day)?;
            }
        }
        Ok(())
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A date as written in an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Date {
    /// Parsed calendar date
    Calendar(CalendarDate),
    /// Open end of a range
    Present,
    /// Free text, only allowed in the `date` field
    Custom(String),
}

impl Date {
    /// Parse a strict date (`start_date` / `end_date`)
    ///
    /// `allow_present` admits the literal `present` (end dates only).
    pub fn parse_strict(value: &Value, allow_present: bool) -> Result<Date, String> {
        let text = match value {
            Value::Number(number) => number.to_string(),
            Value::String(text) => text.trim().to_string(),
            _ => return Err("Input should be a valid date string".to_string()),
        };

        if allow_present && text.eq_ignore_ascii_case("present") {
            return Ok(Date::Present);
        }

        parse_calendar(&text).map(Date::Calendar).ok_or_else(|| {
            if allow_present {
                "Date should be in YYYY-MM-DD, YYYY-MM, YYYY format or \"present\"".to_string()
            } else {
                "Date should be in YYYY-MM-DD, YYYY-MM or YYYY format".to_string()
            }
        })
    }

    /// Parse the free-form `date` field: calendar dates are recognised,
    /// anything else is kept as text
    pub fn parse_lenient(value: &Value) -> Result<Date, String> {
        match value {
            Value::Number(_) => Date::parse_strict(value, true),
            Value::String(text) => {
                let trimmed = text.trim();
                if trimmed.eq_ignore_ascii_case("present") {
                    return Ok(Date::Present);
                }
                Ok(parse_calendar(trimmed)
                    .map(Date::Calendar)
                    .unwrap_or_else(|| Date::Custom(text.clone())))
            }
            _ => Err("Input should be a valid string".to_string()),
        }
    }

    /// Calendar part, if any
    pub fn calendar(&self) -> Option<&CalendarDate> {
        match self {
            Date::Calendar(date) => Some(date),
            _ => None,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Date::Calendar(date) => write!(f, "{}", date),
            Date::Present => write!(f, "present"),
            Date::Custom(text) => write!(f, "{}", text),
        }
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_calendar(text: &str) -> Option<CalendarDate> {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_RE.get_or_init(|| {
        Regex::new(r"^(\d{4})(?:-(\d{2})(?:-(\d{2}))?)?$").expect("valid date regex")
    });

    let caps = re.captures(text)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month = match caps.get(2) {
        Some(m) => Some(m.as_str().parse::<u8>().ok().filter(|m| (1..=12).contains(m))?),
        None => None,
    };
    let day = match (month, caps.get(3)) {
        (Some(month), Some(d)) => {
            let day = d.as_str().parse::<u8>().ok()?;
            if day == 0 || day > days_in_month(year, month) {
                return None;
            }
            Some(day)
        }
        _ => None,
    };

    Some(CalendarDate { year, month, day })
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_precisions() {
        let full = Date::parse_strict(&json!("2021-03-14"), false).unwrap();
        assert_eq!(full.to_string(), "2021-03-14");

        let month = Date::parse_strict(&json!("2021-03"), false).unwrap();
        assert_eq!(
            month,
            Date::Calendar(CalendarDate {
                year: 2021,
                month: Some(3),
                day: None
            })
        );

        let year = Date::parse_strict(&json!(2019), false).unwrap();
        assert_eq!(year.to_string(), "2019");
    }

    #[test]
    fn test_present_only_when_allowed() {
        assert_eq!(
            Date::parse_strict(&json!("present"), true).unwrap(),
            Date::Present
        );
        assert!(Date::parse_strict(&json!("present"), false).is_err());
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert!(Date::parse_strict(&json!("2021-13"), false).is_err());
        assert!(Date::parse_strict(&json!("2021-02-30"), false).is_err());
        assert!(Date::parse_strict(&json!("2024-02-29"), false).is_ok());
        assert!(Date::parse_strict(&json!("March 2021"), false).is_err());
    }

    #[test]
    fn test_lenient_keeps_free_text() {
        assert_eq!(
            Date::parse_lenient(&json!("Fall 2023")).unwrap(),
            Date::Custom("Fall 2023".to_string())
        );
        assert!(Date::parse_lenient(&json!("2023-09")).unwrap().calendar().is_some());
        assert!(Date::parse_lenient(&json!(["2023"])).is_err());
    }

    #[test]
    fn test_ordering_uses_missing_parts_as_first() {
        let a = CalendarDate { year: 2020, month: None, day: None };
        let b = CalendarDate { year: 2020, month: Some(1), day: Some(2) };
        assert!(a < b);
    }

    #[test]
    fn test_serializes_as_string() {
        let date = Date::parse_strict(&json!("2020-05"), false).unwrap();
        assert_eq!(serde_json::to_value(&date).unwrap(), json!("2020-05"));
    }
}
