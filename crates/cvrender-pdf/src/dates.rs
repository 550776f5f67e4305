//! Locale-aware date text for entries

use std::sync::OnceLock;

use regex::{Captures, Regex};

use cvrender_schema::{CalendarDate, Date, EntryDetails, Locale};

/// Format one date with the locale's template
pub fn format_date(date: &Date, locale: &Locale) -> String {
    match date {
        Date::Calendar(calendar) => format_calendar(calendar, locale),
        Date::Present => locale.present.clone(),
        Date::Custom(text) => text.clone(),
    }
}

/// Format a calendar date
///
/// Dates without a month are printed as the bare year.
pub fn format_calendar(date: &CalendarDate, locale: &Locale) -> String {
    let Some(month) = date.month else {
        return date.year.to_string();
    };

    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"FULL_MONTH_NAME|MONTH_ABBREVIATION|MONTH_IN_TWO_DIGITS|YEAR_IN_TWO_DIGITS|MONTH|YEAR")
            .expect("valid placeholder regex")
    });

    re.replace_all(&locale.date_template, |caps: &Captures<'_>| match &caps[0] {
        "FULL_MONTH_NAME" => locale.month_name(month).to_string(),
        "MONTH_ABBREVIATION" => locale.month_abbreviation(month).to_string(),
        "MONTH_IN_TWO_DIGITS" => format!("{:02}", month),
        "YEAR_IN_TWO_DIGITS" => format!("{:02}", date.year.rem_euclid(100)),
        "MONTH" => month.to_string(),
        _ => date.year.to_string(),
    })
    .into_owned()
}

/// Date column text of an entry: its single date, or its range
pub fn date_text(details: &EntryDetails, locale: &Locale) -> Option<String> {
    if let Some(date) = &details.date {
        return Some(format_date(date, locale));
    }
    let start = details.start_date.as_ref()?;
    let end = details.effective_end().unwrap_or(Date::Present);
    Some(format!(
        "{} {} {}",
        format_date(start, locale),
        locale.to,
        format_date(&end, locale)
    ))
}

/// Length of an entry's date range, e.g. "2 years 3 months"
///
/// An open range is measured up to `today`; without it no duration is
/// given.
pub fn duration_text(details: &EntryDetails, locale: &Locale, today: Option<&CalendarDate>) -> Option<String> {
    let start = details.start_date.as_ref()?.calendar()?;
    let end = match details.effective_end()? {
        Date::Calendar(end) => end,
        Date::Present => *today?,
        Date::Custom(_) => return None,
    };

    let total = (end.months_since_epoch() - start.months_since_epoch()).max(1);
    let (years, months) = (total / 12, total % 12);

    let mut parts = Vec::new();
    if years > 0 {
        let word = if years == 1 { &locale.year } else { &locale.years };
        parts.push(format!("{} {}", years, word));
    }
    if months > 0 {
        let word = if months == 1 { &locale.month } else { &locale.months };
        parts.push(format!("{} {}", months, word));
    }
    Some(parts.join(" "))
}
