//! Locale variants
//!
//! Each [`Language`] is one variant of the locale family. Its `language`
//! code is the discriminator used to pick the variant when a locale is
//! given as a mapping; every other field defaults to the variant's
//! translations.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::diagnostics::{FieldError, PathSegment};
use crate::reader::FieldReader;

/// Placeholders understood in [`Locale::date_template`]
pub const DATE_PLACEHOLDERS: &[&str] = &[
    "FULL_MONTH_NAME",
    "MONTH_ABBREVIATION",
    "MONTH_IN_TWO_DIGITS",
    "MONTH",
    "YEAR_IN_TWO_DIGITS",
    "YEAR",
];

/// The closed family of locale variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    German,
    French,
    Spanish,
    Italian,
    Portuguese,
    Turkish,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::German,
        Language::French,
        Language::Spanish,
        Language::Italian,
        Language::Portuguese,
        Language::Turkish,
    ];

    /// Discriminator value of this variant
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Turkish => "tr",
        }
    }

    /// Variant name used in union validation diagnostics
    pub fn variant_name(self) -> &'static str {
        match self {
            Language::English => "EnglishLocale",
            Language::German => "GermanLocale",
            Language::French => "FrenchLocale",
            Language::Spanish => "SpanishLocale",
            Language::Italian => "ItalianLocale",
            Language::Portuguese => "PortugueseLocale",
            Language::Turkish => "TurkishLocale",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|lang| lang.code() == code)
    }

    /// Fully defaulted locale of this variant
    pub fn defaults(self) -> Locale {
        let (names, abbreviations, words) = match self {
            Language::English => (
                [
                    "January", "February", "March", "April", "May", "June", "July", "August",
                    "September", "October", "November", "December",
                ],
                [
                    "Jan", "Feb", "Mar", "Apr", "May", "June", "July", "Aug", "Sept", "Oct",
                    "Nov", "Dec",
                ],
                ["present", "Last updated in", "year", "years", "month", "months"],
            ),
            Language::German => (
                [
                    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August",
                    "September", "Oktober", "November", "Dezember",
                ],
                [
                    "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.",
                    "Okt.", "Nov.", "Dez.",
                ],
                ["heute", "Zuletzt aktualisiert im", "Jahr", "Jahre", "Monat", "Monate"],
            ),
            Language::French => (
                [
                    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
                    "septembre", "octobre", "novembre", "décembre",
                ],
                [
                    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.",
                    "oct.", "nov.", "déc.",
                ],
                ["présent", "Dernière mise à jour en", "an", "ans", "mois", "mois"],
            ),
            Language::Spanish => (
                [
                    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
                    "septiembre", "octubre", "noviembre", "diciembre",
                ],
                [
                    "ene.", "feb.", "mar.", "abr.", "may.", "jun.", "jul.", "ago.", "sept.",
                    "oct.", "nov.", "dic.",
                ],
                ["presente", "Última actualización en", "año", "años", "mes", "meses"],
            ),
            Language::Italian => (
                [
                    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio",
                    "agosto", "settembre", "ottobre", "novembre", "dicembre",
                ],
                [
                    "gen.", "feb.", "mar.", "apr.", "mag.", "giu.", "lug.", "ago.", "set.",
                    "ott.", "nov.", "dic.",
                ],
                ["presente", "Ultimo aggiornamento a", "anno", "anni", "mese", "mesi"],
            ),
            Language::Portuguese => (
                [
                    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho",
                    "agosto", "setembro", "outubro", "novembro", "dezembro",
                ],
                [
                    "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.",
                    "out.", "nov.", "dez.",
                ],
                ["presente", "Última atualização em", "ano", "anos", "mês", "meses"],
            ),
            Language::Turkish => (
                [
                    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos",
                    "Eylül", "Ekim", "Kasım", "Aralık",
                ],
                [
                    "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas",
                    "Ara",
                ],
                ["devam ediyor", "Son güncelleme", "yıl", "yıl", "ay", "ay"],
            ),
        };

        let [present, last_updated, year, years, month, months] = words;
        Locale {
            language: self,
            month_names: names.iter().map(ToString::to_string).collect(),
            month_abbreviations: abbreviations.iter().map(ToString::to_string).collect(),
            present: present.to_string(),
            to: "–".to_string(),
            last_updated: last_updated.to_string(),
            year: year.to_string(),
            years: years.to_string(),
            month: month.to_string(),
            months: months.to_string(),
            date_template: "MONTH_ABBREVIATION YEAR".to_string(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A resolved locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locale {
    pub language: Language,
    pub month_names: Vec<String>,
    pub month_abbreviations: Vec<String>,
    pub present: String,
    pub to: String,
    pub last_updated: String,
    pub year: String,
    pub years: String,
    pub month: String,
    pub months: String,
    pub date_template: String,
}

impl Default for Locale {
    fn default() -> Self {
        Language::English.defaults()
    }
}

impl Locale {
    /// Validate a mapping as one specific variant, completing missing fields
    /// from that variant's defaults
    pub fn parse_variant(
        language: Language,
        value: &Value,
        location: &[PathSegment],
    ) -> Result<Locale, Vec<FieldError>> {
        let mut reader = FieldReader::new(value, location).map_err(|e| vec![e])?;
        let mut locale = language.defaults();

        if let Some(raw) = reader.raw("language") {
            if raw.as_str() != Some(language.code()) {
                reader.invalid("language", format!("Input should be '{}'", language.code()), raw);
            }
        }

        for (key, slot) in [
            ("present", &mut locale.present),
            ("to", &mut locale.to),
            ("last_updated", &mut locale.last_updated),
            ("year", &mut locale.year),
            ("years", &mut locale.years),
            ("month", &mut locale.month),
            ("months", &mut locale.months),
        ] {
            if let Some(text) = reader.optional_string(key) {
                *slot = text;
            }
        }

        if let Some(names) = read_twelve(&mut reader, "month_names") {
            locale.month_names = names;
        }
        if let Some(names) = read_twelve(&mut reader, "month_abbreviations") {
            locale.month_abbreviations = names;
        }

        if let Some(template) = reader.optional_string("date_template") {
            if DATE_PLACEHOLDERS.iter().any(|p| template.contains(p)) {
                locale.date_template = template;
            } else {
                reader.invalid(
                    "date_template",
                    format!(
                        "Template should contain at least one of {}",
                        DATE_PLACEHOLDERS.join(", ")
                    ),
                    &Value::String(template),
                );
            }
        }

        reader.finish_strict()?;
        Ok(locale)
    }

    /// Full month name, 1-based
    pub fn month_name(&self, month: u8) -> &str {
        month_lookup(&self.month_names, month)
    }

    /// Abbreviated month name, 1-based
    pub fn month_abbreviation(&self, month: u8) -> &str {
        month_lookup(&self.month_abbreviations, month)
    }
}

fn month_lookup(names: &[String], month: u8) -> &str {
    usize::from(month)
        .checked_sub(1)
        .and_then(|index| names.get(index))
        .map(String::as_str)
        .unwrap_or("")
}

fn read_twelve(reader: &mut FieldReader<'_>, key: &str) -> Option<Vec<String>> {
    let raw = reader.raw(key)?;
    let before = reader.error_count();
    let names = reader.string_list(key);
    if reader.error_count() > before {
        return None;
    }
    if names.len() != 12 {
        reader.invalid(key, "List should have exactly 12 items", raw);
        return None;
    }
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::path;
    use serde_json::json;

    #[test]
    fn test_every_variant_has_twelve_months() {
        for lang in Language::ALL {
            let locale = lang.defaults();
            assert_eq!(locale.month_names.len(), 12, "{}", lang);
            assert_eq!(locale.month_abbreviations.len(), 12, "{}", lang);
            assert_eq!(locale.language, lang);
        }
    }

    #[test]
    fn test_code_roundtrip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code("xx"), None);
    }

    #[test]
    fn test_partial_mapping_completed_from_variant() {
        let value = json!({"language": "de", "present": "jetzt"});
        let locale = Locale::parse_variant(Language::German, &value, &[]).unwrap();
        assert_eq!(locale.present, "jetzt");
        assert_eq!(locale.month_name(3), "März");
        assert_eq!(locale.years, "Jahre");
    }

    #[test]
    fn test_discriminator_mismatch_rejected() {
        let value = json!({"language": "de"});
        let errors = Locale::parse_variant(Language::English, &value, &path(["locale"])).unwrap_err();
        assert_eq!(errors[0].location_string(), "locale.language");
        assert_eq!(errors[0].message, "Input should be 'en'");
    }

    #[test]
    fn test_month_list_length_checked() {
        let value = json!({"month_names": ["Jan"]});
        let errors = Locale::parse_variant(Language::English, &value, &[]).unwrap_err();
        assert!(errors[0].message.contains("12"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let value = json!({"language": "en", "currency": "EUR"});
        let errors = Locale::parse_variant(Language::English, &value, &[]).unwrap_err();
        assert_eq!(errors[0].location_string(), "currency");
    }

    #[test]
    fn test_date_template_needs_placeholder() {
        let value = json!({"date_template": "whenever"});
        assert!(Locale::parse_variant(Language::English, &value, &[]).is_err());

        let value = json!({"date_template": "FULL_MONTH_NAME YEAR"});
        let locale = Locale::parse_variant(Language::English, &value, &[]).unwrap();
        assert_eq!(locale.date_template, "FULL_MONTH_NAME YEAR");
    }

    #[test]
    fn test_month_lookup_out_of_range() {
        let locale = Locale::default();
        assert_eq!(locale.month_abbreviation(1), "Jan");
        assert_eq!(locale.month_abbreviation(0), "");
        assert_eq!(locale.month_abbreviation(13), "");
    }
}
