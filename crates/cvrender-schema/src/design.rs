//! Design (theme and visual settings)
//!
//! A design is selected by its `theme`; every theme carries a complete set
//! of defaults, so a partially specified design mapping is completed
//! against the defaults of the theme it names (`classic` when none).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::diagnostics::{path, FieldError, PathSegment, ValidationError};
use crate::locale::{Language, Locale};
use crate::reader::FieldReader;

/// Built-in themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Classic,
    Sb2nov,
    ModernCv,
    EngineeringResumes,
    EngineeringClassic,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Classic,
        Theme::Sb2nov,
        Theme::ModernCv,
        Theme::EngineeringResumes,
        Theme::EngineeringClassic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Sb2nov => "sb2nov",
            Theme::ModernCv => "moderncv",
            Theme::EngineeringResumes => "engineeringresumes",
            Theme::EngineeringClassic => "engineeringclassic",
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        Theme::ALL.into_iter().find(|theme| theme.name() == name)
    }

    /// Complete default design of this theme
    pub fn defaults(self) -> Design {
        let blue = Color::rgb(0, 79, 144);
        let black = Color::rgb(0, 0, 0);

        let (font_family, colors, header_alignment, section_line, margin) = match self {
            Theme::Classic => ("Source Sans 3", (black, blue, blue, blue), Alignment::Center, true, "2cm"),
            Theme::Sb2nov => (
                "New Computer Modern",
                (black, black, black, black),
                Alignment::Center,
                true,
                "2cm",
            ),
            Theme::ModernCv => ("Fontin", (black, blue, blue, blue), Alignment::Left, false, "1.5cm"),
            Theme::EngineeringResumes => (
                "XCharter",
                (black, black, black, blue),
                Alignment::Center,
                true,
                "2cm",
            ),
            Theme::EngineeringClassic => ("Raleway", (black, blue, blue, blue), Alignment::Left, true, "2cm"),
        };
        let (text, name, section_titles, links) = colors;
        let margin = Length(margin.to_string());

        Design {
            theme: self,
            page: PageSettings {
                size: PageSize::UsLetter,
                top_margin: margin.clone(),
                bottom_margin: margin.clone(),
                left_margin: margin.clone(),
                right_margin: margin,
                show_page_numbering: true,
                show_last_updated_date: true,
            },
            colors: ColorSettings {
                text,
                name,
                section_titles,
                links,
            },
            text: TextSettings {
                font_family: font_family.to_string(),
                font_size: Length("10pt".to_string()),
                leading: Length("0.6em".to_string()),
                alignment: TextAlignment::Justified,
            },
            header: HeaderSettings {
                name_font_size: Length("30pt".to_string()),
                alignment: header_alignment,
                separator: "|".to_string(),
            },
            section_titles: SectionTitleSettings {
                bold: true,
                line: section_line,
                small_caps: matches!(self, Theme::Sb2nov | Theme::EngineeringClassic),
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Theme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Paper size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSize {
    A4,
    A5,
    UsLetter,
    UsExecutive,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [PageSize::A4, PageSize::A5, PageSize::UsLetter, PageSize::UsExecutive];

    /// Paper name understood by Typst
    pub fn name(self) -> &'static str {
        match self {
            PageSize::A4 => "a4",
            PageSize::A5 => "a5",
            PageSize::UsLetter => "us-letter",
            PageSize::UsExecutive => "us-executive",
        }
    }

    pub fn from_name(name: &str) -> Option<PageSize> {
        PageSize::ALL.into_iter().find(|size| size.name() == name)
    }

    /// Customary paper for documents written in `language`
    pub fn for_language(language: Language) -> PageSize {
        match language {
            Language::English => PageSize::UsLetter,
            _ => PageSize::A4,
        }
    }
}

impl Serialize for PageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A validated Typst length (`2cm`, `10pt`, `0.6em`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Length(String);

impl Length {
    pub fn parse(text: &str) -> Option<Length> {
        static LENGTH_RE: OnceLock<Regex> = OnceLock::new();
        let re = LENGTH_RE.get_or_init(|| {
            Regex::new(r"^\d+(?:\.\d+)?\s*(?:cm|mm|in|pt|em)$").expect("valid length regex")
        });
        let trimmed = text.trim();
        re.is_match(trimmed)
            .then(|| Length(trimmed.split_whitespace().collect::<String>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `#rgb` or `rgb(r, g, b)`
    pub fn parse(text: &str) -> Option<Color> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            let expanded: String = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect(),
                6 => hex.to_string(),
                _ => return None,
            };
            let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
            return Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        let inner = text.strip_prefix("rgb(")?.strip_suffix(')')?;
        let channels: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().ok())
            .collect::<Option<Vec<_>>>()?;
        match channels.as_slice() {
            [r, g, b] => Some(Color::rgb(*r, *g, *b)),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Horizontal alignment of the header block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    fn from_name(name: &str) -> Option<Alignment> {
        match name {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Body text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlignment {
    Left,
    Justified,
    JustifiedWithNoHyphenation,
}

impl TextAlignment {
    fn from_name(name: &str) -> Option<TextAlignment> {
        match name {
            "left" => Some(TextAlignment::Left),
            "justified" => Some(TextAlignment::Justified),
            "justified-with-no-hyphenation" => Some(TextAlignment::JustifiedWithNoHyphenation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSettings {
    pub size: PageSize,
    pub top_margin: Length,
    pub bottom_margin: Length,
    pub left_margin: Length,
    pub right_margin: Length,
    pub show_page_numbering: bool,
    pub show_last_updated_date: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorSettings {
    pub text: Color,
    pub name: Color,
    pub section_titles: Color,
    pub links: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSettings {
    pub font_family: String,
    pub font_size: Length,
    pub leading: Length,
    pub alignment: TextAlignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSettings {
    pub name_font_size: Length,
    pub alignment: Alignment,
    pub separator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionTitleSettings {
    pub bold: bool,
    pub line: bool,
    pub small_caps: bool,
}

/// A resolved design
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Design {
    pub theme: Theme,
    pub page: PageSettings,
    pub colors: ColorSettings,
    pub text: TextSettings,
    pub header: HeaderSettings,
    pub section_titles: SectionTitleSettings,
}

impl Default for Design {
    fn default() -> Self {
        Theme::Classic.defaults()
    }
}

/// Validator for design mappings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignSchema {
    themes: Vec<Theme>,
}

impl Default for DesignSchema {
    fn default() -> Self {
        Self::new(Theme::ALL)
    }
}

impl DesignSchema {
    /// Schema accepting the given themes; the first one is the default
    pub fn new(themes: impl IntoIterator<Item = Theme>) -> Self {
        Self {
            themes: themes.into_iter().collect(),
        }
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Design used when the payload gives none
    pub fn default_design(&self) -> Design {
        self.themes.first().copied().unwrap_or(Theme::Classic).defaults()
    }

    /// Validate a design mapping and complete it from theme defaults
    ///
    /// `locale` is an optional context: when given and the mapping leaves
    /// `page.size` unset, the paper customary for that language is used.
    pub fn validate(&self, value: &Value, locale: Option<&Locale>) -> Result<Design, ValidationError> {
        let root = path(["design"]);
        let mut reader = FieldReader::new(value, &root).map_err(ValidationError::single)?;

        let default_theme = self.themes.first().copied().unwrap_or(Theme::Classic);
        let theme = match reader.optional_string("theme") {
            None => default_theme,
            Some(name) => match Theme::from_name(&name).filter(|t| self.themes.contains(t)) {
                Some(theme) => theme,
                None => {
                    let expected = self
                        .themes
                        .iter()
                        .map(|t| format!("'{}'", t.name()))
                        .collect::<Vec<_>>()
                        .join(", ");
                    reader.invalid("theme", format!("Input should be {}", expected), &Value::String(name));
                    default_theme
                }
            },
        };

        let mut design = theme.defaults();
        if let Some(locale) = locale {
            design.page.size = PageSize::for_language(locale.language);
        }

        if let Some(map) = reader.optional_map("page") {
            let errors = apply_page(&mut design.page, map, &reader.location_of("page"));
            reader.extend_errors(errors);
        }
        if let Some(map) = reader.optional_map("colors") {
            let errors = apply_colors(&mut design.colors, map, &reader.location_of("colors"));
            reader.extend_errors(errors);
        }
        if let Some(map) = reader.optional_map("text") {
            let errors = apply_text(&mut design.text, map, &reader.location_of("text"));
            reader.extend_errors(errors);
        }
        if let Some(map) = reader.optional_map("header") {
            let errors = apply_header(&mut design.header, map, &reader.location_of("header"));
            reader.extend_errors(errors);
        }
        if let Some(map) = reader.optional_map("section_titles") {
            let errors = apply_section_titles(
                &mut design.section_titles,
                map,
                &reader.location_of("section_titles"),
            );
            reader.extend_errors(errors);
        }

        reader.finish_strict()?;
        Ok(design)
    }
}

fn read_length(reader: &mut FieldReader<'_>, key: &str, slot: &mut Length) {
    if let Some(text) = reader.optional_string(key) {
        match Length::parse(&text) {
            Some(length) => *slot = length,
            None => reader.invalid(
                key,
                "Length should be a number followed by cm, mm, in, pt or em",
                &Value::String(text),
            ),
        }
    }
}

fn read_color(reader: &mut FieldReader<'_>, key: &str, slot: &mut Color) {
    if let Some(text) = reader.optional_string(key) {
        match Color::parse(&text) {
            Some(color) => *slot = color,
            None => reader.invalid(
                key,
                "Color should be #rrggbb, #rgb or rgb(r, g, b)",
                &Value::String(text),
            ),
        }
    }
}

fn read_flag(reader: &mut FieldReader<'_>, key: &str, slot: &mut bool) {
    if let Some(flag) = reader.optional_bool(key) {
        *slot = flag;
    }
}

fn apply_page(page: &mut PageSettings, map: &Map<String, Value>, location: &[PathSegment]) -> Vec<FieldError> {
    let mut reader = FieldReader::from_map(map, location);
    if let Some(name) = reader.optional_string("size") {
        match PageSize::from_name(&name) {
            Some(size) => page.size = size,
            None => reader.invalid(
                "size",
                "Input should be 'a4', 'a5', 'us-letter' or 'us-executive'",
                &Value::String(name),
            ),
        }
    }
    read_length(&mut reader, "top_margin", &mut page.top_margin);
    read_length(&mut reader, "bottom_margin", &mut page.bottom_margin);
    read_length(&mut reader, "left_margin", &mut page.left_margin);
    read_length(&mut reader, "right_margin", &mut page.right_margin);
    read_flag(&mut reader, "show_page_numbering", &mut page.show_page_numbering);
    read_flag(&mut reader, "show_last_updated_date", &mut page.show_last_updated_date);
    reader.finish_strict().err().unwrap_or_default()
}

fn apply_colors(colors: &mut ColorSettings, map: &Map<String, Value>, location: &[PathSegment]) -> Vec<FieldError> {
    let mut reader = FieldReader::from_map(map, location);
    read_color(&mut reader, "text", &mut colors.text);
    read_color(&mut reader, "name", &mut colors.name);
    read_color(&mut reader, "section_titles", &mut colors.section_titles);
    read_color(&mut reader, "links", &mut colors.links);
    reader.finish_strict().err().unwrap_or_default()
}

fn apply_text(text: &mut TextSettings, map: &Map<String, Value>, location: &[PathSegment]) -> Vec<FieldError> {
    let mut reader = FieldReader::from_map(map, location);
    if let Some(family) = reader.optional_string("font_family") {
        text.font_family = family;
    }
    read_length(&mut reader, "font_size", &mut text.font_size);
    read_length(&mut reader, "leading", &mut text.leading);
    if let Some(name) = reader.optional_string("alignment") {
        match TextAlignment::from_name(&name) {
            Some(alignment) => text.alignment = alignment,
            None => reader.invalid(
                "alignment",
                "Input should be 'left', 'justified' or 'justified-with-no-hyphenation'",
                &Value::String(name),
            ),
        }
    }
    reader.finish_strict().err().unwrap_or_default()
}

fn apply_header(header: &mut HeaderSettings, map: &Map<String, Value>, location: &[PathSegment]) -> Vec<FieldError> {
    let mut reader = FieldReader::from_map(map, location);
    read_length(&mut reader, "name_font_size", &mut header.name_font_size);
    if let Some(name) = reader.optional_string("alignment") {
        match Alignment::from_name(&name) {
            Some(alignment) => header.alignment = alignment,
            None => reader.invalid(
                "alignment",
                "Input should be 'left', 'center' or 'right'",
                &Value::String(name),
            ),
        }
    }
    if let Some(separator) = reader.optional_string("separator") {
        header.separator = separator;
    }
    reader.finish_strict().err().unwrap_or_default()
}

fn apply_section_titles(
    titles: &mut SectionTitleSettings,
    map: &Map<String, Value>,
    location: &[PathSegment],
) -> Vec<FieldError> {
    let mut reader = FieldReader::from_map(map, location);
    read_flag(&mut reader, "bold", &mut titles.bold);
    read_flag(&mut reader, "line", &mut titles.line);
    read_flag(&mut reader, "small_caps", &mut titles.small_caps);
    reader.finish_strict().err().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_theme_only_mapping() {
        let design = DesignSchema::default()
            .validate(&json!({"theme": "classic"}), None)
            .unwrap();
        assert_eq!(design.theme, Theme::Classic);
        assert_eq!(design, Theme::Classic.defaults());
    }

    #[test]
    fn test_partial_mapping_completed_from_selected_theme() {
        let design = DesignSchema::default()
            .validate(
                &json!({"theme": "moderncv", "colors": {"name": "#ff0000"}}),
                None,
            )
            .unwrap();
        let defaults = Theme::ModernCv.defaults();
        assert_eq!(design.colors.name, Color::rgb(255, 0, 0));
        assert_eq!(design.colors.links, defaults.colors.links);
        assert_eq!(design.text.font_family, defaults.text.font_family);
        assert_eq!(design.header.alignment, Alignment::Left);
    }

    #[test]
    fn test_missing_theme_uses_schema_default() {
        let design = DesignSchema::default()
            .validate(&json!({"page": {"size": "a4"}}), None)
            .unwrap();
        assert_eq!(design.theme, Theme::Classic);
        assert_eq!(design.page.size, PageSize::A4);
    }

    #[test]
    fn test_locale_context_sets_paper() {
        let german = Language::German.defaults();
        let design = DesignSchema::default()
            .validate(&json!({}), Some(&german))
            .unwrap();
        assert_eq!(design.page.size, PageSize::A4);

        let design = DesignSchema::default().validate(&json!({}), None).unwrap();
        assert_eq!(design.page.size, PageSize::UsLetter);
    }

    #[test]
    fn test_collects_nested_errors() {
        let err = DesignSchema::default()
            .validate(
                &json!({
                    "theme": "neon",
                    "page": {"top_margin": "two inches"},
                    "colors": {"links": "blue"},
                    "sparkles": true
                }),
                None,
            )
            .unwrap_err();
        let locations: Vec<String> = err.iter().map(FieldError::location_string).collect();
        assert_eq!(
            locations,
            vec![
                "design.theme",
                "design.page.top_margin",
                "design.colors.links",
                "design.sparkles"
            ]
        );
    }

    #[test]
    fn test_restricted_schema_rejects_other_themes() {
        let schema = DesignSchema::new([Theme::Sb2nov]);
        assert_eq!(schema.default_design().theme, Theme::Sb2nov);
        assert!(schema.validate(&json!({"theme": "classic"}), None).is_err());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(Color::parse("#004f90"), Some(Color::rgb(0, 79, 144)));
        assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::parse("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
        assert_eq!(Color::parse("rgb(1, 2)"), None);
        assert_eq!(Color::parse("rgb(256, 0, 0)"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
        assert_eq!(Color::rgb(0, 79, 144).to_string(), "rgb(0, 79, 144)");
    }

    #[test]
    fn test_length_parsing() {
        assert_eq!(Length::parse("2 cm").map(|l| l.to_string()), Some("2cm".to_string()));
        assert!(Length::parse("0.5in").is_some());
        assert!(Length::parse("10px").is_none());
        assert!(Length::parse("cm").is_none());
    }
}
