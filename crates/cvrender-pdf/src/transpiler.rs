//! Document model to Typst markup transpiler

use std::sync::OnceLock;

use regex::Regex;

use cvrender_schema::{
    Cv, Design, DocumentModel, EducationEntry, EntryDetails, ExperienceEntry, Locale, NormalEntry,
    PublicationEntry, Resolvable, SectionEntry, TextAlignment, TypedEntry,
};

use crate::dates::{date_text, duration_text, format_calendar, format_date};
use crate::error::{PdfError, Result};

/// Transpiler for converting a document model to Typst markup
pub struct Transpiler;

/// Per-render state shared by the entry writers
struct Context<'a> {
    locale: &'a Locale,
    model: &'a DocumentModel,
    keywords: Option<Regex>,
}

impl Transpiler {
    /// Transpile a document model to Typst markup
    ///
    /// The design must be resolved; a design that never passed validation
    /// is rejected.
    pub fn transpile(model: &DocumentModel) -> Result<String> {
        let design = resolved_design(model)?;
        let ctx = Context {
            locale: &model.locale,
            model,
            keywords: keyword_regex(&model.settings.bold_keywords),
        };

        let mut output = String::new();
        output.push_str(&Self::preamble(&model.cv, design));

        if let Some(today) = &model.settings.current_date {
            if design.page.show_last_updated_date {
                output.push_str(&format!(
                    "#align(right)[#text(size: 8pt, fill: luma(120))[{}]]\n\n",
                    escape_markup(&format!(
                        "{} {}",
                        model.locale.last_updated,
                        format_calendar(today, &model.locale)
                    ))
                ));
            }
        }

        output.push_str(&Self::header(&model.cv, design));

        for (title, entries) in &model.cv.sections {
            output.push_str(&format!("== {}\n\n", escape_markup(title)));
            output.push_str(&Self::section_body(title, entries, &ctx)?);
        }

        Ok(output)
    }

    /// Set and show rules derived from the design
    fn preamble(cv: &Cv, design: &Design) -> String {
        let page = &design.page;
        let text = &design.text;
        let colors = &design.colors;
        let titles = &design.section_titles;

        let mut output = String::new();
        output.push_str(&format!(
            "#set document(title: \"{}\", author: \"{}\")\n",
            escape_string(&format!("{}'s CV", cv.name)),
            escape_string(&cv.name)
        ));
        output.push_str(&format!(
            "#set page(paper: \"{}\", margin: (top: {}, bottom: {}, left: {}, right: {}), numbering: {})\n",
            page.size.name(),
            page.top_margin,
            page.bottom_margin,
            page.left_margin,
            page.right_margin,
            if page.show_page_numbering { "\"1 / 1\"" } else { "none" }
        ));
        output.push_str(&format!(
            "#set text(font: \"{}\", size: {}, fill: {}, hyphenate: {})\n",
            escape_string(&text.font_family),
            text.font_size,
            colors.text,
            !matches!(text.alignment, TextAlignment::JustifiedWithNoHyphenation)
        ));
        output.push_str(&format!(
            "#set par(justify: {}, leading: {})\n",
            !matches!(text.alignment, TextAlignment::Left),
            text.leading
        ));
        output.push_str(&format!("#show link: set text(fill: {})\n", colors.links));

        let title_body = if titles.small_caps {
            "#smallcaps(it.body)"
        } else {
            "#it.body"
        };
        let rule = if titles.line {
            format!(
                "\n  #v(-0.8em)\n  #line(length: 100%, stroke: 0.5pt + {})",
                colors.section_titles
            )
        } else {
            String::new()
        };
        output.push_str(&format!(
            "#show heading.where(level: 2): it => block(width: 100%, above: 1.2em, below: 0.8em)[\n  #text(fill: {}, weight: \"{}\")[{}]{}\n]\n\n",
            colors.section_titles,
            if titles.bold { "bold" } else { "regular" },
            title_body,
            rule
        ));
        output
    }

    /// Name and contact line
    fn header(cv: &Cv, design: &Design) -> String {
        let alignment = design.header.alignment.name();
        let mut output = format!(
            "#align({})[#text(size: {}, fill: {}, weight: \"bold\")[{}]]\n\n",
            alignment,
            design.header.name_font_size,
            design.colors.name,
            escape_markup(&cv.name)
        );

        let mut contacts = Vec::new();
        if let Some(location) = &cv.location {
            contacts.push(escape_markup(location));
        }
        if let Some(email) = &cv.email {
            contacts.push(link(&format!("mailto:{}", email), email));
        }
        if let Some(phone) = &cv.phone {
            let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
            contacts.push(link(&format!("tel:{}", digits), phone));
        }
        if let Some(website) = &cv.website {
            let shown = website
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/');
            contacts.push(link(website, shown));
        }
        for network in &cv.social_networks {
            let label = format!("{}: {}", network.network, network.username);
            match network.url() {
                Some(url) => contacts.push(link(&url, &label)),
                None => contacts.push(escape_markup(&label)),
            }
        }

        if !contacts.is_empty() {
            let separator = format!(" #h(0.4em){}#h(0.4em) ", escape_markup(&design.header.separator));
            output.push_str(&format!("#align({})[{}]\n\n", alignment, contacts.join(&separator)));
        }
        output
    }

    /// Entries of one section
    fn section_body(title: &str, entries: &[SectionEntry], ctx: &Context<'_>) -> Result<String> {
        let mut output = String::new();
        let mut reversed: Vec<String> = Vec::new();

        for entry in entries {
            match entry {
                SectionEntry::Text(text) => {
                    output.push_str(&ctx.emphasize(text));
                    output.push_str("\n\n");
                }
                SectionEntry::Typed(TypedEntry::OneLine(entry)) => {
                    output.push_str(&format!(
                        "#strong[{}:] {}\n\n",
                        escape_markup(&entry.label),
                        ctx.emphasize(&entry.details)
                    ));
                }
                SectionEntry::Typed(TypedEntry::Normal(entry)) => output.push_str(&Self::normal(entry, ctx)),
                SectionEntry::Typed(TypedEntry::Experience(entry)) => {
                    output.push_str(&Self::experience(entry, ctx))
                }
                SectionEntry::Typed(TypedEntry::Education(entry)) => {
                    output.push_str(&Self::education(entry, ctx))
                }
                SectionEntry::Typed(TypedEntry::Publication(entry)) => {
                    output.push_str(&Self::publication(entry, ctx))
                }
                SectionEntry::Typed(TypedEntry::Bullet(entry)) => {
                    output.push_str(&format!("- {}\n", ctx.emphasize(&entry.bullet)));
                }
                SectionEntry::Typed(TypedEntry::Numbered(entry)) => {
                    output.push_str(&format!("+ {}\n", ctx.emphasize(&entry.number)));
                }
                SectionEntry::Typed(TypedEntry::ReversedNumbered(entry)) => {
                    reversed.push(format!("[{}]", ctx.emphasize(&entry.reversed_number)));
                }
                SectionEntry::Loose(_) => return Err(PdfError::Unnormalized(title.to_string())),
            }
        }

        if !reversed.is_empty() {
            output.push_str(&format!("#enum(reversed: true, {})\n", reversed.join(", ")));
        }
        output.push('\n');
        Ok(output)
    }

    fn normal(entry: &NormalEntry, ctx: &Context<'_>) -> String {
        let mut output = row(
            &format!("#strong[{}]", ctx.emphasize(&entry.name)),
            &right_column(&entry.details, None, ctx.locale),
        );
        output.push_str(&details_body(&entry.details, ctx));
        output
    }

    fn experience(entry: &ExperienceEntry, ctx: &Context<'_>) -> String {
        let left = format!(
            "#strong[{}], #emph[{}]",
            escape_markup(&entry.company),
            escape_markup(&entry.position)
        );
        let today = ctx.model.settings.current_date.as_ref();
        let duration = duration_text(&entry.details, ctx.locale, today);
        let mut output = row(&left, &right_column(&entry.details, duration.as_deref(), ctx.locale));
        output.push_str(&details_body(&entry.details, ctx));
        output
    }

    fn education(entry: &EducationEntry, ctx: &Context<'_>) -> String {
        let area = match &entry.degree {
            Some(degree) => format!("{} in {}", degree, entry.area),
            None => entry.area.clone(),
        };
        let left = format!(
            "#strong[{}], {}",
            escape_markup(&entry.institution),
            escape_markup(&area)
        );
        let mut output = row(&left, &right_column(&entry.details, None, ctx.locale));
        output.push_str(&details_body(&entry.details, ctx));
        output
    }

    fn publication(entry: &PublicationEntry, ctx: &Context<'_>) -> String {
        let date = entry
            .date
            .as_ref()
            .map(|date| escape_markup(&format_date(date, ctx.locale)))
            .unwrap_or_default();
        let mut output = row(&format!("#strong[{}]", escape_markup(&entry.title)), &date);

        // The CV owner's name is emphasised among the authors
        let authors = entry
            .authors
            .iter()
            .map(|author| {
                if author == &ctx.model.cv.name {
                    format!("#strong[{}]", escape_markup(author))
                } else {
                    escape_markup(author)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!("{}\n\n", authors));

        let mut references = Vec::new();
        if let Some(doi) = &entry.doi {
            references.push(link(&format!("https://doi.org/{}", doi), doi));
        } else if let Some(url) = &entry.url {
            references.push(link(url, url));
        }
        if let Some(journal) = &entry.journal {
            references.push(format!("#emph[{}]", escape_markup(journal)));
        }
        if !references.is_empty() {
            output.push_str(&format!("{}\n\n", references.join(" #h(0.4em)|#h(0.4em) ")));
        }
        if let Some(summary) = &entry.summary {
            output.push_str(&format!("{}\n\n", ctx.emphasize(summary)));
        }
        output
    }
}

impl Context<'_> {
    /// Escape `text` and make every bold keyword strong
    fn emphasize(&self, text: &str) -> String {
        let Some(re) = &self.keywords else {
            return escape_markup(text);
        };
        let mut output = String::new();
        let mut last = 0;
        for found in re.find_iter(text) {
            output.push_str(&escape_markup(&text[last..found.start()]));
            output.push_str(&format!("#strong[{}]", escape_markup(found.as_str())));
            last = found.end();
        }
        output.push_str(&escape_markup(&text[last..]));
        output
    }
}

fn resolved_design(model: &DocumentModel) -> Result<&Design> {
    match &model.design {
        Resolvable::Resolved(design) => Ok(design),
        Resolvable::Pending(value) => Err(PdfError::Design(format!(
            "The design should be a mapping with a theme and its settings, got: {}",
            value
        ))),
    }
}

/// Regex matching any bold keyword, longest first
fn keyword_regex(keywords: &[String]) -> Option<Regex> {
    let mut keywords: Vec<&String> = keywords.iter().filter(|k| !k.is_empty()).collect();
    if keywords.is_empty() {
        return None;
    }
    keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));
    let pattern = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern).ok()
}

/// Two-column line: content left, dates and location right
fn row(left: &str, right: &str) -> String {
    format!(
        "#grid(columns: (1fr, auto), column-gutter: 1em, [{}], align(right)[{}])\n\n",
        left, right
    )
}

fn right_column(details: &EntryDetails, duration: Option<&str>, locale: &Locale) -> String {
    let mut lines = Vec::new();
    if let Some(location) = &details.location {
        lines.push(escape_markup(location));
    }
    if let Some(dates) = date_text(details, locale) {
        lines.push(escape_markup(&dates));
    }
    if let Some(duration) = duration.filter(|d| !d.is_empty()) {
        lines.push(escape_markup(duration));
    }
    lines.join(" \\\n")
}

/// Summary and highlights shared by the dated entry kinds
fn details_body(details: &EntryDetails, ctx: &Context<'_>) -> String {
    let mut output = String::new();
    if let Some(summary) = &details.summary {
        output.push_str(&format!("{}\n\n", ctx.emphasize(summary)));
    }
    for highlight in &details.highlights {
        output.push_str(&format!("- {}\n", ctx.emphasize(highlight)));
    }
    if !details.highlights.is_empty() {
        output.push('\n');
    }
    output
}

fn link(url: &str, label: &str) -> String {
    format!("#link(\"{}\")[{}]", escape_string(url), escape_markup(label))
}

/// Escape text placed in markup mode
///
/// Every ASCII punctuation character is backslash-escaped, which covers
/// markup syntax, shorthands and the characters that would continue an
/// embedded expression.
pub fn escape_markup(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_punctuation() {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape special characters in string literals for Typst
fn escape_string(s: &str) -> String {
    static ESCAPE_RE: OnceLock<Regex> = OnceLock::new();
    let re = ESCAPE_RE.get_or_init(|| Regex::new(r#"[\\"]"#).expect("valid escape regex"));
    re.replace_all(s, r"\$0").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvrender_schema::{
        BulletEntry, CalendarDate, Date, Language, OneLineEntry, PageSize, ReversedNumberedEntry,
        Theme,
    };
    use indexmap::IndexMap;
    use serde_json::{json, Map};

    fn model(sections: Vec<(&str, Vec<SectionEntry>)>) -> DocumentModel {
        let mut map = IndexMap::new();
        for (title, entries) in sections {
            map.insert(title.to_string(), entries);
        }
        DocumentModel::new(Cv {
            name: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            sections: map,
            ..Cv::default()
        })
    }

    fn experience() -> SectionEntry {
        SectionEntry::Typed(TypedEntry::Experience(ExperienceEntry {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            details: EntryDetails {
                start_date: Some(Date::Calendar(CalendarDate {
                    year: 2020,
                    month: Some(1),
                    day: None,
                })),
                highlights: vec!["Built the Rust pipeline".to_string()],
                ..EntryDetails::default()
            },
            extra: Map::new(),
        }))
    }

    #[test]
    fn test_preamble_follows_design() {
        let mut model = model(vec![]);
        let mut design = Theme::Sb2nov.defaults();
        design.page.size = PageSize::A4;
        design.page.show_page_numbering = false;
        model.design = Resolvable::Resolved(design);

        let typst = Transpiler::transpile(&model).unwrap();
        assert!(typst.contains("#set page(paper: \"a4\""));
        assert!(typst.contains("numbering: none"));
        assert!(typst.contains("font: \"New Computer Modern\""));
        assert!(typst.contains("#smallcaps(it.body)"));
    }

    #[test]
    fn test_header_links_are_escaped() {
        let typst = Transpiler::transpile(&model(vec![])).unwrap();
        assert!(typst.contains("#link(\"mailto:jane@example.com\")[jane\\@example\\.com]"));
        assert!(typst.contains("[Jane Doe]"));
    }

    #[test]
    fn test_sections_rendered_in_order() {
        let typst = Transpiler::transpile(&model(vec![
            ("Summary", vec![SectionEntry::Text("Likes #hashtags & *stars*".to_string())]),
            ("Experience", vec![experience()]),
        ]))
        .unwrap();

        let summary = typst.find("== Summary").unwrap();
        let experience = typst.find("== Experience").unwrap();
        assert!(summary < experience);
        assert!(typst.contains("Likes \\#hashtags \\& \\*stars\\*"));
        assert!(typst.contains("#strong[Acme], #emph[Engineer]"));
        assert!(typst.contains("Jan 2020 – present"));
        assert!(typst.contains("- Built the Rust pipeline"));
    }

    #[test]
    fn test_locale_words_used() {
        let mut model = model(vec![("Erfahrung", vec![experience()])]);
        model.locale = Language::German.defaults();
        model.settings.current_date = Some(CalendarDate {
            year: 2021,
            month: Some(3),
            day: None,
        });

        let typst = Transpiler::transpile(&model).unwrap();
        assert!(typst.contains("Jan\\. 2020 – heute"));
        assert!(typst.contains("1 Jahr 2 Monate"));
        assert!(typst.contains("Zuletzt aktualisiert im März 2021"));
    }

    #[test]
    fn test_bold_keywords() {
        let mut model = model(vec![("Experience", vec![experience()])]);
        model.settings.bold_keywords = vec!["Rust".to_string()];
        let typst = Transpiler::transpile(&model).unwrap();
        assert!(typst.contains("- Built the #strong[Rust] pipeline"));
    }

    #[test]
    fn test_simple_kinds() {
        let typst = Transpiler::transpile(&model(vec![
            (
                "Skills",
                vec![SectionEntry::Typed(TypedEntry::OneLine(OneLineEntry {
                    label: "Languages".to_string(),
                    details: "Rust, Go".to_string(),
                    extra: Map::new(),
                }))],
            ),
            (
                "Interests",
                vec![SectionEntry::Typed(TypedEntry::Bullet(BulletEntry {
                    bullet: "Climbing".to_string(),
                    extra: Map::new(),
                }))],
            ),
            (
                "Talks",
                vec![SectionEntry::Typed(TypedEntry::ReversedNumbered(ReversedNumberedEntry {
                    reversed_number: "RustConf".to_string(),
                    extra: Map::new(),
                }))],
            ),
        ]))
        .unwrap();
        assert!(typst.contains("#strong[Languages:] Rust\\, Go"));
        assert!(typst.contains("- Climbing"));
        assert!(typst.contains("#enum(reversed: true, [RustConf])"));
    }

    #[test]
    fn test_unresolved_design_rejected() {
        let mut model = model(vec![]);
        model.design = Resolvable::Pending(json!("classic"));
        assert!(matches!(Transpiler::transpile(&model), Err(PdfError::Design(_))));
    }

    #[test]
    fn test_loose_entries_rejected() {
        let model = model(vec![("Misc", vec![SectionEntry::Loose(Map::new())])]);
        match Transpiler::transpile(&model) {
            Err(PdfError::Unnormalized(title)) => assert_eq!(title, "Misc"),
            other => panic!("expected an unnormalized entry error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("hello"), "hello");
        assert_eq!(escape_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("C++ & Rust"), "C\\+\\+ \\& Rust");
        assert_eq!(escape_markup("= not a heading"), "\\= not a heading");
        assert_eq!(escape_markup("Zürich"), "Zürich");
    }
}
