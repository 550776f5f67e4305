//! Markdown side output

use cvrender_schema::{DocumentModel, EntryDetails, SectionEntry, TypedEntry};

use crate::dates::{date_text, format_date};

/// Writes a document model as Markdown
pub struct MarkdownWriter;

impl MarkdownWriter {
    pub fn write(model: &DocumentModel) -> String {
        let cv = &model.cv;
        let locale = &model.locale;
        let mut output = format!("# {}\n\n", cv.name);

        let mut contacts = Vec::new();
        if let Some(location) = &cv.location {
            contacts.push(location.clone());
        }
        if let Some(email) = &cv.email {
            contacts.push(format!("[{}](mailto:{})", email, email));
        }
        if let Some(phone) = &cv.phone {
            contacts.push(phone.clone());
        }
        if let Some(website) = &cv.website {
            contacts.push(format!("[{}]({})", website, website));
        }
        for network in &cv.social_networks {
            let label = format!("{}: {}", network.network, network.username);
            contacts.push(match network.url() {
                Some(url) => format!("[{}]({})", label, url),
                None => label,
            });
        }
        for contact in contacts {
            output.push_str(&format!("- {}\n", contact));
        }
        output.push('\n');

        for (title, entries) in &cv.sections {
            output.push_str(&format!("## {}\n\n", title));
            let mut reversed = Vec::new();
            for entry in entries {
                match entry {
                    SectionEntry::Text(text) => output.push_str(&format!("{}\n\n", bold(text, model))),
                    SectionEntry::Loose(_) => {}
                    SectionEntry::Typed(TypedEntry::OneLine(entry)) => {
                        output.push_str(&format!("- **{}:** {}\n", entry.label, bold(&entry.details, model)))
                    }
                    SectionEntry::Typed(TypedEntry::Normal(entry)) => {
                        output.push_str(&format!("**{}**", entry.name));
                        output.push_str(&details(&entry.details, model));
                    }
                    SectionEntry::Typed(TypedEntry::Experience(entry)) => {
                        output.push_str(&format!("**{}**, {}", entry.company, entry.position));
                        output.push_str(&details(&entry.details, model));
                    }
                    SectionEntry::Typed(TypedEntry::Education(entry)) => {
                        let area = match &entry.degree {
                            Some(degree) => format!("{} in {}", degree, entry.area),
                            None => entry.area.clone(),
                        };
                        output.push_str(&format!("**{}**, {}", entry.institution, area));
                        output.push_str(&details(&entry.details, model));
                    }
                    SectionEntry::Typed(TypedEntry::Publication(entry)) => {
                        output.push_str(&format!("**{}**", entry.title));
                        if let Some(date) = &entry.date {
                            output.push_str(&format!(" ({})", format_date(date, locale)));
                        }
                        output.push_str(&format!("\n\n{}\n\n", entry.authors.join(", ")));
                        if let Some(doi) = &entry.doi {
                            output.push_str(&format!("[{}](https://doi.org/{})\n\n", doi, doi));
                        } else if let Some(url) = &entry.url {
                            output.push_str(&format!("[{}]({})\n\n", url, url));
                        }
                    }
                    SectionEntry::Typed(TypedEntry::Bullet(entry)) => {
                        output.push_str(&format!("- {}\n", bold(&entry.bullet, model)))
                    }
                    SectionEntry::Typed(TypedEntry::Numbered(entry)) => {
                        output.push_str(&format!("1. {}\n", bold(&entry.number, model)))
                    }
                    SectionEntry::Typed(TypedEntry::ReversedNumbered(entry)) => {
                        reversed.push(bold(&entry.reversed_number, model))
                    }
                }
            }
            let count = reversed.len();
            for (index, text) in reversed.into_iter().enumerate() {
                output.push_str(&format!("{}. {}\n", count - index, text));
            }
            if !output.ends_with("\n\n") {
                output.push('\n');
            }
        }

        output
    }
}

fn details(details: &EntryDetails, model: &DocumentModel) -> String {
    let mut output = String::new();
    let mut meta = Vec::new();
    if let Some(dates) = date_text(details, &model.locale) {
        meta.push(dates);
    }
    if let Some(location) = &details.location {
        meta.push(location.clone());
    }
    if !meta.is_empty() {
        output.push_str(&format!(" ({})", meta.join(", ")));
    }
    output.push_str("\n\n");
    if let Some(summary) = &details.summary {
        output.push_str(&format!("{}\n\n", bold(summary, model)));
    }
    for highlight in &details.highlights {
        output.push_str(&format!("- {}\n", bold(highlight, model)));
    }
    if !details.highlights.is_empty() {
        output.push('\n');
    }
    output
}

fn bold(text: &str, model: &DocumentModel) -> String {
    model
        .settings
        .bold_keywords
        .iter()
        .filter(|keyword| !keyword.is_empty())
        .fold(text.to_string(), |acc, keyword| {
            acc.replace(keyword.as_str(), &format!("**{}**", keyword))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvrender_schema::{Cv, Date, ExperienceEntry, NumberedEntry, ReversedNumberedEntry};
    use indexmap::IndexMap;
    use serde_json::{json, Map};

    fn model() -> DocumentModel {
        let mut sections = IndexMap::new();
        sections.insert(
            "Experience".to_string(),
            vec![SectionEntry::Typed(TypedEntry::Experience(ExperienceEntry {
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                details: EntryDetails {
                    start_date: Some(Date::parse_strict(&json!("2020-01"), false).unwrap()),
                    end_date: Some(Date::parse_strict(&json!("2022-06"), true).unwrap()),
                    location: Some("Berlin".to_string()),
                    highlights: vec!["Wrote Rust".to_string()],
                    ..EntryDetails::default()
                },
                extra: Map::new(),
            }))],
        );
        sections.insert(
            "Talks".to_string(),
            vec![
                SectionEntry::Typed(TypedEntry::ReversedNumbered(ReversedNumberedEntry {
                    reversed_number: "Newest".to_string(),
                    extra: Map::new(),
                })),
                SectionEntry::Typed(TypedEntry::ReversedNumbered(ReversedNumberedEntry {
                    reversed_number: "Oldest".to_string(),
                    extra: Map::new(),
                })),
            ],
        );
        sections.insert(
            "Steps".to_string(),
            vec![SectionEntry::Typed(TypedEntry::Numbered(NumberedEntry {
                number: "First".to_string(),
                extra: Map::new(),
            }))],
        );
        DocumentModel::new(Cv {
            name: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            sections,
            ..Cv::default()
        })
    }

    #[test]
    fn test_write_markdown() {
        let markdown = MarkdownWriter::write(&model());
        assert!(markdown.starts_with("# Jane Doe\n\n- [jane@example.com](mailto:jane@example.com)\n"));
        assert!(markdown.contains("## Experience"));
        assert!(markdown.contains("**Acme**, Engineer (Jan 2020 – June 2022, Berlin)"));
        assert!(markdown.contains("- Wrote Rust"));
        assert!(markdown.contains("2. Newest\n1. Oldest\n"));
        assert!(markdown.contains("1. First\n"));
    }

    #[test]
    fn test_bold_keywords() {
        let mut model = model();
        model.settings.bold_keywords = vec!["Rust".to_string()];
        assert!(MarkdownWriter::write(&model).contains("- Wrote **Rust**"));
    }
}
