//! CV content: header metadata and sections

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::{child, FieldError, PathSegment};
use crate::entry::SectionEntry;
use crate::reader::FieldReader;

/// Known social networks and the profile URL prefix of each
const SOCIAL_NETWORKS: &[(&str, &str)] = &[
    ("LinkedIn", "https://linkedin.com/in/"),
    ("GitHub", "https://github.com/"),
    ("GitLab", "https://gitlab.com/"),
    ("StackOverflow", "https://stackoverflow.com/users/"),
    ("ORCID", "https://orcid.org/"),
    ("ResearchGate", "https://researchgate.net/profile/"),
    ("YouTube", "https://youtube.com/@"),
    ("Google Scholar", "https://scholar.google.com/citations?user="),
    ("X", "https://x.com/"),
];

/// A social network profile shown in the header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialNetwork {
    pub network: String,
    pub username: String,
}

impl SocialNetwork {
    /// Profile URL of the account
    pub fn url(&self) -> Option<String> {
        SOCIAL_NETWORKS
            .iter()
            .find(|(name, _)| *name == self.network)
            .map(|(_, prefix)| format!("{}{}", prefix, self.username))
    }

    fn parse(value: &Value, location: &[PathSegment]) -> Result<SocialNetwork, Vec<FieldError>> {
        let mut reader = FieldReader::new(value, location).map_err(|e| vec![e])?;
        let network = reader.required_string("network");
        let username = reader.required_string("username");

        if let Some(name) = &network {
            if !SOCIAL_NETWORKS.iter().any(|(known, _)| known == name) {
                let expected = SOCIAL_NETWORKS
                    .iter()
                    .map(|(known, _)| format!("'{}'", known))
                    .collect::<Vec<_>>()
                    .join(", ");
                reader.invalid(
                    "network",
                    format!("Input should be {}", expected),
                    &Value::String(name.clone()),
                );
            }
        }

        reader.finish_strict()?;
        Ok(SocialNetwork {
            network: network.unwrap_or_default(),
            username: username.unwrap_or_default(),
        })
    }
}

/// The `cv` part of a payload
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Cv {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub social_networks: Vec<SocialNetwork>,
    /// Section title to entries, in rendering order
    #[serde(serialize_with = "serialize_sections")]
    pub sections: IndexMap<String, Vec<SectionEntry>>,
}

impl Cv {
    /// Validate the `cv` mapping
    ///
    /// Section entries are accepted without committing to a kind: strings
    /// become text entries, mappings stay loose until sections are
    /// normalized.
    pub fn parse(value: &Value, location: &[PathSegment]) -> Result<Cv, Vec<FieldError>> {
        let mut reader = FieldReader::new(value, location).map_err(|e| vec![e])?;

        let name = reader.required_string("name");
        let location_text = reader.optional_string("location");
        let email = reader.optional_string("email");
        let phone = reader.optional_string("phone");
        let website = reader.optional_string("website");

        if let Some(address) = &email {
            if !email_re().is_match(address) {
                reader.invalid(
                    "email",
                    "value is not a valid email address",
                    &Value::String(address.clone()),
                );
            }
        }
        if let Some(url) = &website {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                reader.invalid(
                    "website",
                    "URL should start with http:// or https://",
                    &Value::String(url.clone()),
                );
            }
        }

        let mut social_networks = Vec::new();
        match reader.raw("social_networks") {
            None => {}
            Some(Value::Array(items)) => {
                let list_location = reader.location_of("social_networks");
                for (index, item) in items.iter().enumerate() {
                    match SocialNetwork::parse(item, &child(&list_location, index)) {
                        Ok(network) => social_networks.push(network),
                        Err(errors) => reader.extend_errors(errors),
                    }
                }
            }
            Some(other) => reader.invalid("social_networks", "Input should be a valid list", other),
        }

        let mut sections = IndexMap::new();
        if let Some(map) = reader.optional_map("sections") {
            let sections_location = reader.location_of("sections");
            for (title, raw_entries) in map {
                let section_location = child(&sections_location, title.as_str());
                let Value::Array(items) = raw_entries else {
                    reader.push_error(
                        FieldError::new(section_location, "Input should be a valid list")
                            .with_input(raw_entries.clone()),
                    );
                    continue;
                };
                let mut entries = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match SectionEntry::loose(item, &child(&section_location, index)) {
                        Ok(entry) => entries.push(entry),
                        Err(error) => reader.push_error(error),
                    }
                }
                sections.insert(title.clone(), entries);
            }
        }

        reader.finish_strict()?;
        Ok(Cv {
            name: name.unwrap_or_default(),
            location: location_text,
            email,
            phone,
            website,
            social_networks,
            sections,
        })
    }

    /// Check that every section holds entries of a single known kind
    pub fn is_homogeneous(&self) -> bool {
        self.sections.values().all(|entries| {
            let mut kinds = entries.iter().map(SectionEntry::kind);
            match kinds.next() {
                None => true,
                Some(None) => false,
                Some(first) => kinds.all(|kind| kind == first),
            }
        })
    }
}

fn email_re() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

fn serialize_sections<S: serde::Serializer>(
    sections: &IndexMap<String, Vec<SectionEntry>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(sections.len()))?;
    for (title, entries) in sections {
        let values: Vec<Value> = entries.iter().map(SectionEntry::to_value).collect();
        map.serialize_entry(title, &values)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::path;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_section_order() {
        let value = json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "sections": {
                "Summary": ["Engineer."],
                "Experience": [{"company": "Acme", "position": "Dev"}],
                "Awards": []
            }
        });
        let cv = Cv::parse(&value, &path(["cv"])).unwrap();
        let titles: Vec<&str> = cv.sections.keys().map(String::as_str).collect();
        assert_eq!(titles, vec!["Summary", "Experience", "Awards"]);
        assert_eq!(cv.sections["Summary"][0], SectionEntry::Text("Engineer.".to_string()));
        assert!(!cv.sections["Experience"][0].is_resolved());
        assert!(!cv.is_homogeneous());
    }

    #[test]
    fn test_parse_collects_header_errors() {
        let value = json!({
            "email": "not-an-email",
            "website": "example.com",
            "social_networks": [{"network": "MySpace", "username": "jd"}],
            "hobbies": ["chess"]
        });
        let errors = Cv::parse(&value, &path(["cv"])).unwrap_err();
        let locations: Vec<String> = errors.iter().map(FieldError::location_string).collect();
        assert_eq!(
            locations,
            vec![
                "cv.name",
                "cv.email",
                "cv.website",
                "cv.social_networks.0.network",
                "cv.hobbies"
            ]
        );
    }

    #[test]
    fn test_scalar_entries_rejected_with_index() {
        let value = json!({"name": "J", "sections": {"Skills": ["Rust", 7]}});
        let errors = Cv::parse(&value, &path(["cv"])).unwrap_err();
        assert_eq!(errors[0].location_string(), "cv.sections.Skills.1");
    }

    #[test]
    fn test_social_network_url() {
        let network = SocialNetwork {
            network: "GitHub".to_string(),
            username: "janedoe".to_string(),
        };
        assert_eq!(network.url().as_deref(), Some("https://github.com/janedoe"));
    }

    #[test]
    fn test_serializes_entries_as_values() {
        let value = json!({"name": "J", "sections": {"Notes": ["one"]}});
        let cv = Cv::parse(&value, &[]).unwrap();
        assert_eq!(
            serde_json::to_value(&cv).unwrap(),
            json!({"name": "J", "sections": {"Notes": ["one"]}})
        );
    }
}
