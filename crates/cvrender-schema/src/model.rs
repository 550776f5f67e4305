//! Document model

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::cv::Cv;
use crate::design::Design;
use crate::locale::Locale;
use crate::settings::RenderSettings;

/// Raw request payload
pub type RawPayload = Map<String, Value>;

/// A value that is either still raw or already validated
#[derive(Debug, Clone, PartialEq)]
pub enum Resolvable<T> {
    /// Raw payload value awaiting coercion
    Pending(Value),
    /// Validated value
    Resolved(T),
}

impl<T> Resolvable<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolvable::Resolved(_))
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Resolvable::Resolved(value) => Some(value),
            Resolvable::Pending(_) => None,
        }
    }
}

impl<T> From<T> for Resolvable<T> {
    fn from(value: T) -> Self {
        Resolvable::Resolved(value)
    }
}

impl<T: Serialize> Serialize for Resolvable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resolvable::Pending(value) => value.serialize(serializer),
            Resolvable::Resolved(value) => value.serialize(serializer),
        }
    }
}

/// The canonical document model handed to the compile service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentModel {
    pub cv: Cv,
    pub locale: Locale,
    pub design: Resolvable<Design>,
    pub settings: RenderSettings,
}

impl DocumentModel {
    /// Model with the given content and default locale, design and settings
    pub fn new(cv: Cv) -> Self {
        Self {
            cv,
            locale: Locale::default(),
            design: Resolvable::Resolved(Design::default()),
            settings: RenderSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolvable_accessors() {
        let pending: Resolvable<Design> = Resolvable::Pending(json!("classic"));
        assert!(!pending.is_resolved());
        assert!(pending.resolved().is_none());

        let resolved: Resolvable<Design> = Design::default().into();
        assert_eq!(resolved.resolved(), Some(&Design::default()));
    }

    #[test]
    fn test_pending_serializes_raw_value() {
        let pending: Resolvable<Design> = Resolvable::Pending(json!({"theme": 3}));
        assert_eq!(serde_json::to_value(&pending).unwrap(), json!({"theme": 3}));
    }

    #[test]
    fn test_new_model_defaults() {
        let model = DocumentModel::new(Cv {
            name: "Jane".to_string(),
            ..Cv::default()
        });
        assert_eq!(model.locale, Locale::default());
        assert!(model.design.is_resolved());
        assert!(model.settings.bold_keywords.is_empty());
    }
}
