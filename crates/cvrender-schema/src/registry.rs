//! Read-only registries of the closed variant families
//!
//! The standard table is built once per process and shared by reference.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::design::DesignSchema;
use crate::diagnostics::{child, FieldError, PathSegment, ValidationError};
use crate::locale::{Language, Locale};

/// Locale variants keyed by their `language` discriminator
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    variants: Vec<Language>,
    by_discriminator: HashMap<&'static str, Language>,
}

impl LocaleRegistry {
    /// Registry over `variants`, tried in the given order during union
    /// resolution; the first one is the default
    pub fn new(variants: impl IntoIterator<Item = Language>) -> Self {
        let variants: Vec<Language> = variants.into_iter().collect();
        let by_discriminator = variants.iter().map(|lang| (lang.code(), *lang)).collect();
        Self {
            variants,
            by_discriminator,
        }
    }

    /// Every built-in locale, English first
    pub fn standard() -> Self {
        Self::new(Language::ALL)
    }

    pub fn variants(&self) -> &[Language] {
        &self.variants
    }

    /// Variant registered for a discriminator value
    pub fn variant_for(&self, code: &str) -> Option<Language> {
        self.by_discriminator.get(code).copied()
    }

    /// Locale used when the payload gives none
    pub fn default_locale(&self) -> Locale {
        self.variants
            .first()
            .copied()
            .unwrap_or(Language::English)
            .defaults()
    }

    /// Try every variant in registry order; the first that parses wins
    ///
    /// On failure the errors of every variant are returned together, each
    /// located under `<location>.<VariantName>`.
    pub fn resolve_union(&self, value: &Value, location: &[PathSegment]) -> Result<Locale, ValidationError> {
        let mut errors: Vec<FieldError> = Vec::new();
        for language in &self.variants {
            let variant_location = child(location, language.variant_name());
            match Locale::parse_variant(*language, value, &variant_location) {
                Ok(locale) => return Ok(locale),
                Err(variant_errors) => errors.extend(variant_errors),
            }
        }
        if errors.is_empty() {
            errors.push(
                FieldError::new(location.to_vec(), "No locale variant is registered")
                    .with_input(value.clone()),
            );
        }
        Err(ValidationError::new(errors))
    }
}

/// Registries injected into the override engine
#[derive(Debug, Clone)]
pub struct Registries {
    pub locales: LocaleRegistry,
    pub design: DesignSchema,
}

impl Registries {
    pub fn new(locales: LocaleRegistry, design: DesignSchema) -> Self {
        Self { locales, design }
    }

    /// Process-wide standard registries
    pub fn standard() -> &'static Registries {
        static STANDARD: OnceLock<Registries> = OnceLock::new();
        STANDARD.get_or_init(|| Registries::new(LocaleRegistry::standard(), DesignSchema::default()))
    }
}
