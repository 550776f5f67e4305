//! Locale and design override coercion
//!
//! The payload's optional `locale` and `design` values replace the builder
//! defaults. Locales are dispatched on their `language` discriminator to
//! one variant of the registry, falling back to trying every variant.
//! Design mappings are validated against the design schema; any other
//! design value is passed through untouched.

use serde_json::Value;
use tracing::{debug, warn};

use cvrender_schema::diagnostics::path;
use cvrender_schema::{Design, DocumentModel, Locale, RawPayload, Registries, Resolvable, ValidationError};

/// Applies payload overrides using a set of registries
#[derive(Debug, Clone, Copy)]
pub struct OverrideEngine<'a> {
    registries: &'a Registries,
}

impl Default for OverrideEngine<'static> {
    fn default() -> Self {
        Self::new(Registries::standard())
    }
}

impl<'a> OverrideEngine<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    /// Resolve a locale value
    ///
    /// Resolved locales are returned unchanged. A mapping whose `language`
    /// names a registered variant is parsed as that variant; anything else
    /// goes through union resolution over all variants.
    pub fn coerce_locale(&self, locale: Resolvable<Locale>) -> Result<Locale, ValidationError> {
        let value = match locale {
            Resolvable::Resolved(locale) => return Ok(locale),
            Resolvable::Pending(value) => value,
        };
        let location = path(["locale"]);

        let discriminated = value
            .get("language")
            .and_then(Value::as_str)
            .and_then(|code| self.registries.locales.variant_for(code));

        match discriminated {
            Some(language) => {
                debug!(language = %language, "locale dispatched on discriminator");
                Locale::parse_variant(language, &value, &location).map_err(ValidationError::new)
            }
            None => {
                debug!("locale has no registered discriminator, trying every variant");
                self.registries.locales.resolve_union(&value, &location)
            }
        }
    }

    /// Resolve a design value
    ///
    /// Resolved designs are returned unchanged, mappings are validated, and
    /// any other pending value is passed through as is.
    pub fn coerce_design(&self, design: Resolvable<Design>) -> Result<Resolvable<Design>, ValidationError> {
        match design {
            Resolvable::Resolved(design) => Ok(Resolvable::Resolved(design)),
            Resolvable::Pending(value) if value.is_object() => {
                debug!("validating design mapping");
                self.registries
                    .design
                    .validate(&value, None)
                    .map(Resolvable::Resolved)
            }
            Resolvable::Pending(value) => {
                warn!(design = %value, "design is not a mapping, passing it through unvalidated");
                Ok(Resolvable::Pending(value))
            }
        }
    }

    /// Replace the model's locale and design with the payload's overrides
    ///
    /// Absent or `null` keys keep the current values. Both overrides are
    /// coerced before the model is touched; their errors are reported
    /// together.
    pub fn apply_overrides(&self, payload: &RawPayload, model: &mut DocumentModel) -> Result<(), ValidationError> {
        let locale = override_value(payload, "locale").map(|value| self.coerce_locale(Resolvable::Pending(value)));
        let design = override_value(payload, "design").map(|value| self.coerce_design(Resolvable::Pending(value)));

        let mut errors = Vec::new();
        let locale = match locale {
            Some(Err(err)) => {
                errors.extend(err.errors);
                None
            }
            Some(Ok(locale)) => Some(locale),
            None => None,
        };
        let design = match design {
            Some(Err(err)) => {
                errors.extend(err.errors);
                None
            }
            Some(Ok(design)) => Some(design),
            None => None,
        };
        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }

        if let Some(locale) = locale {
            debug!(language = %locale.language, "applied locale override");
            model.locale = locale;
        }
        if let Some(design) = design {
            debug!(resolved = design.is_resolved(), "applied design override");
            model.design = design;
        }
        Ok(())
    }
}

fn override_value(payload: &RawPayload, key: &str) -> Option<Value> {
    payload.get(key).filter(|value| !value.is_null()).cloned()
}
