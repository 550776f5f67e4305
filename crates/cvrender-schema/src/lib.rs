//! cvrender-schema - CV document model and validation
//!
//! Typed model of a CV payload, the validators that turn raw JSON into it,
//! and the registries of the closed locale and design families.
//!
//! Validation never stops at the first problem: every validator collects
//! [`FieldError`]s (location, message, offending input) and reports them
//! together as one [`ValidationError`].
//!
//! # Example
//!
//! ```
//! use cvrender_schema::{infer_entry_kind, EntryKind, Registries};
//! use serde_json::json;
//!
//! let kind = infer_entry_kind(&json!({"company": "Acme", "position": "Engineer"}));
//! assert_eq!(kind, Some(EntryKind::Experience));
//!
//! let registries = Registries::standard();
//! assert!(registries.locales.variant_for("de").is_some());
//! ```

pub mod cv;
pub mod date;
pub mod design;
pub mod diagnostics;
pub mod entry;
pub mod locale;
pub mod model;
pub mod reader;
pub mod registry;
pub mod section;
pub mod settings;

pub use cv::{Cv, SocialNetwork};
pub use date::{CalendarDate, Date};
pub use design::{
    Alignment, Color, ColorSettings, Design, DesignSchema, HeaderSettings, Length, PageSettings,
    PageSize, SectionTitleSettings, TextAlignment, TextSettings, Theme,
};
pub use diagnostics::{FieldError, PathSegment, ValidationError};
pub use entry::{
    infer_entry_kind, BulletEntry, EducationEntry, EntryDetails, EntryKind, ExperienceEntry,
    NormalEntry, NumberedEntry, OneLineEntry, PublicationEntry, ReversedNumberedEntry,
    SectionEntry, TypedEntry,
};
pub use locale::{Language, Locale};
pub use model::{DocumentModel, RawPayload, Resolvable};
pub use registry::{LocaleRegistry, Registries};
pub use section::{Section, SectionSchema};
pub use settings::{OutputPaths, RenderSettings};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "1.0.0");
    }
}
