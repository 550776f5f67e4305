//! Section entry normalization
//!
//! The generic payload parser keeps mapping entries loose. Here each
//! section with loose entries is re-validated against the entry kind of its
//! first entry, which makes every section homogeneous.

use tracing::{debug, trace};

use cvrender_schema::diagnostics::{child, path, FieldError, PathSegment};
use cvrender_schema::{infer_entry_kind, Cv, EntryKind, SectionEntry, SectionSchema, ValidationError};

/// Title given to the synthetic section descriptor
pub const NORMALIZED_SECTION_TITLE: &str = "Normalized Section";

/// Re-validate every section that still holds loose entries
///
/// Sections that are empty or already fully resolved are left alone, so
/// running this twice changes nothing. Errors of all sections are reported
/// together, located at `cv.sections.<title>.<index>.<field>`.
pub fn normalize_sections(cv: &mut Cv) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    for (title, entries) in cv.sections.iter_mut() {
        if entries.iter().all(SectionEntry::is_resolved) {
            trace!(section = %title, "section already resolved");
            continue;
        }

        let section_location = path(["cv", "sections", title.as_str()]);
        match normalize_entries(entries, &section_location) {
            Ok((kind, normalized)) => {
                debug!(section = %title, kind = %kind, entries = normalized.len(), "normalized section");
                *entries = normalized;
            }
            Err(section_errors) => errors.extend(section_errors),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(errors))
    }
}

fn normalize_entries(
    entries: &[SectionEntry],
    section_location: &[PathSegment],
) -> Result<(EntryKind, Vec<SectionEntry>), Vec<FieldError>> {
    let values: Vec<_> = entries.iter().map(SectionEntry::to_value).collect();

    let Some(first) = values.first() else {
        return Ok((EntryKind::Text, Vec::new()));
    };
    let Some(kind) = infer_entry_kind(first) else {
        let expected = EntryKind::ALL
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(vec![FieldError::new(
            child(section_location, 0usize),
            format!(
                "The entry type could not be determined. The entry should match one of {}",
                expected
            ),
        )
        .with_input(first.clone())]);
    };

    let schema = SectionSchema::for_kind(kind);
    let descriptor = schema.descriptor(NORMALIZED_SECTION_TITLE, values);
    match schema.validate(&descriptor) {
        Ok(section) => Ok((kind, section.entries)),
        Err(validation) => Err(validation
            .errors
            .into_iter()
            .map(|error| remap(error, section_location))
            .collect()),
    }
}

/// Move an error from `entries.<index>...` of the synthetic descriptor to
/// the same entry of the real section
fn remap(mut error: FieldError, section_location: &[PathSegment]) -> FieldError {
    if matches!(error.location.first(), Some(PathSegment::Key(key)) if key == "entries") {
        error.location.remove(0);
    }
    error.nested_under(section_location)
}
