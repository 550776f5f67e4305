//! Document model builder
//!
//! Parses the canonical form of a payload into a [`DocumentModel`] with
//! default locale and design. The payload's own `locale` and `design`
//! values are left for the override engine.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use cvrender_schema::diagnostics::{path, FieldError};
use cvrender_schema::{
    Cv, DocumentModel, OutputPaths, RawPayload, Registries, RenderSettings, Resolvable,
    ValidationError,
};

use crate::error::{RenderError, Result};
use crate::normalizer::from_canonical;

/// Top-level payload keys
const TOP_LEVEL_KEYS: &[&str] = &["cv", "locale", "design", "settings"];

/// Output selection for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Where the intermediate Typst source goes
    pub typst_path: Option<PathBuf>,
    /// Where the PDF goes
    pub pdf_path: Option<PathBuf>,
    /// Where the Markdown side output goes
    pub markdown_path: Option<PathBuf>,
    pub skip_png: bool,
    pub skip_html: bool,
    pub skip_markdown: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            typst_path: None,
            pdf_path: None,
            markdown_path: None,
            skip_png: true,
            skip_html: true,
            skip_markdown: true,
        }
    }
}

impl BuildOptions {
    /// PDF-only build writing into `dir`
    pub fn pdf_only(dir: &Path) -> Self {
        Self {
            typst_path: Some(dir.join("cv.typ")),
            pdf_path: Some(dir.join("cv.pdf")),
            ..Self::default()
        }
    }

    /// Check that every requested output can be produced
    pub fn check(&self) -> Result<()> {
        if !self.skip_png {
            return Err(RenderError::user("PNG output is not supported; set skip_png."));
        }
        if !self.skip_html {
            return Err(RenderError::user("HTML output is not supported; set skip_html."));
        }
        if !self.skip_markdown && self.markdown_path.is_none() {
            return Err(RenderError::user("Markdown output was requested without a markdown path."));
        }
        Ok(())
    }

    fn outputs(&self) -> OutputPaths {
        OutputPaths {
            typst: self.typst_path.clone(),
            pdf: self.pdf_path.clone(),
            markdown: if self.skip_markdown {
                None
            } else {
                self.markdown_path.clone()
            },
        }
    }
}

/// Builds document models against a set of registries
#[derive(Debug, Clone, Copy)]
pub struct ModelBuilder<'a> {
    registries: &'a Registries,
}

impl Default for ModelBuilder<'static> {
    fn default() -> Self {
        Self::new(Registries::standard())
    }
}

impl<'a> ModelBuilder<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    /// Read the canonical form at `input_path` and build the model
    pub fn build(&self, input_path: &Path, options: &BuildOptions) -> Result<(RawPayload, DocumentModel)> {
        options.check()?;
        let text = fs::read_to_string(input_path).map_err(|e| {
            RenderError::user(format!(
                "The input file {} could not be read: {}",
                input_path.display(),
                e
            ))
        })?;
        debug!(path = %input_path.display(), "read canonical payload");
        self.build_from_str(&text, options)
    }

    /// Build the model from canonical text
    pub fn build_from_str(&self, text: &str, options: &BuildOptions) -> Result<(RawPayload, DocumentModel)> {
        options.check()?;
        let payload = from_canonical(text)?;
        let model = self.build_model(&payload, options)?;
        info!(
            name = %model.cv.name,
            sections = model.cv.sections.len(),
            "built document model"
        );
        Ok((payload, model))
    }

    /// Validate a payload and assemble the model with default locale and
    /// design
    pub fn build_model(&self, payload: &RawPayload, options: &BuildOptions) -> Result<DocumentModel> {
        let mut errors: Vec<FieldError> = Vec::new();

        for (key, value) in payload {
            if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
                errors.push(
                    FieldError::new(path([key.as_str()]), "Extra inputs are not permitted")
                        .with_input(value.clone()),
                );
            }
        }

        let cv = match payload.get("cv") {
            None | Some(Value::Null) => {
                errors.push(
                    FieldError::new(path(["cv"]), "Field required")
                        .with_input(Value::Object(payload.clone())),
                );
                None
            }
            Some(value) => match Cv::parse(value, &path(["cv"])) {
                Ok(cv) => Some(cv),
                Err(cv_errors) => {
                    errors.extend(cv_errors);
                    None
                }
            },
        };

        let settings = match payload.get("settings") {
            None | Some(Value::Null) => RenderSettings::default(),
            Some(value) => match RenderSettings::parse(value, &path(["settings"])) {
                Ok(settings) => settings,
                Err(settings_errors) => {
                    errors.extend(settings_errors);
                    RenderSettings::default()
                }
            },
        };

        match cv {
            Some(cv) if errors.is_empty() => Ok(DocumentModel {
                cv,
                locale: self.registries.locales.default_locale(),
                design: Resolvable::Resolved(self.registries.design.default_design()),
                settings: RenderSettings {
                    outputs: options.outputs(),
                    ..settings
                },
            }),
            _ => Err(ValidationError::new(errors).into()),
        }
    }
}
