//! Render orchestration
//!
//! ```text
//! payload -> canonical form -> model -> normalized sections -> overrides
//!         -> compile -> render -> PDF bytes
//! ```
//!
//! Every step runs inside a [`Workspace`] that is removed when the render
//! returns, whatever the outcome.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use cvrender_schema::{DocumentModel, RawPayload, Registries};

use crate::builder::{BuildOptions, ModelBuilder};
use crate::coercion::OverrideEngine;
use crate::error::{RenderError, Result};
use crate::normalizer::write_canonical;
use crate::sections::normalize_sections;
use crate::services::{CompileService, RenderService};
use crate::workspace::Workspace;

/// Message reported when the render service produced no PDF
pub const PDF_GENERATION_FAILED: &str = "PDF generation failed.";

/// Turns payloads into PDFs through a compile and a render service
#[derive(Debug, Clone)]
pub struct RenderPipeline<C, R> {
    compiler: C,
    renderer: R,
    registries: &'static Registries,
}

impl<C: CompileService, R: RenderService> RenderPipeline<C, R> {
    /// Pipeline using the standard registries
    pub fn new(compiler: C, renderer: R) -> Self {
        Self {
            compiler,
            renderer,
            registries: Registries::standard(),
        }
    }

    /// Use a different set of registries
    pub fn with_registries(mut self, registries: &'static Registries) -> Self {
        self.registries = registries;
        self
    }

    /// Build, normalize and override the model for `payload`
    ///
    /// The canonical payload is written into `workspace`; output paths come
    /// from `options`.
    pub fn prepare(&self, payload: &RawPayload, workspace: &Workspace, options: &BuildOptions) -> Result<DocumentModel> {
        let input = workspace.input_path();
        write_canonical(payload, &input)?;

        let (payload, mut model) = ModelBuilder::new(self.registries).build(&input, options)?;
        normalize_sections(&mut model.cv)?;
        OverrideEngine::new(self.registries).apply_overrides(&payload, &mut model)?;
        debug!(
            language = %model.locale.language,
            design_resolved = model.design.is_resolved(),
            "prepared document model"
        );
        Ok(model)
    }

    /// Render `payload` to PDF bytes
    pub fn render_pdf(&self, payload: &RawPayload) -> Result<Vec<u8>> {
        self.render_pdf_with(payload, BuildOptions::default())
    }

    /// Render `payload` to PDF bytes, writing side outputs where `options`
    /// asks for them
    ///
    /// Typst source and PDF default to files inside the workspace.
    pub fn render_pdf_with(&self, payload: &RawPayload, options: BuildOptions) -> Result<Vec<u8>> {
        let workspace = Workspace::new()?;
        let defaults = BuildOptions::pdf_only(workspace.path());
        let options = BuildOptions {
            typst_path: options.typst_path.or(defaults.typst_path),
            pdf_path: options.pdf_path.or(defaults.pdf_path),
            ..options
        };

        let model = self.prepare(payload, &workspace, &options)?;

        let source = self.compiler.compile(&model)?;
        debug!(bytes = source.markup.len(), "compiled intermediate source");

        let pdf_path = self.renderer.render(&model, &source)?;
        let bytes = match pdf_path {
            Some(path) if path.is_file() => read_pdf(&path)?,
            Some(path) => {
                warn!(path = %path.display(), "render service reported a PDF that does not exist");
                return Err(RenderError::internal(PDF_GENERATION_FAILED));
            }
            None => {
                warn!("render service produced no PDF");
                return Err(RenderError::internal(PDF_GENERATION_FAILED));
            }
        };

        info!(bytes = bytes.len(), name = %model.cv.name, "rendered PDF");
        Ok(bytes)
    }
}

fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| RenderError::internal(format!("Failed to read {}: {}", path.display(), e)))
}
