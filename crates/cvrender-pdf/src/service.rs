//! Typst-backed compile and render services

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use cvrender_core::{CompileService, IntermediateSource, RenderError, RenderService};
use cvrender_schema::DocumentModel;

use crate::compiler::Compiler;
use crate::error::PdfError;
use crate::markdown::MarkdownWriter;
use crate::transpiler::Transpiler;

/// Transpiles the model to Typst and writes the requested source files
#[derive(Debug, Clone, Default)]
pub struct TypstCompileService;

impl CompileService for TypstCompileService {
    fn compile(&self, model: &DocumentModel) -> Result<IntermediateSource, RenderError> {
        let markup = Transpiler::transpile(model)?;
        let mut source = IntermediateSource::new(markup);

        if let Some(path) = &model.settings.outputs.typst {
            write_file(path, source.markup.as_bytes())?;
            debug!(path = %path.display(), "wrote typst source");
            source = source.with_path(path);
        }
        if let Some(path) = &model.settings.outputs.markdown {
            write_file(path, MarkdownWriter::write(model).as_bytes())?;
            debug!(path = %path.display(), "wrote markdown");
        }
        Ok(source)
    }
}

/// Compiles Typst source to a PDF file
#[derive(Debug, Clone, Default)]
pub struct TypstRenderService {
    fonts: Vec<PathBuf>,
}

impl TypstRenderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make extra font files available to the document
    pub fn with_fonts(mut self, fonts: impl IntoIterator<Item = PathBuf>) -> Self {
        self.fonts.extend(fonts);
        self
    }
}

impl RenderService for TypstRenderService {
    fn render(&self, model: &DocumentModel, source: &IntermediateSource) -> Result<Option<PathBuf>, RenderError> {
        let Some(pdf_path) = &model.settings.outputs.pdf else {
            return Ok(None);
        };
        let bytes = Compiler::compile_with_fonts(&source.markup, &self.fonts)?;
        write_file(pdf_path, &bytes)?;
        info!(path = %pdf_path.display(), bytes = bytes.len(), "wrote PDF");
        Ok(Some(pdf_path.clone()))
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), PdfError> {
    fs::write(path, contents).map_err(PdfError::Io)
}
