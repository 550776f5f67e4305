//! Compile and render service interfaces

use std::path::PathBuf;

use cvrender_schema::DocumentModel;

use crate::error::Result;

/// Typeset source produced by a [`CompileService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateSource {
    /// Markup text
    pub markup: String,
    /// File the markup was written to, if any
    pub path: Option<PathBuf>,
}

impl IntermediateSource {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Turns a document model into typeset source
pub trait CompileService {
    fn compile(&self, model: &DocumentModel) -> Result<IntermediateSource>;
}

/// Turns typeset source into a PDF on disk
///
/// `Ok(None)` means no PDF was produced.
pub trait RenderService {
    fn render(&self, model: &DocumentModel, source: &IntermediateSource) -> Result<Option<PathBuf>>;
}

impl<T: CompileService + ?Sized> CompileService for &T {
    fn compile(&self, model: &DocumentModel) -> Result<IntermediateSource> {
        (**self).compile(model)
    }
}

impl<T: RenderService + ?Sized> RenderService for &T {
    fn render(&self, model: &DocumentModel, source: &IntermediateSource) -> Result<Option<PathBuf>> {
        (**self).render(model, source)
    }
}
