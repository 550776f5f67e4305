//! cvrender-pdf - PDF generation via Typst
//!
//! Implements the compile and render services of the cvrender pipeline
//! using Typst as the typesetting backend.
//!
//! # Architecture
//!
//! 1. **Transpiler** - Converts a `DocumentModel` to Typst markup
//! 2. **Compiler** - Compiles Typst markup to PDF bytes
//! 3. **MarkdownWriter** - Optional Markdown side output
//!
//! [`TypstCompileService`] and [`TypstRenderService`] wrap these behind the
//! service traits of `cvrender-core`.
//!
//! # Example
//!
//! ```ignore
//! use cvrender_core::RenderPipeline;
//! use cvrender_pdf::{TypstCompileService, TypstRenderService};
//!
//! let pipeline = RenderPipeline::new(TypstCompileService, TypstRenderService::new());
//! let pdf_bytes = pipeline.render_pdf(&payload)?;
//! ```

mod compiler;
pub mod dates;
mod error;
mod markdown;
mod service;
mod transpiler;

pub use compiler::Compiler;
pub use error::{PdfError, Result};
pub use markdown::MarkdownWriter;
pub use service::{TypstCompileService, TypstRenderService};
pub use transpiler::{escape_markup, Transpiler};

use cvrender_core::RenderPipeline;

/// Pipeline wired to the Typst services
pub type TypstPipeline = RenderPipeline<TypstCompileService, TypstRenderService>;

/// Build a Typst pipeline with extra font files
pub fn typst_pipeline(fonts: impl IntoIterator<Item = std::path::PathBuf>) -> TypstPipeline {
    RenderPipeline::new(TypstCompileService, TypstRenderService::new().with_fonts(fonts))
}
