//! Typst to PDF compiler
//!
//! Compiles Typst markup to PDF bytes using typst-as-lib.

use std::path::PathBuf;

use tracing::{debug, warn};
use typst_as_lib::TypstEngine;

use crate::error::{PdfError, Result};

/// Compiler for converting Typst markup to PDF
pub struct Compiler;

impl Compiler {
    /// Compile Typst markup to PDF bytes
    pub fn compile(markup: &str) -> Result<Vec<u8>> {
        Self::compile_with_fonts(markup, &[])
    }

    /// Compile with extra font files
    ///
    /// # Arguments
    /// * `markup` - Typst markup string
    /// * `font_paths` - Font files made available to the document
    pub fn compile_with_fonts(markup: &str, font_paths: &[PathBuf]) -> Result<Vec<u8>> {
        let mut builder = TypstEngine::builder().main_file(markup.to_string());

        for font_path in font_paths {
            let font_bytes = std::fs::read(font_path).map_err(|e| {
                PdfError::Font(format!("Failed to read font {}: {}", font_path.display(), e))
            })?;
            builder = builder.fonts([font_bytes]);
        }

        let engine = builder.build();

        // Warned<Result<Document, _>>: warnings are logged, the output decides
        let compiled = engine.compile();
        for warning in &compiled.warnings {
            warn!(message = %warning.message, "typst warning");
        }
        let document = compiled
            .output
            .map_err(|e| PdfError::Compilation(format!("{:?}", e)))?;

        let options = typst_pdf::PdfOptions::default();
        let pdf_bytes = typst_pdf::pdf(&document, &options)
            .map_err(|e| PdfError::Compilation(format!("PDF generation failed: {:?}", e)))?;

        debug!(bytes = pdf_bytes.len(), fonts = font_paths.len(), "compiled PDF");
        Ok(pdf_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple() {
        let markup = "= Jane Doe\n\nSoftware engineer.";
        let result = Compiler::compile(markup);
        assert!(result.is_ok(), "Compilation failed: {:?}", result.err());

        let pdf = result.unwrap();
        assert!(pdf.starts_with(b"%PDF"), "Output doesn't start with PDF header");
    }

    #[test]
    fn test_missing_font_file() {
        let result = Compiler::compile_with_fonts("Hello", &[PathBuf::from("/nonexistent/font.ttf")]);
        assert!(matches!(result, Err(PdfError::Font(_))));
    }

    #[test]
    fn test_invalid_markup_is_compilation_error() {
        let result = Compiler::compile("#let x = (");
        assert!(matches!(result, Err(PdfError::Compilation(_))));
    }
}
