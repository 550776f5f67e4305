//! cvrender CLI - Command-line interface library
//!
//! This library provides the CLI functionality for cvrender:
//! - Render: Convert a CV payload to PDF (optionally Markdown and Typst)
//! - Check: Validate a CV payload and report field diagnostics
//!
//! # Library Usage
//!
//! ```ignore
//! use cvrender_cli::{check_command, read_payload, OutputFormat};
//!
//! let payload = read_payload(Path::new("cv.json"))?;
//! let status = check_command(Path::new("cv.json"), OutputFormat::Json)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Render a payload next to the input (cv.pdf)
//! cvrender render cv.json
//!
//! # Print the PDF as a base64 JSON envelope
//! cvrender render cv.json --format json
//!
//! # Validate only
//! cvrender check cv.toml --format json
//! ```

pub mod app;
pub mod config;
pub mod envelope;

// Re-export main entry point and types
pub use app::{check_command, init_logging, read_payload, render_command, run_cli, RenderArgs};
pub use config::{OutputFormat, Settings};
pub use envelope::{error_envelope, exit_status, pdf_envelope};
