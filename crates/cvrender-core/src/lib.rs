//! cvrender-core - payload to PDF pipeline
//!
//! Turns an arbitrary JSON payload describing a CV into a PDF:
//!
//! 1. **Normalizer** - canonical JSON form of the payload
//! 2. **Builder** - typed [`DocumentModel`](cvrender_schema::DocumentModel)
//!    with default locale and design
//! 3. **Sections** - loose section entries re-validated as one kind
//! 4. **Coercion** - `locale` / `design` overrides resolved against the
//!    registries
//! 5. **Pipeline** - runs the above in a temporary workspace and calls the
//!    compile and render services
//!
//! # Example
//!
//! ```
//! use cvrender_core::{normalize_sections, BuildOptions, ModelBuilder, OverrideEngine};
//! use serde_json::json;
//!
//! let text = json!({
//!     "cv": {
//!         "name": "Jane Doe",
//!         "sections": {"Skills": [{"label": "Languages", "details": "Rust"}]}
//!     },
//!     "locale": {"language": "de"}
//! })
//! .to_string();
//!
//! let (payload, mut model) = ModelBuilder::default()
//!     .build_from_str(&text, &BuildOptions::default())
//!     .unwrap();
//! normalize_sections(&mut model.cv).unwrap();
//! OverrideEngine::default().apply_overrides(&payload, &mut model).unwrap();
//! assert_eq!(model.locale.language.code(), "de");
//! ```

pub mod builder;
pub mod coercion;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod sections;
pub mod services;
pub mod workspace;

pub use builder::{BuildOptions, ModelBuilder};
pub use coercion::OverrideEngine;
pub use error::{ErrorKind, RenderError, Result};
pub use normalizer::{from_canonical, to_canonical, write_canonical};
pub use pipeline::{RenderPipeline, PDF_GENERATION_FAILED};
pub use sections::{normalize_sections, NORMALIZED_SECTION_TITLE};
pub use services::{CompileService, IntermediateSource, RenderService};
pub use workspace::Workspace;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
