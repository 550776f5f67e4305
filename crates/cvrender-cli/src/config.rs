//! Configuration file
//!
//! Settings are loaded from `cvrender.toml`:
//!
//! ```toml
//! [render]
//! fonts = ["fonts/SourceSans3.ttf"]
//!
//! [output]
//! format = "json"
//!
//! [logging]
//! filter = "cvrender_core=debug"
//! ```
//!
//! Every field is optional. Relative font paths are resolved against the
//! directory of the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "cvrender.toml";

/// Output format for results and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON envelopes for tool consumption
    Json,
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Typst rendering settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Extra font files handed to Typst
    pub fonts: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings
    ///
    /// An explicit path must exist. Without one, `cvrender.toml` in the
    /// working directory is used when present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if !local.is_file() {
                    return Ok(Settings::default());
                }
                local
            }
        };
        Self::load_file(&path)
    }

    /// Load settings from one file
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut settings = Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            settings.render.fonts = settings
                .render
                .fonts
                .into_iter()
                .map(|font| if font.is_relative() { base.join(font) } else { font })
                .collect();
        }
        Ok(settings)
    }
}
