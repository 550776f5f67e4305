//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cvrender_core::{BuildOptions, RenderError, Workspace};
use cvrender_pdf::{typst_pipeline, Transpiler};
use cvrender_schema::{DocumentModel, RawPayload};

use crate::config::{OutputFormat, Settings};
use crate::envelope::{error_envelope, exit_status, pdf_envelope, EXIT_OK};

#[derive(Parser)]
#[command(name = "cvrender")]
#[command(author, version, about = "Render CV payloads to PDF", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./cvrender.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a CV payload to PDF
    Render {
        /// Input payload (JSON, or TOML by extension); `-` reads JSON from stdin
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (text writes the PDF, json prints it base64-encoded)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Also write the document as Markdown
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Also write the intermediate Typst source
        #[arg(long)]
        typst: Option<PathBuf>,
    },

    /// Validate a CV payload without rendering it
    Check {
        /// Input payload (JSON, or TOML by extension); `-` reads JSON from stdin
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

/// Options of the render command
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub markdown: Option<PathBuf>,
    pub typst: Option<PathBuf>,
}

/// Run the CLI application
///
/// Parses arguments, loads the configuration, installs logging and
/// dispatches to the command.
pub fn run_cli() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings.logging.filter);

    let status = match cli.command {
        Commands::Render {
            input,
            output,
            format,
            markdown,
            typst,
        } => {
            let args = RenderArgs {
                output,
                format: format.unwrap_or(settings.output.format),
                markdown,
                typst,
            };
            render_command(&input, &args, &settings)?
        }
        Commands::Check { input, format } => {
            check_command(&input, format.unwrap_or(settings.output.format))?
        }
    };

    Ok(ExitCode::from(status))
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins over the configured filter.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Read a payload file
///
/// `-` reads JSON from stdin; `.toml` files are parsed as TOML; anything
/// else as JSON. The top level must be a mapping.
pub fn read_payload(input: &Path) -> Result<RawPayload> {
    let (text, is_toml) = if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read payload from stdin")?;
        (text, false)
    } else {
        let text = fs::read_to_string(input)
            .with_context(|| format!("Failed to read input file: {}", input.display()))?;
        let is_toml = input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        (text, is_toml)
    };

    let value = if is_toml {
        let table: toml::Table = toml::from_str(&text)
            .with_context(|| format!("Failed to parse TOML payload: {}", input.display()))?;
        toml_to_json(toml::Value::Table(table))
            .with_context(|| format!("Failed to convert TOML payload: {}", input.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON payload: {}", input.display()))?
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Payload must be a mapping at the top level: {}", input.display()),
    }
}

/// Convert TOML to JSON; datetimes become their RFC 3339 text
///
/// JSON has no NaN or infinity, so such floats are rejected.
fn toml_to_json(value: toml::Value) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .with_context(|| format!("Float {} has no JSON representation", f))?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<Result<_>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| -> Result<(String, Value)> {
                    let value = toml_to_json(value).with_context(|| format!("in key `{}`", key))?;
                    Ok((key, value))
                })
                .collect::<Result<_>>()?,
        ),
    })
}

/// Read a payload, turning read and parse failures into user errors
fn load_payload(input: &Path) -> std::result::Result<RawPayload, RenderError> {
    read_payload(input).map_err(|err| RenderError::user(format!("{:#}", err)))
}

/// Execute the render command, returning the process exit status
pub fn render_command(input: &Path, args: &RenderArgs, settings: &Settings) -> Result<u8> {
    let payload = match load_payload(input) {
        Ok(payload) => payload,
        Err(err) => return Ok(report_error(&err, args.format)),
    };
    let pipeline = typst_pipeline(settings.render.fonts.clone());

    let options = BuildOptions {
        typst_path: args.typst.clone(),
        markdown_path: args.markdown.clone(),
        skip_markdown: args.markdown.is_none(),
        ..BuildOptions::default()
    };

    let pdf = match pipeline.render_pdf_with(&payload, options) {
        Ok(pdf) => pdf,
        Err(err) => return Ok(report_error(&err, args.format)),
    };

    let output = args.output.clone().or_else(|| match args.format {
        OutputFormat::Text => Some(default_output(input)),
        OutputFormat::Json => None,
    });
    if let Some(output) = &output {
        fs::write(output, &pdf)
            .with_context(|| format!("Failed to write PDF: {}", output.display()))?;
        info!(path = %output.display(), "wrote PDF");
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string(&pdf_envelope(&pdf))
                .context("Failed to serialize PDF envelope")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if let Some(output) = &output {
                println!("✓ Rendered {} ({} bytes)", output.display(), pdf.len());
            }
        }
    }
    Ok(EXIT_OK)
}

/// Execute the check command, returning the process exit status
///
/// Besides validation, the model is transpiled without compiling, so a
/// payload that passes here only fails `render` inside Typst itself.
pub fn check_command(input: &Path, format: OutputFormat) -> Result<u8> {
    let payload = match load_payload(input) {
        Ok(payload) => payload,
        Err(err) => return Ok(report_error(&err, format)),
    };
    let pipeline = typst_pipeline(Vec::new());
    let workspace = Workspace::new().context("Failed to create workspace")?;

    let model = match pipeline
        .prepare(&payload, &workspace, &BuildOptions::default())
        .and_then(|model| {
            Transpiler::transpile(&model).map_err(RenderError::from)?;
            Ok(model)
        }) {
        Ok(model) => model,
        Err(err) => return Ok(report_error(&err, format)),
    };
    debug!(name = %model.cv.name, "payload is valid");

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary(&model))
                .context("Failed to serialize check result")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("✓ No issues found in {}", input.display());
            for (title, entries) in &model.cv.sections {
                let kind = entries
                    .first()
                    .and_then(|entry| entry.kind())
                    .map(|kind| kind.name())
                    .unwrap_or("empty");
                println!("  {} ({} x {})", title, entries.len(), kind);
            }
        }
    }
    Ok(EXIT_OK)
}

/// Result summary printed by `check --format json`
fn summary(model: &DocumentModel) -> Value {
    let sections: Vec<Value> = model
        .cv
        .sections
        .iter()
        .map(|(title, entries)| {
            serde_json::json!({
                "title": title,
                "entry_type": entries.first().and_then(|e| e.kind()).map(|k| k.name()),
                "entries": entries.len(),
            })
        })
        .collect();
    serde_json::json!({
        "type": "ok",
        "name": model.cv.name,
        "locale": model.locale.language,
        "design": model.design,
        "sections": sections,
    })
}

/// Print an error in the requested format and return the exit status
fn report_error(err: &RenderError, format: OutputFormat) -> u8 {
    match format {
        OutputFormat::Json => println!("{}", error_envelope(err)),
        OutputFormat::Text => match err {
            RenderError::Validation(validation) => {
                for field_error in validation.iter() {
                    eprintln!("error: {}", field_error);
                }
                eprintln!("Found {} error(s)", validation.len());
            }
            other => eprintln!("error: {}", other),
        },
    }
    exit_status(err)
}

/// `<input stem>.pdf` next to the input, `cv.pdf` for stdin
fn default_output(input: &Path) -> PathBuf {
    if input == Path::new("-") {
        return PathBuf::from("cv.pdf");
    }
    input.with_extension("pdf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toml_to_json() {
        let table: toml::Table = toml::from_str(
            "[cv]\nname = \"Jane\"\nyears = 3\nratio = 0.5\n\n[settings]\ncurrent_date = 2024-05-01\n",
        )
        .unwrap();
        assert_eq!(
            toml_to_json(toml::Value::Table(table)).unwrap(),
            json!({
                "cv": {"name": "Jane", "years": 3, "ratio": 0.5},
                "settings": {"current_date": "2024-05-01"}
            })
        );
    }

    #[test]
    fn test_toml_nan_rejected() {
        let table: toml::Table = toml::from_str("[cv]\nscore = nan\n").unwrap();
        let err = toml_to_json(toml::Value::Table(table)).unwrap_err();
        assert!(format!("{:#}", err).contains("no JSON representation"));
    }

    #[test]
    fn test_unreadable_payload_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_payload(&path).unwrap_err();
        assert_eq!(err.kind(), cvrender_core::ErrorKind::User);
        let envelope = error_envelope(&err);
        assert_eq!(envelope["type"], "user_error");
        assert!(envelope["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse JSON payload"));
    }

    #[test]
    fn test_default_output() {
        assert_eq!(default_output(Path::new("cv/jane.json")), PathBuf::from("cv/jane.pdf"));
        assert_eq!(default_output(Path::new("-")), PathBuf::from("cv.pdf"));
    }
}
