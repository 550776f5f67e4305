//! Integration tests for the render pipeline
//!
//! The compile and render services are replaced by fakes that record the
//! model they received and write placeholder files.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};

use cvrender_core::{
    BuildOptions, CompileService, ErrorKind, IntermediateSource, RenderError, RenderPipeline,
    RenderService, Result, Workspace, PDF_GENERATION_FAILED,
};
use cvrender_schema::{
    Design, DocumentModel, EntryKind, Language, PageSize, RawPayload, Resolvable, SectionEntry, Theme,
};

const FAKE_PDF: &[u8] = b"%PDF-1.7 fake";

/// Writes a placeholder source to the model's typst path
#[derive(Default)]
struct FakeCompiler {
    seen: RefCell<Option<DocumentModel>>,
}

impl CompileService for FakeCompiler {
    fn compile(&self, model: &DocumentModel) -> Result<IntermediateSource> {
        *self.seen.borrow_mut() = Some(model.clone());
        let markup = format!("= {}", model.cv.name);
        let mut source = IntermediateSource::new(markup.clone());
        if let Some(path) = &model.settings.outputs.typst {
            fs::write(path, &markup).map_err(|e| RenderError::internal(e.to_string()))?;
            source = source.with_path(path);
        }
        Ok(source)
    }
}

enum RenderOutcome {
    WritePdf,
    Nothing,
    MissingFile,
}

struct FakeRenderer {
    outcome: RenderOutcome,
    workspace_seen: RefCell<Option<PathBuf>>,
}

impl FakeRenderer {
    fn new(outcome: RenderOutcome) -> Self {
        Self {
            outcome,
            workspace_seen: RefCell::new(None),
        }
    }
}

impl RenderService for FakeRenderer {
    fn render(&self, model: &DocumentModel, _source: &IntermediateSource) -> Result<Option<PathBuf>> {
        let Some(pdf) = model.settings.outputs.pdf.clone() else {
            return Ok(None);
        };
        *self.workspace_seen.borrow_mut() = pdf.parent().map(PathBuf::from);
        match self.outcome {
            RenderOutcome::WritePdf => {
                fs::write(&pdf, FAKE_PDF).map_err(|e| RenderError::internal(e.to_string()))?;
                Ok(Some(pdf))
            }
            RenderOutcome::Nothing => Ok(None),
            RenderOutcome::MissingFile => Ok(Some(pdf)),
        }
    }
}

fn payload(value: Value) -> RawPayload {
    match value {
        Value::Object(map) => map,
        _ => panic!("test payload must be a mapping"),
    }
}

fn sample_payload() -> RawPayload {
    payload(json!({
        "cv": {
            "name": "John Doe",
            "sections": {
                "education": [
                    {"institution": "MIT", "area": "CS", "degree": "BS"}
                ]
            }
        },
        "locale": {"language": "de"},
        "design": {"theme": "classic"}
    }))
}

#[test]
fn test_end_to_end_success() {
    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::WritePdf);
    let pipeline = RenderPipeline::new(&compiler, &renderer);

    let bytes = pipeline.render_pdf(&sample_payload()).unwrap();
    assert_eq!(bytes, FAKE_PDF);

    let model = compiler.seen.borrow().clone().unwrap();
    assert_eq!(model.locale, Language::German.defaults());
    assert_eq!(model.design, Resolvable::Resolved(Theme::Classic.defaults()));
    let education = &model.cv.sections["education"];
    assert_eq!(education.len(), 1);
    assert_eq!(education[0].kind(), Some(EntryKind::Education));
    assert!(model.cv.is_homogeneous());
}

#[test]
fn test_english_plain_text_section_end_to_end() {
    let english = || {
        payload(json!({
            "cv": {"name": "Jane Doe", "sections": {"Experience": ["Engineer at Acme"]}},
            "locale": {"language": "en"}
        }))
    };

    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::WritePdf);
    let bytes = RenderPipeline::new(&compiler, &renderer)
        .render_pdf(&english())
        .unwrap();
    assert!(!bytes.is_empty());

    let model = compiler.seen.borrow().clone().unwrap();
    assert_eq!(model.locale, Language::English.defaults());
    assert_eq!(model.design, Resolvable::Resolved(Design::default()));
    assert_eq!(
        model.cv.sections["Experience"],
        vec![SectionEntry::Text("Engineer at Acme".into())]
    );

    let renderer = FakeRenderer::new(RenderOutcome::Nothing);
    let err = RenderPipeline::new(FakeCompiler::default(), &renderer)
        .render_pdf(&english())
        .unwrap_err();
    assert!(matches!(err, RenderError::Internal(ref message) if message == PDF_GENERATION_FAILED));
}

#[test]
fn test_workspace_removed_after_render() {
    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::WritePdf);
    let pipeline = RenderPipeline::new(&compiler, &renderer);

    pipeline.render_pdf(&sample_payload()).unwrap();
    let workspace = renderer.workspace_seen.borrow().clone().unwrap();
    assert!(!workspace.exists());
}

#[test]
fn test_no_pdf_is_internal_error() {
    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::Nothing);
    let pipeline = RenderPipeline::new(&compiler, &renderer);

    let err = pipeline.render_pdf(&sample_payload()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.to_string(), PDF_GENERATION_FAILED);

    let workspace = renderer.workspace_seen.borrow().clone().unwrap();
    assert!(!workspace.exists());
}

#[test]
fn test_missing_pdf_file_is_internal_error() {
    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::MissingFile);
    let pipeline = RenderPipeline::new(&compiler, &renderer);

    let err = pipeline.render_pdf(&sample_payload()).unwrap_err();
    assert!(matches!(err, RenderError::Internal(ref message) if message == PDF_GENERATION_FAILED));
}

#[test]
fn test_validation_error_stops_before_compile() {
    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::WritePdf);
    let pipeline = RenderPipeline::new(&compiler, &renderer);

    let err = pipeline
        .render_pdf(&payload(json!({
            "cv": {"name": "J", "sections": {"Jobs": [{"company": "Acme", "position": "Dev", "end_date": "soon"}]}}
        })))
        .unwrap_err();
    let RenderError::Validation(validation) = err else {
        panic!("expected validation error");
    };
    assert_eq!(validation.errors[0].location_string(), "cv.sections.Jobs.0.end_date");
    assert!(compiler.seen.borrow().is_none());
}

#[test]
fn test_unknown_locale_reports_every_variant() {
    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::WritePdf);
    let pipeline = RenderPipeline::new(&compiler, &renderer);

    let mut payload = sample_payload();
    payload.insert("locale".to_string(), json!({"language": "xx"}));
    let err = pipeline.render_pdf(&payload).unwrap_err();
    let RenderError::Validation(validation) = err else {
        panic!("expected validation error");
    };
    assert_eq!(validation.len(), Language::ALL.len());
}

#[test]
fn test_design_string_passes_through_to_compiler() {
    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::WritePdf);
    let pipeline = RenderPipeline::new(&compiler, &renderer);

    let mut payload = sample_payload();
    payload.insert("design".to_string(), json!("classic"));
    pipeline.render_pdf(&payload).unwrap();

    let model = compiler.seen.borrow().clone().unwrap();
    assert_eq!(model.design, Resolvable::Pending(json!("classic")));
}

#[test]
fn test_prepare_without_overrides_keeps_defaults() {
    let pipeline = RenderPipeline::new(FakeCompiler::default(), FakeRenderer::new(RenderOutcome::Nothing));
    let workspace = Workspace::new().unwrap();

    let model = pipeline
        .prepare(
            &payload(json!({"cv": {"name": "J", "sections": {"Notes": ["one", "two"]}}})),
            &workspace,
            &BuildOptions::pdf_only(workspace.path()),
        )
        .unwrap();
    assert_eq!(model.locale.language, Language::English);
    let design = model.design.resolved().unwrap();
    assert_eq!(design.theme, Theme::Classic);
    assert_eq!(design.page.size, PageSize::UsLetter);
    assert_eq!(
        model.cv.sections["Notes"],
        vec![SectionEntry::Text("one".into()), SectionEntry::Text("two".into())]
    );
    assert!(workspace.input_path().is_file());
}

#[test]
fn test_side_outputs_written_where_requested() {
    let compiler = FakeCompiler::default();
    let renderer = FakeRenderer::new(RenderOutcome::WritePdf);
    let pipeline = RenderPipeline::new(&compiler, &renderer);
    let out = tempfile::tempdir().unwrap();
    let typst = out.path().join("cv.typ");

    pipeline
        .render_pdf_with(
            &sample_payload(),
            BuildOptions {
                typst_path: Some(typst.clone()),
                ..BuildOptions::default()
            },
        )
        .unwrap();
    assert_eq!(fs::read_to_string(&typst).unwrap(), "= John Doe");
}

#[test]
fn test_unsupported_output_is_user_error() {
    let pipeline = RenderPipeline::new(FakeCompiler::default(), FakeRenderer::new(RenderOutcome::WritePdf));
    let err = pipeline
        .render_pdf_with(
            &sample_payload(),
            BuildOptions {
                skip_png: false,
                ..BuildOptions::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::User);
}
