//! Dossier: a schema-driven grant-application form engine with
//! AI-assisted fill and paginated PDF export.
//!
//! The workspace splits along capability lines:
//! - `dossier-schema`: form schemas, typed values, the answer record
//! - `dossier-form`: the interactive engine (widgets, edits, AI fill)
//! - `dossier-genai`: the content-generation boundary and HTTP client
//! - `dossier-export`: the PDF exporter and send-by-mail dispatch
//! - `dossier-store`: snapshot persistence
//!
//! This facade re-exports the public surface, ships the built-in
//! "Candidature Spontanée" form, and wires the action buttons to the
//! exporter.
//!
//! ```no_run
//! use std::sync::Arc;
//! use dossier::{Action, ExportOptions, FormEngine, Value, run_action,
//!               spontaneous_application_form};
//!
//! # async fn demo(generator: Arc<dyn dossier::ContentGenerator>) -> Result<(), dossier::DossierError> {
//! let schema = Arc::new(spontaneous_application_form());
//! let mut engine = FormEngine::new(schema, generator);
//! engine.set_value("presentation_projet", "Titre du projet",
//!                  Value::Text("Atelier Numérique".into()))?;
//! let outcome = run_action(&mut engine, Action::GeneratePdf, &ExportOptions::default()).await?;
//! assert!(outcome.pdf.starts_with(b"%PDF"));
//! # Ok(())
//! # }
//! ```

mod actions;
mod builtin;

use thiserror::Error;

pub use actions::{Action, ActionOutcome, run_action};
pub use builtin::spontaneous_application_form;

pub use dossier_schema::{
    AcquisitionMode, AnswerRecord, FieldSpec, FieldType, FileRef, FormSchema, RowRecord,
    SchemaError, Section, SharedData, Value,
};

pub use dossier_form::{
    ContentGenerator, EngineConfig, FileSummary, FillOutcome, FormEngine, FormError, Notice,
    NoticeKind, PendingFill, TextKind, Widget,
};

pub use dossier_genai::{
    GeneratedImage, GenerateError, GeneratorConfig, HttpGenerator, MockGenerator, ModelSelector,
};

pub use dossier_export::{
    DEFAULT_TITLE, DispatchError, ExportError, ExportOptions, PageMetrics, dispatch, export,
    project_title, suggested_filename,
};

pub use dossier_store::{FileStore, MemoryStore, OrganizationProfile, Store, StoreError};

/// Any failure the crate can surface, for callers that keep one error
/// type at the application boundary.
#[derive(Error, Debug)]
pub enum DossierError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no recipient municipality selected")]
    NoRecipient,
}
