//! Typed data model for application form dossiers.
//!
//! This crate defines the static, declarative description of a form
//! (`FormSchema` / `Section` / `FieldSpec`) and the live set of answers
//! keyed by section and field (`AnswerRecord` / `Value`). The schema is
//! immutable input, loaded once; the answer record is mutated by the form
//! engine and read by the exporter.

mod error;
mod record;
mod schema;
mod value;

pub use error::SchemaError;
pub use record::AnswerRecord;
pub use schema::{AcquisitionMode, FieldSpec, FieldType, FormSchema, Section};
pub use value::{FileRef, RowRecord, SharedData, Value};
