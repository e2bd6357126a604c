use dossier_schema::FieldType;
use thiserror::Error;

/// Programmer-facing engine errors. User-facing feedback (generation
/// failures, validation messages) travels through notices instead.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("unknown field '{label}' in section '{section}'")]
    UnknownField { section: String, label: String },
    #[error("value shape does not match field '{label}' of type {field_type}")]
    ShapeMismatch { label: String, field_type: FieldType },
    #[error("field '{label}' is not a {expected} field")]
    WrongFieldType { label: String, expected: &'static str },
    #[error("index {index} out of range for '{label}'")]
    IndexOutOfRange { label: String, index: usize },
    #[error("unknown column '{column}' for table '{label}'")]
    UnknownColumn { label: String, column: String },
    #[error("a generation request for '{label}' is already in flight")]
    FieldBusy { label: String },
    #[error("field '{label}' does not offer AI fill")]
    AiFillNotOffered { label: String },
}
