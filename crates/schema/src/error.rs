use thiserror::Error;

/// Errors raised while loading or validating a form schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate section id '{0}'")]
    DuplicateSection(String),
    #[error("duplicate field label '{label}' in section '{section}'")]
    DuplicateField { section: String, label: String },
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("unknown field '{label}' in section '{section}'")]
    UnknownField { section: String, label: String },
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
}
