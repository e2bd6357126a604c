use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF encoding error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no contact email on file for the municipality of {commune}")]
    MissingEmail { commune: String },
    #[error("unknown municipality '{0}'")]
    UnknownMunicipality(String),
}
