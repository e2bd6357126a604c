use thiserror::Error;

/// Failures of the generation boundary. Callers convert these into
/// user-facing feedback; nothing here propagates further up.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("missing API key (set DOSSIER_API_KEY)")]
    MissingApiKey,
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("service returned no usable candidate")]
    EmptyResponse,
    #[error("malformed response payload: {0}")]
    InvalidPayload(String),
}
