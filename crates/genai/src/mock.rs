//! A canned [`ContentGenerator`] for tests and offline development.

use crate::{ContentGenerator, GenerateError, GeneratedImage, ModelSelector};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns fixed responses, or fails every call, and counts invocations.
pub struct MockGenerator {
    text: Option<String>,
    image: Option<(Vec<u8>, String)>,
    calls: AtomicUsize,
}

impl MockGenerator {
    /// Succeeds with the given text; image calls return a 1x1 PNG header
    /// stand-in unless [`with_image`](Self::with_image) overrides it.
    pub fn succeeding(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: Some((vec![0x89, b'P', b'N', b'G'], "image/png".into())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every call with an unreachable-service error.
    pub fn failing() -> Self {
        Self { text: None, image: None, calls: AtomicUsize::new(0) }
    }

    pub fn with_image(mut self, data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        self.image = Some((data, mime_type.into()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn unavailable() -> GenerateError {
        GenerateError::Api { status: 503, message: "service unavailable".into() }
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate_text(
        &self,
        _prompt: &str,
        _model: ModelSelector,
    ) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone().ok_or_else(Self::unavailable)
    }

    async fn generate_image(&self, _prompt: &str) -> Result<GeneratedImage, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.image {
            Some((data, mime_type)) => Ok(GeneratedImage {
                data: Arc::new(data.clone()),
                mime_type: mime_type.clone(),
            }),
            None => Err(Self::unavailable()),
        }
    }
}
