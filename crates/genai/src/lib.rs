//! The content-generation capability: an opaque one-shot call/response
//! boundary over a text/image completion service.
//!
//! The form engine only depends on the [`ContentGenerator`] trait; the
//! HTTP client, the prompt builders and the test double all live here so
//! no other crate holds service-specific knowledge.

mod client;
mod error;
mod mock;
pub mod prompt;

pub use client::{GeneratorConfig, HttpGenerator};
pub use error::GenerateError;
pub use mock::MockGenerator;

use async_trait::async_trait;
use dossier_schema::SharedData;

/// Which model a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSelector {
    /// The default text model.
    TextStandard,
    /// The higher-quality text model offered to paid plans.
    TextPro,
    /// The image-generation model.
    ImageGeneration,
}

impl ModelSelector {
    pub fn model_name(self) -> &'static str {
        match self {
            ModelSelector::TextStandard => "gemini-2.5-flash",
            ModelSelector::TextPro => "gemini-2.5-pro",
            ModelSelector::ImageGeneration => "gemini-2.5-flash-image",
        }
    }
}

/// A generated image payload, already decoded from the wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub data: SharedData,
    pub mime_type: String,
}

/// One-shot generation calls. No streaming; each call resolves to a
/// single completed result or an error.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Returns the completed text for an instruction.
    async fn generate_text(
        &self,
        prompt: &str,
        model: ModelSelector,
    ) -> Result<String, GenerateError>;

    /// Returns a single generated image for a description.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, GenerateError>;
}
