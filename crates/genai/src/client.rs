//! Reqwest-based client for a `generateContent`-style endpoint.

use crate::{ContentGenerator, GenerateError, GeneratedImage, ModelSelector};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The generated text is substituted verbatim into a form field, so the
/// model is told to skip preamble and markdown.
const TEXT_SUFFIX: &str = ". Réponds directement avec le texte généré, sans introduction, \
                           préambule ou formatage Markdown comme des astérisques.";

/// Connection settings for [`HttpGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads `DOSSIER_API_KEY` and the optional `DOSSIER_API_ENDPOINT`
    /// override from the environment.
    pub fn from_env() -> Result<Self, GenerateError> {
        let api_key = std::env::var("DOSSIER_API_KEY").map_err(|_| GenerateError::MissingApiKey)?;
        let mut config = Self::new(api_key);
        if let Ok(endpoint) = std::env::var("DOSSIER_API_ENDPOINT") {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// HTTP implementation of [`ContentGenerator`].
pub struct HttpGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl HttpGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Arc<Self>, GenerateError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Arc::new(Self { client, config }))
    }

    fn url(&self, model: ModelSelector) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            model.model_name(),
            self.config.api_key
        )
    }

    async fn call(
        &self,
        model: ModelSelector,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, GenerateError> {
        let response = self.client.post(self.url(model)).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::warn!("generation call failed with status {status}");
            return Err(GenerateError::Api { status: status.as_u16(), message });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ContentGenerator for HttpGenerator {
    async fn generate_text(
        &self,
        prompt: &str,
        model: ModelSelector,
    ) -> Result<String, GenerateError> {
        let request = GenerateRequest::text(format!("{prompt}{TEXT_SUFFIX}"));
        let response = self.call(model, &request).await?;
        let text = response.first_text().ok_or(GenerateError::EmptyResponse)?;
        Ok(text)
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, GenerateError> {
        let request = GenerateRequest::image(prompt.to_string());
        let response = self.call(ModelSelector::ImageGeneration, &request).await?;
        let inline = response.first_inline_data().ok_or(GenerateError::EmptyResponse)?;
        let data = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| GenerateError::InvalidPayload(e.to_string()))?;
        Ok(GeneratedImage {
            data: Arc::new(data),
            mime_type: inline.mime_type.clone(),
        })
    }
}

// --- Wire format ---

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    fn text(prompt: String) -> Self {
        Self {
            contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }],
            generation_config: None,
        }
    }

    fn image(prompt: String) -> Self {
        Self {
            contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }

    fn first_inline_data(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "inlineData", default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_is_concatenated_parts() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "Un projet " }, { "text": "culturel." } ] } }
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_text().as_deref(), Some("Un projet culturel."));
    }

    #[test]
    fn response_inline_data_is_found_among_parts() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [
                    { "text": "voici" },
                    { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
                ] } }
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let inline = response.first_inline_data().unwrap();
        assert_eq!(inline.mime_type, "image/png");
    }

    #[test]
    fn empty_candidates_yield_none() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.first_text().is_none());
        assert!(response.first_inline_data().is_none());
    }

    #[test]
    fn image_request_sets_response_modalities() {
        let request = GenerateRequest::image("un logo".into());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }
}
