//! Gemini `generateContent` client.
//!
//! One endpoint serves both operations: text calls ask for a JSON answer
//! constrained by a response schema, image calls ask for the IMAGE modality
//! and read the first `inlineData` part.

use std::time::{Duration, Instant};

use amocover_kernel::settings::ProviderSettings;
use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{GenerativeProvider, ImageRequest, StructuredTextRequest};
use crate::modules::covers::error::GenerationError;
use crate::modules::covers::models::CoverImage;

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_IMAGE_MIME: &str = "image/png";
const ERROR_BODY_LIMIT: usize = 512;

/// HTTP client for the Gemini REST API.
pub struct GeminiProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl GeminiProvider {
    /// Build a client from provider settings. A missing key is not an error
    /// here; it surfaces on the first call.
    pub fn new(settings: ProviderSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self::with_client(client, settings))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| GenerationError::configuration("API key is missing"))
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let api_key = self.api_key()?;
        let started = Instant::now();

        let response = self
            .client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(
            model,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gemini generateContent answered"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate_structured_text(
        &self,
        request: StructuredTextRequest,
    ) -> Result<String, GenerationError> {
        let body = GenerateContentRequest::text(request);
        let response = self
            .generate_content(&self.settings.text_model, &body)
            .await?;
        response.text()
    }

    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> Result<Option<CoverImage>, GenerationError> {
        let body = GenerateContentRequest::image(request);
        let response = self
            .generate_content(&self.settings.image_model, &body)
            .await?;
        response.first_image()
    }
}

fn status_error(status: StatusCode, body: &str) -> GenerationError {
    let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::configuration(
            format!("provider rejected the credential ({}): {}", status, excerpt),
        ),
        _ => GenerationError::upstream(format!("provider returned {}: {}", status, excerpt)),
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn text(request: StructuredTextRequest) -> Self {
        Self {
            contents: vec![RequestContent::prompt(request.prompt)],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(request.schema),
                ..GenerationConfig::default()
            },
        }
    }

    fn image(request: ImageRequest) -> Self {
        Self {
            contents: vec![RequestContent::prompt(request.prompt)],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["IMAGE"]),
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio,
                }),
                ..GenerationConfig::default()
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

impl RequestContent {
    fn prompt(text: String) -> Self {
        Self {
            role: "user",
            parts: vec![RequestPart { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// Why the model produced nothing, if it said.
    fn empty_reason(&self) -> String {
        let block = self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref());
        let finish = self
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref());
        match (block, finish) {
            (Some(reason), _) => format!("prompt blocked: {reason}"),
            (None, Some(reason)) => format!("finish reason: {reason}"),
            (None, None) => "no candidates".to_string(),
        }
    }

    fn text(&self) -> Result<String, GenerationError> {
        let text: String = self
            .parts()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            return Err(GenerationError::schema(format!(
                "failed to generate text ({})",
                self.empty_reason()
            )));
        }
        Ok(text)
    }

    fn first_image(&self) -> Result<Option<CoverImage>, GenerationError> {
        let Some(inline) = self.parts().find_map(|part| part.inline_data.as_ref()) else {
            tracing::debug!(reason = %self.empty_reason(), "image answer carried no inline data");
            return Ok(None);
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data.trim())
            .map_err(|e| GenerationError::schema(format!("image payload is not base64: {e}")))?;
        if bytes.is_empty() {
            return Ok(None);
        }

        let mime_type = if inline.mime_type.is_empty() {
            DEFAULT_IMAGE_MIME
        } else {
            inline.mime_type.as_str()
        };
        Ok(Some(CoverImage::new(mime_type, bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_request_asks_for_json_with_schema() {
        let body = GenerateContentRequest::text(StructuredTextRequest {
            prompt: "Buat paket pemasaran".to_string(),
            schema: json!({"type": "OBJECT"}),
        });
        let wire = serde_json::to_value(&body).unwrap();

        assert_eq!(wire["contents"][0]["parts"][0]["text"], "Buat paket pemasaran");
        assert_eq!(
            wire["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(wire["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(wire["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn image_request_carries_aspect_ratio() {
        let body = GenerateContentRequest::image(ImageRequest {
            prompt: "cover".to_string(),
            aspect_ratio: "3:4",
        });
        let wire = serde_json::to_value(&body).unwrap();

        assert_eq!(wire["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");
        assert_eq!(wire["generationConfig"]["responseModalities"][0], "IMAGE");
        assert!(wire["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn text_skips_thought_parts_and_joins_the_rest() {
        let answer = response(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "{\"clickbait\":" },
                    { "text": "[\"x\"]}" }
                ]}
            }]
        }));
        assert_eq!(answer.text().unwrap(), "{\"clickbait\":[\"x\"]}");
    }

    #[test]
    fn empty_text_reports_block_reason() {
        let answer = response(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        let err = answer.text().unwrap_err();
        assert!(matches!(err, GenerationError::Schema(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn first_inline_image_is_decoded() {
        let answer = response(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your cover" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/4A==" } }
                ]}
            }]
        }));
        let cover = answer.first_image().unwrap().unwrap();
        assert_eq!(cover.mime_type(), "image/jpeg");
        assert_eq!(cover.bytes(), &[0xff, 0xd8, 0xff, 0xe0]);
    }

    #[test]
    fn answer_without_image_yields_none() {
        let answer = response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot draw that" }] } }]
        }));
        assert_eq!(answer.first_image().unwrap(), None);
    }

    #[test]
    fn corrupt_image_payload_is_schema_error() {
        let answer = response(json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "%%%" } }] }
            }]
        }));
        assert!(matches!(answer.first_image(), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn rejected_credential_maps_to_configuration_error() {
        let err = status_error(StatusCode::FORBIDDEN, "API key not valid");
        assert!(matches!(err, GenerationError::Configuration(_)));

        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, "overloaded");
        assert!(matches!(err, GenerationError::Upstream(_)));
    }

    #[tokio::test]
    async fn missing_key_fails_on_first_use_without_network() {
        let provider = GeminiProvider::with_client(
            reqwest::Client::new(),
            ProviderSettings {
                base_url: "http://127.0.0.1:9".to_string(),
                ..ProviderSettings::default()
            },
        );

        let err = provider
            .generate_image(ImageRequest {
                prompt: "cover".to_string(),
                aspect_ratio: "3:4",
            })
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::configuration("API key is missing"));
    }

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let provider = GeminiProvider::with_client(
            reqwest::Client::new(),
            ProviderSettings {
                base_url: "https://example.test/".to_string(),
                ..ProviderSettings::default()
            },
        );
        assert_eq!(
            provider.endpoint("gemini-2.5-flash-image"),
            "https://example.test/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }
}
