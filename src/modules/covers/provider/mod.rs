//! Generative-AI provider abstraction.
//!
//! The orchestrator only talks to [`GenerativeProvider`]; the Gemini client
//! is the production implementation and tests plug in fakes.

pub mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;

use super::error::GenerationError;
use super::models::CoverImage;

/// Text request whose answer must be JSON matching `schema`.
#[derive(Debug, Clone)]
pub struct StructuredTextRequest {
    pub prompt: String,
    pub schema: serde_json::Value,
}

/// Image request with an aspect-ratio hint such as `"3:4"`.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: &'static str,
}

#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Return the raw structured text the model produced.
    async fn generate_structured_text(
        &self,
        request: StructuredTextRequest,
    ) -> Result<String, GenerationError>;

    /// Return the first inline image of the answer, or `None` when the model
    /// answered without one.
    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> Result<Option<CoverImage>, GenerationError>;
}
