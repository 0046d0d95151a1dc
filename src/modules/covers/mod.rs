//! Book cover and marketing copy generator.
//!
//! One submission fans out into five concurrent generative calls (one
//! structured-text call for the copy, four image calls for the covers) and
//! the form state plus result presenter are exposed under `/api/covers`.

pub mod error;
pub mod form;
pub mod generator;
pub mod models;
pub mod presenter;
pub mod prompts;
pub mod provider;
pub mod routes;
pub mod styles;

use std::sync::Arc;

use amocover_kernel::{settings::ProviderSettings, InitCtx, Module};
use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use generator::CoverGenerator;
use provider::GeminiProvider;
use routes::CoversState;

pub struct CoversModule {
    state: CoversState,
}

impl CoversModule {
    pub fn new(generator: CoverGenerator) -> Self {
        Self {
            state: CoversState::new(generator),
        }
    }
}

#[async_trait]
impl Module for CoversModule {
    fn name(&self) -> &'static str {
        "covers"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let provider = &ctx.settings.provider;
        if !provider.has_api_key() {
            tracing::warn!(
                module = self.name(),
                "no provider API key configured; generations will fail until one is set"
            );
        }
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            text_model = %provider.text_model,
            image_model = %provider.image_model,
            "covers module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "covers module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "covers module stopped");
        Ok(())
    }
}

/// Module backed by an arbitrary generator, used by tests with fake providers.
pub fn create_module(generator: CoverGenerator) -> Arc<dyn Module> {
    Arc::new(CoversModule::new(generator))
}

/// Module backed by the Gemini REST provider.
pub fn from_settings(settings: &ProviderSettings) -> anyhow::Result<Arc<dyn Module>> {
    let provider = GeminiProvider::new(settings.clone())?;
    Ok(create_module(CoverGenerator::new(Arc::new(provider))))
}

fn json_body(schema: &str) -> Value {
    json!({
        "application/json": {
            "schema": { "$ref": format!("#/components/schemas/{}", schema) }
        }
    })
}

fn error_response(description: &str) -> Value {
    json!({ "description": description, "content": json_body("ErrorResponse") })
}

fn openapi_fragment() -> Value {
    let form_ok = json!({ "description": "Current form state", "content": json_body("FormSnapshot") });
    let result_ok = json!({ "description": "Current result view", "content": json_body("ResultSnapshot") });
    let no_result = error_response("No generation result to show");

    json!({
        "paths": {
            "/styles": {
                "get": {
                    "summary": "List cover style presets",
                    "tags": ["Covers"],
                    "responses": {
                        "200": {
                            "description": "Style presets in display order",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/BookStyle" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "/form": {
                "get": {
                    "summary": "Read the form state",
                    "tags": ["Covers"],
                    "responses": { "200": form_ok }
                }
            },
            "/form/{field}": {
                "put": {
                    "summary": "Set one form field",
                    "tags": ["Covers"],
                    "parameters": [{
                        "name": "field",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string", "enum": ["title", "author", "synopsis", "style"] }
                    }],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": { "value": { "type": "string" } },
                                    "required": ["value"]
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": form_ok,
                        "400": error_response("Form is locked while generating"),
                        "404": error_response("Unknown form field")
                    }
                }
            },
            "/form/submit": {
                "post": {
                    "summary": "Submit the form and start a generation",
                    "tags": ["Covers"],
                    "responses": {
                        "202": { "description": "Generation started", "content": json_body("FormSnapshot") },
                        "200": { "description": "Form incomplete or already generating; nothing changed", "content": json_body("FormSnapshot") }
                    }
                }
            },
            "/result": {
                "get": {
                    "summary": "Read the result view",
                    "tags": ["Covers"],
                    "responses": { "200": result_ok, "404": no_result }
                }
            },
            "/result/selection": {
                "put": {
                    "summary": "Select a cover",
                    "tags": ["Covers"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": { "index": { "type": "integer", "minimum": 0, "maximum": 3 } },
                                    "required": ["index"]
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": result_ok,
                        "400": error_response("Cover index out of range"),
                        "404": no_result
                    }
                }
            },
            "/result/tab": {
                "put": {
                    "summary": "Switch the marketing copy tab",
                    "tags": ["Covers"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "tab": { "type": "string", "enum": ["short", "long", "promo_130", "promo_250"] }
                                    },
                                    "required": ["tab"]
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": result_ok,
                        "400": error_response("Tab not available for this result"),
                        "404": no_result
                    }
                }
            },
            "/result/copy": {
                "post": {
                    "summary": "Copy the active tab's text",
                    "tags": ["Covers"],
                    "responses": {
                        "200": { "description": "Copied text and confirmation", "content": json_body("CopiedText") },
                        "404": no_result
                    }
                }
            },
            "/result/covers/{index}": {
                "get": {
                    "summary": "Download one cover image",
                    "tags": ["Covers"],
                    "parameters": [{
                        "name": "index",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "integer", "minimum": 0, "maximum": 3 }
                    }],
                    "responses": {
                        "200": {
                            "description": "Image bytes served as an attachment named amocover-ai-{n}.{ext}",
                            "content": {
                                "image/*": { "schema": { "type": "string", "format": "binary" } }
                            }
                        },
                        "400": error_response("Cover index out of range"),
                        "404": no_result
                    }
                }
            },
            "/generate": {
                "post": {
                    "summary": "Generate covers and copy in one request",
                    "tags": ["Covers"],
                    "requestBody": { "required": true, "content": json_body("BookDraft") },
                    "responses": {
                        "200": { "description": "Four covers and the marketing copy", "content": json_body("GenerationResult") },
                        "422": error_response("Incomplete input"),
                        "409": error_response("Another generation is in progress"),
                        "502": error_response("Generation failed")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Covers health check",
                    "tags": ["Covers"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "BookStyle": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "label": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["id", "label", "description"]
                },
                "BookDraft": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "synopsis": { "type": "string" },
                        "style": { "type": "string", "description": "Style preset id or label" }
                    }
                },
                "FormSnapshot": {
                    "type": "object",
                    "properties": {
                        "input": { "$ref": "#/components/schemas/BookDraft" },
                        "valid": { "type": "boolean" },
                        "missing": { "type": "array", "items": { "type": "string" } },
                        "phase": { "type": "string", "enum": ["idle", "generating", "success", "error"] },
                        "error": { "type": ["string", "null"] },
                        "result_available": { "type": "boolean" }
                    },
                    "required": ["input", "valid", "missing", "phase", "result_available"]
                },
                "CoverImage": {
                    "type": "object",
                    "properties": {
                        "mime_type": { "type": "string" },
                        "data_uri": { "type": "string" }
                    },
                    "required": ["mime_type", "data_uri"]
                },
                "MarketingCopy": {
                    "type": "object",
                    "properties": {
                        "clickbait": { "type": "array", "items": { "type": "string" } },
                        "short_caption": { "type": "string" },
                        "long_caption": { "type": "string" },
                        "promo_130": { "type": ["string", "null"] },
                        "promo_250": { "type": ["string", "null"] }
                    },
                    "required": ["clickbait", "short_caption", "long_caption"]
                },
                "GenerationResult": {
                    "type": "object",
                    "properties": {
                        "covers": {
                            "type": "array",
                            "minItems": 4,
                            "maxItems": 4,
                            "items": { "$ref": "#/components/schemas/CoverImage" }
                        },
                        "copy": { "$ref": "#/components/schemas/MarketingCopy" }
                    },
                    "required": ["covers", "copy"]
                },
                "ResultSnapshot": {
                    "type": "object",
                    "properties": {
                        "headline": { "type": "string" },
                        "clickbait": { "type": "array", "items": { "type": "string" } },
                        "covers": { "type": "array", "items": { "type": "object" } },
                        "tabs": { "type": "array", "items": { "type": "object" } },
                        "active_tab": { "type": "string" },
                        "active_text": { "type": "string" }
                    },
                    "required": ["headline", "clickbait", "covers", "tabs", "active_tab", "active_text"]
                },
                "CopiedText": {
                    "type": "object",
                    "properties": {
                        "tab": { "type": "string" },
                        "text": { "type": "string" },
                        "confirmation": { "type": "string" }
                    },
                    "required": ["tab", "text", "confirmation"]
                }
            }
        }
    })
}
