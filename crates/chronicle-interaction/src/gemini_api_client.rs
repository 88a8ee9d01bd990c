//! GeminiApiClient - Direct REST API implementation of the generation client.
//!
//! Text, image and chat operations all go through the `generateContent`
//! endpoint. The API key is resolved from the credential provider on every
//! call so a key selected after startup is used immediately.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chronicle_core::chat::{ChatRole, ChatTurn};
use chronicle_core::comic::{Category, FrameScript, ImageRef, PanelScript};
use chronicle_core::config::{ChronicleConfig, ModelConfig};
use chronicle_core::credential::CredentialProvider;
use chronicle_core::error::{ChronicleError, Result};
use chronicle_core::generation::{GenerationClient, operation};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::prompts;

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Generation client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
    models: ModelConfig,
}

impl GeminiApiClient {
    /// Creates a client using the models, endpoint and timeout from `config`.
    pub fn new(credentials: Arc<dyn CredentialProvider>, config: &ChronicleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| ChronicleError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            credentials,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            models: config.models.clone(),
        })
    }

    /// Overrides the models after construction.
    pub fn with_models(mut self, models: ModelConfig) -> Self {
        self.models = models;
        self
    }

    async fn api_key(&self) -> Result<String> {
        self.credentials
            .api_key()
            .await
            .filter(|key| !key.trim().is_empty())
            .ok_or(ChronicleError::MissingCredential)
    }

    async fn send_request(
        &self,
        op: &'static str,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self.api_key().await?;
        let url = format!("{}/{model}:generateContent", self.base_url);

        tracing::debug!(operation = op, model, "Sending Gemini request");

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                ChronicleError::generation(op, format!("Gemini API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(op, status, body_text));
        }

        response.json().await.map_err(|err| {
            ChronicleError::generation(op, format!("Failed to parse Gemini response: {err}"))
        })
    }

    async fn generate_image(
        &self,
        op: &'static str,
        prompt: String,
        image_config: ImageConfig,
    ) -> Result<Option<ImageRef>> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                image_config: Some(image_config),
                ..GenerationConfig::default()
            }),
        };

        let response = self.send_request(op, &self.models.image, &request).await?;
        Ok(extract_inline_image(&response))
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        prompt: String,
        instruction: &str,
        schema: Value,
    ) -> Result<T> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: Some(Content::system(instruction)),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
                ..GenerationConfig::default()
            }),
        };

        let response = self.send_request(op, &self.models.text, &request).await?;
        let text = extract_text(&response).ok_or(ChronicleError::EmptyResponse { operation: op })?;
        parse_json_payload(op, &text)
    }
}

#[async_trait]
impl GenerationClient for GeminiApiClient {
    async fn generate_cover_art(&self) -> Result<Option<ImageRef>> {
        let image = self
            .generate_image(
                operation::COVER_ART,
                prompts::COVER_ART_PROMPT.to_string(),
                ImageConfig::new("16:9", "2K"),
            )
            .await
            .inspect_err(|err| tracing::error!("Cover art generation failed: {}", err))?;

        if image.is_none() {
            tracing::warn!("Cover art response carried no image data");
        }
        Ok(image)
    }

    async fn generate_panel_image(&self, directive: &str) -> Option<ImageRef> {
        match self
            .generate_image(
                operation::PANEL_IMAGE,
                prompts::panel_image_prompt(directive),
                ImageConfig::new("1:1", "1K"),
            )
            .await
        {
            Ok(Some(image)) => Some(image),
            Ok(None) => {
                tracing::warn!("Panel image response carried no image data");
                None
            }
            Err(err) => {
                tracing::warn!("Panel image generation failed: {}", err);
                None
            }
        }
    }

    async fn generate_panel_script(&self, category: Category) -> Result<PanelScript> {
        self.generate_json(
            operation::PANEL_SCRIPT,
            prompts::panel_script_prompt(category),
            prompts::PANEL_SCRIPT_INSTRUCTION,
            prompts::panel_script_schema(),
        )
        .await
    }

    async fn generate_strip_script(&self, title: &str, body: &str) -> Result<Vec<FrameScript>> {
        let payload: StripScriptPayload = self
            .generate_json(
                operation::STRIP_SCRIPT,
                prompts::strip_script_prompt(title, body),
                prompts::STRIP_SCRIPT_INSTRUCTION,
                prompts::strip_script_schema(),
            )
            .await?;

        if payload.panels.is_empty() {
            return Err(ChronicleError::malformed(
                operation::STRIP_SCRIPT,
                "strip script contained no panels",
            ));
        }
        Ok(payload.panels)
    }

    async fn send_chat_turn(&self, history: &[ChatTurn], text: &str) -> Result<String> {
        let mut contents: Vec<Content> = history.iter().map(Content::from_turn).collect();
        contents.push(Content::user(text.to_string()));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::system(prompts::CHAT_INSTRUCTION)),
            generation_config: None,
        };

        let response = self
            .send_request(operation::CHAT, &self.models.chat, &request)
            .await?;
        Ok(extract_text(&response).unwrap_or_default())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: Some("user"),
            parts: vec![Part { text }],
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: text.trim().to_string(),
            }],
        }
    }

    fn from_turn(turn: &ChatTurn) -> Self {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "model",
        };
        Self {
            role: Some(role),
            parts: vec![Part {
                text: turn.text.clone(),
            }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
    image_size: &'static str,
}

impl ImageConfig {
    fn new(aspect_ratio: &'static str, image_size: &'static str) -> Self {
        Self {
            aspect_ratio,
            image_size,
        }
    }
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct StripScriptPayload {
    panels: Vec<FrameScript>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

// ============================================================================
// Response helpers
// ============================================================================

fn first_parts(response: &GenerateContentResponse) -> &[PartResponse] {
    response
        .candidates
        .as_deref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or_default()
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let text: String = first_parts(response)
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

/// Returns the first inline image of the first candidate as a data URL.
fn extract_inline_image(response: &GenerateContentResponse) -> Option<ImageRef> {
    let inline = first_parts(response)
        .iter()
        .find_map(|part| part.inline_data.as_ref())?;

    if let Err(err) = BASE64_STANDARD.decode(inline.data.as_bytes()) {
        tracing::warn!("Discarding inline image with invalid base64: {}", err);
        return None;
    }

    let mime_type = inline.mime_type.as_deref().unwrap_or(DEFAULT_IMAGE_MIME);
    Some(ImageRef::from_inline(mime_type, &inline.data))
}

/// Removes a surrounding markdown code fence, if the model added one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string ("json") on the opening fence line
    match rest.split_once('\n') {
        Some((info, body)) if !info.contains('{') && !info.contains('[') => body.trim(),
        _ => rest.trim(),
    }
}

fn parse_json_payload<T: DeserializeOwned>(op: &'static str, text: &str) -> Result<T> {
    let json = strip_code_fence(text);
    if json.is_empty() {
        return Err(ChronicleError::EmptyResponse { operation: op });
    }
    serde_json::from_str(json).map_err(|err| ChronicleError::malformed(op, err.to_string()))
}

fn map_http_error(op: &'static str, status: StatusCode, body: String) -> ChronicleError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    ChronicleError::generation(op, format!("HTTP {}: {message}", status.as_u16()))
}
