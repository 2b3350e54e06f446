use crate::config::LlmConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

// --- Request model ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    ImageUrl { url: String, detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentPart::Text(text.into())])
    }

    /// All text parts joined by blank lines.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::ImageUrl { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            ContentPart::ImageUrl { url, .. } => Some(url.as_str()),
            ContentPart::Text(_) => None,
        })
    }
}

/// One chat completion call. `model` overrides the client's configured model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

// --- Errors ---

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("authentication rejected (HTTP {status}): {body}")]
    Auth { status: u16, body: String },
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

impl LlmError {
    /// Short category name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Network(_) => "network",
            LlmError::Timeout => "timeout",
            LlmError::Auth { .. } => "auth",
            LlmError::Api { .. } => "api",
            LlmError::MalformedResponse(_) => "malformed_response",
            LlmError::Unavailable(_) => "unavailable",
        }
    }

    fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => LlmError::Auth {
                status: status.as_u16(),
                body,
            },
            code => LlmError::Api { status: code, body },
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs can carry credentials, keep them out of log lines.
        let e = e.without_url();
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_decode() {
            LlmError::MalformedResponse(e.to_string())
        } else {
            LlmError::Network(e.to_string())
        }
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, LlmError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(LlmError::from_status(status, body));
    }
    serde_json::from_str(&body)
        .map_err(|e| LlmError::MalformedResponse(format!("{}. Body: {}", e, body)))
}

// --- Client trait ---

#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

pub fn create_llm(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .context("Failed to build HTTP client")?;

    match config.provider.as_str() {
        "gemini" => {
            let cfg = config.gemini.as_ref().context("Gemini config missing")?;
            Ok(Box::new(GeminiClient::new(http, &cfg.api_key, &cfg.model)))
        }
        "ollama" => {
            let cfg = config.ollama.as_ref().context("Ollama config missing")?;
            Ok(Box::new(OllamaClient::new(http, &cfg.base_url, &cfg.model)))
        }
        "openai" => match config.openai.as_ref().filter(|c| !c.api_key.is_empty()) {
            Some(cfg) => Ok(Box::new(OpenAIClient::new(
                http,
                &cfg.api_key,
                &cfg.model,
                cfg.base_url.as_deref(),
            ))),
            None => {
                warn!("No OpenAI API key configured; every request will use template generation");
                Ok(Box::new(DisabledClient::new("no OpenAI API key configured")))
            }
        },
        "none" => Ok(Box::new(DisabledClient::new("LLM provider disabled"))),
        _ => Err(anyhow!("Unknown LLM provider: {}", config.provider)),
    }
}

// --- Disabled ---

#[derive(Debug)]
pub struct DisabledClient {
    reason: String,
}

impl DisabledClient {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl LlmClient for DisabledClient {
    async fn chat(&self, _request: &ChatRequest) -> Result<String, LlmError> {
        Err(LlmError::Unavailable(self.reason.clone()))
    }
}

// --- Gemini ---
#[derive(Debug)]
struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    fn new(client: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    File { file_data: GeminiFileData },
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: GeminiInlineData },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

/// Splits a base64 `data:` URI into its MIME type and payload.
fn split_data_uri(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let mime = if mime.is_empty() { "image/jpeg" } else { mime };
    Some((mime, data))
}

/// Best-effort MIME type from the URL path; Gemini requires one for file parts.
fn guess_image_mime(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    if path.starts_with("data:") {
        return match path.split([';', ',']).next() {
            Some("data:image/png") => "image/png",
            Some("data:image/webp") => "image/webp",
            Some("data:image/gif") => "image/gif",
            _ => "image/jpeg",
        };
    }
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}

fn gemini_parts(message: &ChatMessage) -> Vec<GeminiPart> {
    message
        .parts
        .iter()
        .map(|p| match p {
            ContentPart::Text(text) => GeminiPart::Text { text: text.clone() },
            ContentPart::ImageUrl { url, .. } => match split_data_uri(url) {
                Some((mime_type, data)) => GeminiPart::Inline {
                    inline_data: GeminiInlineData {
                        mime_type: mime_type.to_string(),
                        data: data.to_string(),
                    },
                },
                None => GeminiPart::File {
                    file_data: GeminiFileData {
                        mime_type: guess_image_mime(url).to_string(),
                        file_uri: url.clone(),
                    },
                },
            },
        })
        .collect()
}

impl GeminiClient {
    fn endpoint(&self, request: &ChatRequest) -> String {
        let model = request.model.as_deref().unwrap_or(&self.model);
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            model
        )
    }

    fn build_request(&self, request: &ChatRequest) -> GeminiRequest {
        let system_parts: Vec<GeminiPart> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .flat_map(gemini_parts)
            .collect();

        GeminiRequest {
            contents: request
                .messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| GeminiContent {
                    role: m.role.as_str().to_string(),
                    parts: gemini_parts(m),
                })
                .collect(),
            system_instruction: (!system_parts.is_empty())
                .then_some(GeminiSystemInstruction { parts: system_parts }),
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
                presence_penalty: request.presence_penalty,
                frequency_penalty: request.frequency_penalty,
            },
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let resp = self
            .client
            .post(self.endpoint(request))
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(request))
            .send()
            .await?;
        let result: GeminiResponse = read_json(resp).await?;

        if let Some(err) = result.error {
            return Err(LlmError::MalformedResponse(format!(
                "Gemini API returned error: {}",
                err.message
            )));
        }

        if let Some(first) = result.candidates.as_ref().and_then(|c| c.first()) {
            if let Some(part) = first.content.as_ref().and_then(|c| c.parts.first()) {
                return Ok(part.text.clone());
            }

            let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
            return Err(LlmError::MalformedResponse(format!(
                "Gemini response empty. Finish reason: {}",
                reason
            )));
        }

        Err(LlmError::MalformedResponse(
            "Gemini response has no candidates".to_string(),
        ))
    }
}

// --- Ollama ---
#[derive(Debug)]
struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    fn new(client: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaMessageResponse,
}

#[derive(Deserialize)]
struct OllamaMessageResponse {
    content: String,
}

/// Ollama only takes inline base64 images. `data:` payloads go to `images`,
/// remote references travel as text.
impl From<&ChatMessage> for OllamaMessage {
    fn from(message: &ChatMessage) -> Self {
        let mut content = message.text();
        let mut images = Vec::new();
        for url in message.image_urls() {
            if let Some((_, data)) = split_data_uri(url) {
                images.push(data.to_string());
                continue;
            }
            if !content.is_empty() {
                content.push_str("\n\n");
            }
            content.push_str("Image reference: ");
            content.push_str(url);
        }
        Self {
            role: message.role.as_str().to_string(),
            content,
            images,
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.base_url);

        let request_body = OllamaRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: request.messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
            options: OllamaOptions {
                num_predict: request.max_tokens,
                temperature: request.temperature,
                presence_penalty: request.presence_penalty,
                frequency_penalty: request.frequency_penalty,
            },
        };

        let resp = self.client.post(&url).json(&request_body).send().await?;
        let result: OllamaResponse = read_json(resp).await?;
        Ok(result.message.content)
    }
}

// --- OpenAI ---

#[derive(Debug)]
struct OpenAIClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIClient {
    fn new(client: reqwest::Client, api_key: &str, model: &str, base_url: Option<&str>) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url
                .unwrap_or("https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            client,
        }
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: OpenAIContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OpenAIContent {
    Text(String),
    Parts(Vec<OpenAIPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAIPart {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Serialize)]
struct OpenAIImageUrl {
    url: String,
    detail: String,
}

impl From<&ChatMessage> for OpenAIMessage {
    fn from(message: &ChatMessage) -> Self {
        let content = match message.parts.as_slice() {
            [ContentPart::Text(text)] => OpenAIContent::Text(text.clone()),
            parts => OpenAIContent::Parts(
                parts
                    .iter()
                    .map(|p| match p {
                        ContentPart::Text(text) => OpenAIPart::Text { text: text.clone() },
                        ContentPart::ImageUrl { url, detail } => OpenAIPart::ImageUrl {
                            image_url: OpenAIImageUrl {
                                url: url.clone(),
                                detail: detail.clone(),
                            },
                        },
                    })
                    .collect(),
            ),
        };
        Self {
            role: message.role.as_str(),
            content,
        }
    }
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

impl OpenAIClient {
    fn build_request(&self, request: &ChatRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: request.messages.iter().map(OpenAIMessage::from).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = self.build_request(request);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let result: OpenAIResponse = read_json(resp).await?;
        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                LlmError::MalformedResponse("OpenAI response empty or missing content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OllamaConfig, OpenAIConfig};

    fn sample_request() -> ChatRequest {
        ChatRequest {
            model: None,
            messages: vec![
                ChatMessage::system("You are a storyteller."),
                ChatMessage::user(vec![
                    ContentPart::Text("A lighthouse at dusk".to_string()),
                    ContentPart::ImageUrl {
                        url: "https://example.com/lighthouse.png".to_string(),
                        detail: "high".to_string(),
                    },
                ]),
            ],
            max_tokens: 300,
            temperature: 0.8,
            presence_penalty: 0.1,
            frequency_penalty: 0.1,
        }
    }

    #[test]
    fn test_gemini_response_parsing_safety_block() {
        let json = r#"{
            "candidates": [
                {
                    "finishReason": "SAFETY",
                    "index": 0
                }
            ]
        }"#;

        let result: GeminiResponse = serde_json::from_str(json).unwrap();
        let candidate = &result.candidates.as_ref().unwrap()[0];

        assert!(candidate.content.is_none());
        assert_eq!(candidate.finish_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_openai_response_parsing_success() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "The lamp flickered once, then held."
                },
                "finish_reason": "stop"
            }]
        }"#;

        let result: OpenAIResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.choices[0].message.content.as_deref(),
            Some("The lamp flickered once, then held.")
        );
    }

    #[test]
    fn test_openai_request_serializes_image_parts() {
        let client = OpenAIClient::new(reqwest::Client::new(), "sk-test", "gpt-4o", None);
        let body = serde_json::to_value(client.build_request(&sample_request())).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a storyteller.");

        let parts = &body["messages"][1]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "A lighthouse at dusk");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "https://example.com/lighthouse.png");
        assert_eq!(parts[1]["image_url"]["detail"], "high");
    }

    #[test]
    fn test_request_model_overrides_client_model() {
        let client = OpenAIClient::new(reqwest::Client::new(), "sk-test", "gpt-4o", None);
        let mut request = sample_request();
        request.model = Some("gpt-4".to_string());
        assert_eq!(client.build_request(&request).model, "gpt-4");
    }

    fn inline_image_message() -> ChatMessage {
        ChatMessage::user(vec![
            ContentPart::Text("hi".to_string()),
            ContentPart::ImageUrl {
                url: "data:image/png;base64,iVBORw0KGgo=".to_string(),
                detail: "high".to_string(),
            },
        ])
    }

    #[test]
    fn test_ollama_message_inlines_image_reference() {
        let request = sample_request();
        let message = OllamaMessage::from(&request.messages[1]);
        assert_eq!(
            message.content,
            "A lighthouse at dusk\n\nImage reference: https://example.com/lighthouse.png"
        );
        assert!(message.images.is_empty());

        let body = serde_json::to_value(&message).unwrap();
        assert!(body.get("images").is_none());
    }

    #[test]
    fn test_ollama_message_moves_data_uri_to_images() {
        let body = serde_json::to_value(OllamaMessage::from(&inline_image_message())).unwrap();
        assert_eq!(body["role"], "user");
        assert_eq!(body["content"], "hi");
        assert_eq!(body["images"], serde_json::json!(["iVBORw0KGgo="]));
    }

    #[test]
    fn test_gemini_request_serialization() {
        let client = GeminiClient::new(reqwest::Client::new(), "SECRET-KEY-123", "gemini-1.5-flash");
        let request = sample_request();
        let body = serde_json::to_value(client.build_request(&request)).unwrap();

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a storyteller."
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 300);
        assert!(body["generationConfig"]["temperature"].is_number());

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "A lighthouse at dusk");
        assert_eq!(
            contents[0]["parts"][1]["fileData"]["fileUri"],
            "https://example.com/lighthouse.png"
        );
        assert_eq!(contents[0]["parts"][1]["fileData"]["mimeType"], "image/png");

        let endpoint = client.endpoint(&request);
        assert!(endpoint.ends_with("/models/gemini-1.5-flash:generateContent"));
        assert!(!endpoint.contains("SECRET-KEY-123"));
    }

    #[test]
    fn test_gemini_data_uri_becomes_inline_data() {
        let parts = serde_json::to_value(gemini_parts(&inline_image_message())).unwrap();
        assert_eq!(
            parts[1],
            serde_json::json!({
                "inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}
            })
        );
    }

    #[test]
    fn test_split_data_uri() {
        assert_eq!(
            split_data_uri("data:image/webp;base64,UklGR"),
            Some(("image/webp", "UklGR"))
        );
        assert_eq!(split_data_uri("data:;base64,AAAA"), Some(("image/jpeg", "AAAA")));
        assert_eq!(split_data_uri("data:text/plain,hello"), None);
        assert_eq!(split_data_uri("https://x.test/a.png"), None);
    }

    #[tokio::test]
    async fn test_network_error_hides_request_url() {
        let err = reqwest::Client::new()
            .post("http://127.0.0.1:1/v1beta/models/m:generateContent?key=SECRET-KEY-123")
            .send()
            .await
            .unwrap_err();
        let err = LlmError::from(err);

        assert!(!err.to_string().contains("SECRET-KEY-123"), "{}", err);
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));
    }

    #[test]
    fn test_guess_image_mime() {
        assert_eq!(guess_image_mime("https://x.test/a.PNG?w=400"), "image/png");
        assert_eq!(guess_image_mime("https://x.test/a.webp"), "image/webp");
        assert_eq!(guess_image_mime("data:image/gif;base64,R0lG"), "image/gif");
        assert_eq!(guess_image_mime("https://x.test/photo"), "image/jpeg");
    }

    #[test]
    fn test_status_mapping() {
        let auth = LlmError::from_status(reqwest::StatusCode::UNAUTHORIZED, "bad key".into());
        assert_eq!(auth.kind(), "auth");

        let api = LlmError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert!(matches!(api, LlmError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_disabled_client_is_unavailable() {
        let client = DisabledClient::new("off");
        let err = client.chat(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), "unavailable");
    }

    #[tokio::test]
    async fn test_openai_without_key_falls_back_to_disabled() {
        let config = LlmConfig {
            openai: Some(OpenAIConfig::default()),
            ..LlmConfig::default()
        };
        let client = create_llm(&config).unwrap();
        let err = client.chat(&sample_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[test]
    fn test_create_llm_provider_selection() {
        let ollama = LlmConfig {
            provider: "ollama".to_string(),
            ollama: Some(OllamaConfig {
                base_url: "http://localhost:11434/".to_string(),
                model: "llava".to_string(),
            }),
            ..LlmConfig::default()
        };
        assert!(create_llm(&ollama).is_ok());

        let missing = LlmConfig {
            provider: "gemini".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_llm(&missing).is_err());

        let unknown = LlmConfig {
            provider: "markov".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_llm(&unknown).is_err());
    }
}
