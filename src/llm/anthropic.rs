use serde::{Deserialize, Serialize};

use super::provider::{
    ChatRequest, ChatResponse, LlmError, LlmProvider, LlmResult, TokenUsage,
};
use crate::assistant::conversation::ChatMessage;
use crate::http::client::{HttpClient, HttpResponseData};

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_ERROR_BODY_CHARS: usize = 400;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    http: HttpClient,
    api_key: String,
    base_url: String,
    settings: ModelSettings,
}

impl AnthropicProvider {
    pub fn new(
        http: HttpClient,
        api_key: Option<String>,
        base_url: String,
        settings: ModelSettings,
    ) -> LlmResult<Self> {
        let api_key = api_key
            .filter(|v| !v.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("{}{MESSAGES_PATH}", self.base_url)
    }

    fn build_request<'a>(&'a self, request: &'a ChatRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: &request.system,
            messages: &request.messages,
        }
    }

    fn extract_response(resp: MessagesResponse) -> LlmResult<ChatResponse> {
        let text = resp
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text.filter(|text| !text.trim().is_empty()))
            .ok_or(LlmError::EmptyResponse)?;

        let usage = resp.usage.map(|usage| TokenUsage {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
        });

        Ok(ChatResponse { text, usage })
    }

    fn error_from_status(resp: &HttpResponseData) -> LlmError {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&resp.body) {
            return LlmError::Api {
                status: resp.status,
                kind: envelope.error.kind,
                message: envelope.error.message,
            };
        }

        LlmError::HttpStatus {
            status: resp.status,
            body: resp.body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        }
    }
}

impl LlmProvider for AnthropicProvider {
    async fn generate(&self, request: ChatRequest) -> LlmResult<ChatResponse> {
        let payload = self.build_request(&request);
        let resp = self
            .http
            .post_json(
                &self.endpoint(),
                &[
                    ("x-api-key", self.api_key.as_str()),
                    ("anthropic-version", ANTHROPIC_VERSION),
                ],
                &payload,
            )
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        if !resp.is_success() {
            return Err(Self::error_from_status(&resp));
        }

        let parsed = serde_json::from_str::<MessagesResponse>(&resp.body)
            .map_err(|err| LlmError::Parse(err.to_string()))?;
        Self::extract_response(parsed)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}
