use crate::assistant::conversation::ChatMessage;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

pub const API_KEY_HINT: &str = "Please check your API key and try again.";
pub const GENERIC_HINT: &str = "Please try again or contact support if the issue persists.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("missing ANTHROPIC_API_KEY")]
    MissingApiKey,
    #[error("API Error: {status} {kind}: {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },
    #[error("API Error: {status} {body}")]
    HttpStatus { status: u16, body: String },
    #[error("API Error: Connection error: {0}")]
    Transport(String),
    #[error("provider parse error: {0}")]
    Parse(String),
    #[error("provider returned empty response text")]
    EmptyResponse,
}

impl LlmError {
    /// True for failures reaching or answered by the API, as opposed to
    /// a reply that could not be used.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::HttpStatus { .. } | Self::Transport(_)
        )
    }

    /// Text shown to the student in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(_) | Self::EmptyResponse => format!("An error occurred: {self}"),
            _ => self.to_string(),
        }
    }

    /// Follow-up line shown under [`LlmError::user_message`].
    pub fn hint(&self) -> &'static str {
        if self.is_api_error() || *self == Self::MissingApiKey {
            API_KEY_HINT
        } else {
            GENERIC_HINT
        }
    }
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

pub trait LlmProvider {
    fn generate(
        &self,
        request: ChatRequest,
    ) -> impl std::future::Future<Output = LlmResult<ChatResponse>> + Send;
}
