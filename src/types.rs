//! Canonical data structures shared by the router and both provider adapters.
//!
//! These types normalize provider-specific payloads so callers interact with a
//! single request/response shape regardless of which backend answers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Conversation role. The canonical model only knows the three chat roles;
/// provider-specific roles are mapped by the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn in a conversation. Order within [`ChatRequest::messages`] is
/// significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chat request shared across both providers.
///
/// Callers build a partial request (every tuning knob optional) and hand it to
/// [`crate::router::UnifyClient`], which fills in the defaults before dispatch:
/// after completion `model` and `temperature` are always set. Optional numeric
/// fields left as `None` are omitted from the backend call, never sent as zero.
///
/// # Examples
///
/// ```
/// use unify_llm::types::{ChatRequest, Message};
///
/// let request = ChatRequest {
///     messages: vec![
///         Message::system("You are concise."),
///         Message::user("Summarize Rust traits."),
///     ],
///     model: Some("gpt-4".to_string()),
///     temperature: Some(0.3),
///     ..Default::default()
/// };
/// assert_eq!(request.messages.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Ordered conversation history.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Model identifier; also drives provider detection in the router.
    pub model: Option<String>,
    /// Sampling temperature; the router defaults this to 0.7.
    pub temperature: Option<f32>,
    /// Maximum number of output tokens.
    pub max_tokens: Option<u32>,
    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,
    /// Discourages repeating identical tokens.
    pub frequency_penalty: Option<f32>,
    /// Encourages the model to talk about new topics.
    pub presence_penalty: Option<f32>,
    /// Whether the caller intends to stream; the router defaults this to false.
    pub stream: Option<bool>,
}

/// Aggregated chat response returned by an adapter for a non-streaming call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    /// Object-kind tag, e.g. `chat.completion`.
    pub object: String,
    /// Unix timestamp of response creation.
    pub created: u64,
    /// Effective model identifier.
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

/// One completion alternative within a [`ChatResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: usize,
    pub message: Message,
    /// Free-form label describing why generation stopped, e.g. `stop`.
    pub finish_reason: String,
}

/// Token usage accounting. Counts are zero when the backend does not report
/// them; that is a known provider limitation, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Incremental piece of a streamed response.
///
/// Adapters emit zero or more content-bearing chunks followed by exactly one
/// terminal chunk whose delta is empty and whose finish reason is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub id: String,
    /// Object-kind tag, e.g. `chat.completion.chunk`.
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

/// One choice inside a [`StreamChunk`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: usize,
    pub delta: MessageDelta,
    pub finish_reason: Option<String>,
}

/// Partial message carried by a stream chunk. Any subset of the fields may be
/// present; content is always the newly produced fragment, never cumulative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageDelta {
    pub role: Option<Role>,
    pub content: Option<String>,
}

impl MessageDelta {
    /// True when the delta carries neither a role nor content, which marks the
    /// terminal chunk of a stream.
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.content.is_none()
    }
}

/// Describes a model known to an adapter, either from a live catalog query or
/// from a hardcoded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: Provider,
    pub max_tokens: Option<u32>,
    pub supports_streaming: bool,
}

/// Closed enumeration of the two backend identities the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
}

impl Provider {
    /// Classifies a model identifier by its literal prefix or substring.
    ///
    /// Pure and total: identifiers matching neither provider family return
    /// `None` so the router can fall back to its configured default.
    ///
    /// # Examples
    ///
    /// ```
    /// use unify_llm::types::Provider;
    ///
    /// assert_eq!(Provider::from_model_id("gpt-4"), Some(Provider::OpenAi));
    /// assert_eq!(Provider::from_model_id("gemini-pro"), Some(Provider::Gemini));
    /// assert_eq!(Provider::from_model_id("unknown-model"), None);
    /// ```
    pub fn from_model_id(model_id: &str) -> Option<Self> {
        if model_id.starts_with("gpt-") || model_id.contains("openai") {
            return Some(Self::OpenAi);
        }
        if model_id.starts_with("gemini-") || model_id.contains("gemini") {
            return Some(Self::Gemini);
        }
        None
    }

    /// Static default model used when neither the request nor the
    /// configuration names one.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Gemini => "gemini-pro",
        }
    }

    /// Lowercase provider tag as it appears in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
