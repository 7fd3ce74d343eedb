//! Typed prompt flows for the Saathi mental-wellness companion.
//!
//! `saathi-rs` wraps every AI capability of the companion in a narrow, typed
//! entry point. Each capability is a **flow**: a [`PromptSpec`](prompt::PromptSpec)
//! (input schema, output schema, natural-language template) executed by an
//! [`Invoker`](invoker::Invoker) against an external text-generation service.
//! The reply from the model is untrusted: it is parsed and checked against the
//! output schema before a typed value is handed back.
//!
//! ```ignore
//! use saathi_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SaathiConfig::from_env()?;
//!     let flows = Flows::new(config.build_invoker()?)?;
//!
//!     let analysis = flows
//!         .analyze_mood(&MoodAnalysisInput::new("I'm so excited about my new project!"))
//!         .await?;
//!     println!("{} (valence {:.1})", analysis.mood, analysis.valence);
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Describe input/output shapes:** [`schema::ObjectSchema`] and the
//!   single generic validator [`schema::validate`].
//! - **Write prompt templates:** [`template::Template`] (`{{slot}}` syntax) and
//!   [`prompt::PromptSpec`], which checks at declaration time that every slot
//!   is backed by an input field.
//! - **Talk to a model:** implement [`invoker::GenerationService`], or use the
//!   built-in [`OpenRouterClient`]. [`invoker::FnService`] wraps a closure and
//!   is what the tests use as a stub.
//! - **Call the six flows:** [`flows::Flows`].
//! - **Build the companion on top:** [`companion`] holds the caller-side
//!   policies (crisis threshold, mood table, journal pipeline, resilience tree,
//!   mood trend, self-help content).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`schema`] | Tagged schema descriptors and the validator |
//! | [`template`] | Slot parsing and plain-text rendering |
//! | [`prompt`] | [`PromptSpec`](prompt::PromptSpec) declaration and definition-time checks |
//! | [`invoker`] | Service trait, reply parsing, schema-checked invocation |
//! | [`flows`] | The six concrete flows and their registry |
//! | [`companion`] | Chat session, journal pipeline, mood trend, tree, resources |
//! | [`api`] | Retry with backoff for transient transport failures |
//! | [`config`] | [`SaathiConfig`](config::SaathiConfig) and environment loading |

pub mod api;
pub mod companion;
pub mod config;
pub mod error;
pub mod flows;
pub mod invoker;
pub mod mood;
pub mod prelude;
pub mod prompt;
pub mod schema;
pub mod template;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::error::TransportError;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for all flows.
pub const DEFAULT_MODEL: &str = "z-ai/glm-5";

/// Default completion budget. Every flow produces a short JSON object.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body. Only the fields the flows use are modeled;
/// unset optional fields are omitted from serialization.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub temperature: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<Plugin>>,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

/// JSON output format type.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ResponseFormatType {
    #[serde(rename = "json_schema")]
    JsonSchema,
}

/// Structured output request: the model is asked to produce an object
/// matching `json_schema.schema`.
#[derive(Serialize, Debug, Clone)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub fmt_type: ResponseFormatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchemaFormat>,
}

impl ResponseFormat {
    /// Request output conforming to `schema`, labelled `name`.
    pub fn json_schema(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            fmt_type: ResponseFormatType::JsonSchema,
            json_schema: Some(JsonSchemaFormat {
                name: name.into(),
                strict: true,
                schema,
            }),
        }
    }

    /// Strict mode requires every property to be listed as required.
    pub fn with_strict(mut self, strict: bool) -> Self {
        if let Some(ref mut format) = self.json_schema {
            format.strict = strict;
        }
        self
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: serde_json::Value,
}

/// OpenRouter plugin configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "id")]
pub enum Plugin {
    /// Auto-repairs truncated or slightly malformed JSON replies.
    #[serde(rename = "response-healing")]
    ResponseHealing,
}

// ── Message types ──────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message in the request.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type from [`OpenRouterClient::chat`].
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
}

/// Token usage statistics, logged per request.
#[derive(Deserialize, Debug)]
struct UsageInfo {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the OpenRouter chat completions API.
///
/// Constructed explicitly and handed to an [`Invoker`](invoker::Invoker);
/// there is no process-wide client.
pub struct OpenRouterClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) referer: String,
    pub(crate) title: String,
    pub(crate) plugins: Vec<Plugin>,
}

impl OpenRouterClient {
    /// Create a new client with the given API key and default headers.
    pub fn new(api_key: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_headers(
            api_key,
            "https://github.com/saathi-ai/saathi-rs",
            "saathi-rs",
            Duration::from_secs(120),
        )
    }

    /// Create a new client with custom Referer / X-Title headers and a
    /// per-request timeout.
    pub fn with_headers(
        api_key: impl Into<String>,
        referer: impl Into<String>,
        title: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("saathi-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            referer: referer.into(),
            title: title.into(),
            plugins: Vec::new(),
        })
    }

    /// Attach a plugin to every request sent by this client.
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        if !self.plugins.contains(&plugin) {
            self.plugins.push(plugin);
        }
        self
    }

    /// Send a chat completion request.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, TransportError> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model.as_deref().unwrap_or("(none)"),
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Request(format!("failed to read response: {e}")))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(TransportError::Service(err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        let choice = parsed.choices.and_then(|c| c.into_iter().next());
        if let Some(ref c) = choice {
            debug!(
                "Finish reason: {}",
                c.finish_reason.as_deref().unwrap_or("(none)")
            );
        }
        Ok(ChatCompletion {
            content: choice.and_then(|c| c.message.content),
        })
    }
}
