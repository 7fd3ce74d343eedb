//! Schema-checked invocation of an external text-generation service.
//!
//! The [`Invoker`] owns an injected [`GenerationService`] and runs one
//! [`PromptSpec`] at a time:
//!
//! 1. validate the caller's input against the prompt's input schema;
//! 2. render the template;
//! 3. send one request asking for output shaped like the output schema
//!    (transient transport failures may be retried per [`RetryConfig`]);
//! 4. extract a JSON object from the reply text;
//! 5. validate it against the output schema and hand back the typed value.
//!
//! The reply is untrusted until step 5 succeeds. A call produces exactly one
//! value or one [`FlowError`], never a partially valid output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, trace};

use crate::api::retry::{RetryConfig, retry_transient};
use crate::error::{Constraint, FlowError, TransportError, ValidationError};
use crate::prompt::PromptSpec;
use crate::schema::ValidatedValue;
use crate::{
    ChatRequest, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, Message, OpenRouterClient, Plugin, ResponseFormat,
};

/// Outcome of one invocation: a schema-conforming value or a failure.
pub type InvocationResult<T = ValidatedValue> = Result<T, FlowError>;

/// Boxed future returned by [`GenerationService::generate`].
pub type GenerationFuture<'a> = Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + 'a>>;

/// Everything a service needs to produce one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Name of the prompt, used as the structured-output label.
    pub prompt_name: String,
    /// Rendered prompt text.
    pub prompt: String,
    /// JSON Schema of the desired reply.
    pub output_schema: Value,
    /// Whether every property of `output_schema` is required.
    pub strict: bool,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    /// The structured-output format asking for a reply shaped like
    /// `output_schema`.
    pub fn response_format(&self) -> ResponseFormat {
        ResponseFormat::json_schema(self.prompt_name.clone(), self.output_schema.clone())
            .with_strict(self.strict)
    }
}

/// An external text-generation service.
///
/// Implementations return the raw reply text. The invoker does all parsing
/// and validation, so a service never needs to trust or inspect the content.
pub trait GenerationService: Send + Sync {
    fn generate(&self, request: GenerationRequest) -> GenerationFuture<'_>;
}

impl GenerationService for OpenRouterClient {
    fn generate(&self, request: GenerationRequest) -> GenerationFuture<'_> {
        Box::pin(async move {
            let response_format = request.response_format();
            let plugins: Vec<Plugin> = self.plugins.clone();
            let body = ChatRequest {
                model: Some(request.model),
                messages: vec![Message::user(request.prompt)],
                max_tokens: request.max_tokens,
                temperature: request.temperature,
                response_format: Some(response_format),
                plugins: if plugins.is_empty() { None } else { Some(plugins) },
                ..Default::default()
            };

            let completion = self.chat(&body).await?;
            completion
                .content
                .filter(|c| !c.trim().is_empty())
                .ok_or(TransportError::EmptyReply)
        })
    }
}

impl<S: GenerationService + ?Sized> GenerationService for Arc<S> {
    fn generate(&self, request: GenerationRequest) -> GenerationFuture<'_> {
        (**self).generate(request)
    }
}

type ErasedHandler = dyn Fn(GenerationRequest) -> GenerationFuture<'static> + Send + Sync;

/// A service backed by a closure. Used as a stub in tests and demos.
///
/// ```
/// use saathi_rs::invoker::FnService;
///
/// let service = FnService::reply(r#"{"moment": "Breathe in slowly."}"#);
/// ```
pub struct FnService {
    handler: Box<ErasedHandler>,
}

impl FnService {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(GenerationRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, TransportError>> + Send + 'static,
    {
        Self {
            handler: Box::new(move |request| Box::pin(handler(request))),
        }
    }

    /// Always reply with `text`.
    pub fn reply(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| {
            let text = text.clone();
            async move { Ok(text) }
        })
    }

    /// Always reply with `value` serialized as JSON.
    pub fn json(value: Value) -> Self {
        Self::reply(value.to_string())
    }

    /// Always fail with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self::new(move |_| {
            let error = error.clone();
            async move { Err(error) }
        })
    }
}

impl GenerationService for FnService {
    fn generate(&self, request: GenerationRequest) -> GenerationFuture<'_> {
        (self.handler)(request)
    }
}

impl std::fmt::Debug for FnService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnService").finish_non_exhaustive()
    }
}

/// Generation settings applied to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokerConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub retry: RetryConfig,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.7,
            retry: RetryConfig::default(),
        }
    }
}

/// Renders prompts, calls the service, and validates replies.
///
/// Holds no per-call state; concurrent invocations share nothing but the
/// service handle.
#[derive(Clone)]
pub struct Invoker {
    service: Arc<dyn GenerationService>,
    config: InvokerConfig,
}

impl Invoker {
    pub fn new(service: impl GenerationService + 'static, config: InvokerConfig) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Send an already rendered prompt and validate the reply against
    /// `spec`'s output schema.
    pub async fn invoke(&self, spec: &PromptSpec, rendered: &str) -> InvocationResult {
        let output_schema = spec.output_schema();
        let request = GenerationRequest {
            prompt_name: spec.name().to_string(),
            prompt: rendered.to_string(),
            output_schema: output_schema.to_json_schema(),
            strict: output_schema.all_required(),
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        trace!("{} prompt ({} chars)", spec.name(), rendered.len());

        let start = Instant::now();
        let text = retry_transient(&self.config.retry, || self.service.generate(request.clone()))
            .await
            .map_err(|source| FlowError::Transport {
                flow: spec.name().to_string(),
                source,
            })?;
        debug!(
            "{} reply: {} chars in {:.1}s",
            spec.name(),
            text.len(),
            start.elapsed().as_secs_f64()
        );

        let invalid_reply = |source: ValidationError| FlowError::InvalidReply {
            flow: spec.name().to_string(),
            source,
        };
        let value = parse_reply(&text).map_err(invalid_reply)?;
        output_schema.validate(&value).map_err(invalid_reply)
    }

    /// Validate `input`, render `spec`, and invoke it.
    pub async fn run(&self, spec: &PromptSpec, input: &Value) -> InvocationResult {
        let span = info_span!("flow", name = spec.name());
        async {
            let request = spec.request(input).map_err(|source| FlowError::InvalidInput {
                flow: spec.name().to_string(),
                source,
            })?;
            let rendered = request.render();
            let result = self.invoke(spec, &rendered).await;
            match &result {
                Ok(_) => info!("{} succeeded", spec.name()),
                Err(e) => debug!("{} failed: {e}", spec.name()),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Typed wrapper around [`run`](Self::run).
    pub async fn run_typed<I, O>(&self, spec: &PromptSpec, input: &I) -> InvocationResult<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let input = serde_json::to_value(input).map_err(|e| FlowError::InvalidInput {
            flow: spec.name().to_string(),
            source: ValidationError::root(Constraint::Malformed(e.to_string())),
        })?;
        self.run(spec, &input)
            .await?
            .into_typed()
            .map_err(|source| FlowError::InvalidReply {
                flow: spec.name().to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Read a model reply as JSON.
///
/// Accepts a bare JSON document, a ```json fenced block, or an object
/// embedded in surrounding prose (first `{` to last `}`).
pub fn parse_reply(text: &str) -> Result<Value, ValidationError> {
    let t = text.trim().trim_start_matches('\u{feff}');

    if let Ok(v) = serde_json::from_str::<Value>(t) {
        return Ok(v);
    }

    for fence in ["```json", "```"] {
        if let Some((_, after)) = t.split_once(fence)
            && let Some((block, _)) = after.split_once("```")
            && let Ok(v) = serde_json::from_str::<Value>(block.trim())
        {
            return Ok(v);
        }
    }

    if let (Some(i), Some(j)) = (t.find('{'), t.rfind('}'))
        && i < j
        && let Some(slice) = t.get(i..=j)
        && let Ok(v) = serde_json::from_str::<Value>(slice)
    {
        return Ok(v);
    }

    let preview: String = t.chars().take(80).collect();
    Err(ValidationError::root(Constraint::Malformed(format!(
        "no JSON object in reply: {preview:?}"
    ))))
}
