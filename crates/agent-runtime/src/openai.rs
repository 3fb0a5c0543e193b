//! OpenAI-compatible Response Generator
//!
//! Implementation of `ResponseGenerator` for any `/chat/completions` endpoint
//! that speaks the OpenAI function-calling dialect (OpenAI, Groq, Portkey,
//! vLLM, LM Studio, ...).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    language::Prompt,
    provider::{GenerationOptions, ModelResponse, ResponseGenerator, ToolChoice},
    tool::{Arguments, Invocation},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

/// Tool-calling models on Groq, best first
const GROQ_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "meta-llama/llama-4-scout-17b-16e-instruct",
    "llama-3.1-8b-instant",
    "qwen/qwen3-32b",
    "meta-llama/llama-4-maverick-17b-128e-instruct",
];

const PORTKEY_MODELS: &[&str] = &["gpt-4o-mini"];

/// Hosted backend presets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Provider {
    /// Groq, bearer auth, `tool_choice = auto` with a JSON-in-content fallback
    #[default]
    Groq,
    /// Portkey gateway, `x-portkey-*` headers, `tool_choice = required`
    Portkey,
}

impl Provider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Portkey => "portkey",
        }
    }

    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Portkey => "https://api.portkey.ai/v1",
        }
    }

    /// Models suited for tool calling, in order of preference
    pub const fn preferred_models(self) -> &'static [&'static str] {
        match self {
            Self::Groq => GROQ_MODELS,
            Self::Portkey => PORTKEY_MODELS,
        }
    }

    pub const fn default_model(self) -> &'static str {
        self.preferred_models()[0]
    }

    pub const fn default_tool_choice(self) -> ToolChoice {
        match self {
            Self::Groq => ToolChoice::Auto,
            Self::Portkey => ToolChoice::Required,
        }
    }

    /// Provider-specific variable holding the API key
    const fn key_var(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::Portkey => "PORTKEY_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "portkey" => Ok(Self::Portkey),
            other => Err(AgentError::Config(format!(
                "unsupported LLM provider '{other}' (expected groq or portkey)"
            ))),
        }
    }
}

/// Endpoint configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// Backend preset; decides auth headers and defaults
    pub provider: Provider,

    /// Base URL without the `/chat/completions` suffix
    pub base_url: String,

    /// API key; empty for unauthenticated local gateways
    pub api_key: String,

    /// Portkey virtual key naming the upstream provider credentials
    pub virtual_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Model and sampling options
    pub options: GenerationOptions,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self::for_provider(Provider::default())
    }
}

impl OpenAiConfig {
    /// Preset defaults for `provider`, without credentials
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            base_url: provider.base_url().into(),
            api_key: String::new(),
            virtual_key: String::new(),
            timeout_secs: 120,
            options: GenerationOptions {
                model: provider.default_model().into(),
                tool_choice: provider.default_tool_choice(),
                ..GenerationOptions::default()
            },
        }
    }

    /// Read configuration from the environment.
    ///
    /// `LLM_PROVIDER` picks the preset (default `groq`). `LLM_BASE_URL`,
    /// `LLM_API_KEY` (or `GROQ_API_KEY` / `PORTKEY_API_KEY`),
    /// `PORTKEY_VIRTUAL_KEY`, `LLM_MODEL`, `LLM_TOOL_CHOICE` and
    /// `LLM_TIMEOUT_SECS` override it.
    pub fn from_env() -> Result<Self> {
        Self::from_env_as(None)
    }

    /// Like [`from_env`](Self::from_env), with `provider` taking precedence
    /// over `LLM_PROVIDER`.
    pub fn from_env_as(provider: Option<Provider>) -> Result<Self> {
        let provider = match provider {
            Some(provider) => provider,
            None => std::env::var("LLM_PROVIDER")
                .ok()
                .map(|raw| raw.parse())
                .transpose()?
                .unwrap_or_default(),
        };
        let mut config = Self::for_provider(provider);

        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            config.base_url = base_url;
        }
        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        config.api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var(provider.key_var()))
            .unwrap_or_default();
        config.virtual_key = std::env::var("PORTKEY_VIRTUAL_KEY").unwrap_or_default();
        if let Ok(raw) = std::env::var("LLM_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                AgentError::Config(format!("LLM_TIMEOUT_SECS must be an integer, got '{raw}'"))
            })?;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.options.model = model;
        }
        if let Ok(raw) = std::env::var("LLM_TOOL_CHOICE") {
            config.options.tool_choice = raw.parse()?;
        }

        Ok(config)
    }
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiConfig::from_env()?)
    }

    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Authenticated POST for one prompt
    fn request(&self, prompt: &Prompt) -> reqwest::RequestBuilder {
        let body = Self::request_body(prompt, &self.config.options);
        let mut request = self.client.post(self.endpoint()).json(&body);

        match self.config.provider {
            Provider::Groq => {
                if !self.config.api_key.is_empty() {
                    request = request.bearer_auth(&self.config.api_key);
                }
            }
            Provider::Portkey => {
                request = request.header("x-portkey-api-key", &self.config.api_key);
                if !self.config.virtual_key.is_empty() {
                    request = request.header("x-portkey-virtual-key", &self.config.virtual_key);
                }
            }
        }

        request
    }

    /// Build the request payload for one prompt
    fn request_body(prompt: &Prompt, options: &GenerationOptions) -> Value {
        let mut body = json!({
            "model": options.model,
            "messages": prompt.to_messages(),
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
        });

        if !prompt.tools.is_empty() {
            body["tools"] = json!(prompt.tools);
            body["tool_choice"] = json!(options.tool_choice);
        }

        body
    }

    /// Convert the first choice into a model response.
    ///
    /// A native tool call wins; otherwise the text content is passed on for
    /// the agent language to validate.
    fn convert_completion(completion: ChatCompletion) -> Result<ModelResponse> {
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Generation("response contained no choices".into()))?;

        if let Some(call) = choice.message.tool_calls.unwrap_or_default().into_iter().next() {
            let args = decode_arguments(&call.function.arguments)?;
            return Ok(ModelResponse::StructuredInvocation(Invocation::new(
                call.function.name,
                args,
            )));
        }

        Ok(ModelResponse::RawText(
            choice.message.content.unwrap_or_default(),
        ))
    }
}

fn decode_arguments(raw: &str) -> Result<Arguments> {
    if raw.trim().is_empty() {
        return Ok(Arguments::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| AgentError::Generation(format!("undecodable tool arguments ({e}): {raw}")))
}

fn status_error(status: StatusCode, body: &str) -> AgentError {
    let detail = format!("{status}: {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
        s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
        _ => AgentError::Generation(detail),
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[async_trait]
impl ResponseGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<ModelResponse> {
        let request = self.request(prompt);

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                AgentError::ProviderUnavailable(e.to_string())
            } else {
                AgentError::Generation(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AgentError::Generation(format!("unreadable response body: {e}")))?;

        let converted = Self::convert_completion(completion)?;
        tracing::debug!(
            model = %self.config.options.model,
            structured = matches!(converted, ModelResponse::StructuredInvocation(_)),
            "model responded"
        );
        Ok(converted)
    }

    fn name(&self) -> &str {
        &self.config.options.model
    }
}
