//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Tool execution faults never leave the
/// [`Environment`](crate::environment::Environment); they reach the loop as a
/// [`ResultEnvelope`](crate::environment::ResultEnvelope).
#[derive(Error, Debug)]
pub enum AgentError {
    /// A tool with this name is already registered
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// Tag-based registration of a tool without tags
    #[error("Tool '{0}' must have at least one tag")]
    MissingTag(String),

    /// Invocation names a tool outside the agent's visible registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The response generator failed to produce a response
    #[error("Generation error: {0}")]
    Generation(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Rate limited by the provider
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication against the provider failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Model output does not conform to the `{"tool", "args"}` contract
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Errors raised while registering tools. Fatal at startup, never retried.
    pub const fn is_registration(&self) -> bool {
        matches!(self, Self::DuplicateTool(_) | Self::MissingTag(_))
    }

    /// Errors originating at the response-generation boundary.
    pub const fn is_generation(&self) -> bool {
        matches!(
            self,
            Self::Generation(_)
                | Self::ProviderUnavailable(_)
                | Self::RateLimited(_)
                | Self::Auth(_)
        )
    }

    /// Check if an external caller may reasonably retry the whole run.
    ///
    /// The loop itself never retries.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Io(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::DuplicateTool(name) => format!("The tool '{name}' is registered twice."),
            Self::MissingTag(name) => format!("The tool '{name}' needs at least one tag."),
            Self::UnknownTool(name) => format!("The model asked for an unknown tool '{name}'."),
            Self::Generation(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::RateLimited(_) => "Too many requests. Please wait a moment.".into(),
            Self::Auth(_) => "Authentication failed. Please check your API key.".into(),
            Self::MalformedResponse(_) => {
                "The model returned a response that is not a valid tool call.".into()
            }
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
