//! Execution Boundary
//!
//! The [`Environment`] runs one tool call and always returns a
//! [`ResultEnvelope`]. Handler errors, argument mismatches, panics and
//! timeouts are all captured here; none of them reach the agent loop.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::tool::{Arguments, Tool};

/// Uniform outcome of a tool execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Whether the handler ran to completion
    #[serde(rename = "tool_executed")]
    pub executed: bool,

    /// Handler output (present iff `executed`); a `null` output stays `Some(Value::Null)`
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,

    /// Human-readable fault (present iff not `executed`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Diagnostic detail for operators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,

    /// Completion time of a successful call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ResultEnvelope {
    pub fn success(result: Value) -> Self {
        Self {
            executed: true,
            result: Some(result),
            error: None,
            traceback: None,
            timestamp: Some(chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%z").to_string()),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            executed: false,
            result: None,
            error: Some(error.into()),
            traceback: None,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
        self.traceback = Some(traceback.into());
        self
    }
}

/// A key that is present decodes to `Some`, even when its value is `null`.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Executes tool handlers with fault isolation
#[derive(Clone, Debug)]
pub struct Environment {
    name: String,
    timeout: Option<Duration>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("Environment")
    }
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout: None,
        }
    }

    /// Bound every handler call; an elapsed call becomes a failed envelope.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Descriptor shown to the model in the system prompt
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `tool` with `args`.
    pub async fn execute(&self, tool: &Tool, args: Arguments) -> ResultEnvelope {
        if let Err(mismatch) = check_arguments(tool, &args) {
            tracing::warn!(tool = tool.name(), %mismatch, "argument mismatch");
            return ResultEnvelope::failure(mismatch);
        }

        let call = AssertUnwindSafe(tool.handler().call(args)).catch_unwind();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(tool = tool.name(), ?limit, "tool timed out");
                    return ResultEnvelope::failure(format!(
                        "{}() timed out after {limit:?}",
                        tool.name()
                    ));
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(Ok(result)) => ResultEnvelope::success(result),
            Ok(Err(err)) => {
                tracing::warn!(tool = tool.name(), error = %err, "tool failed");
                ResultEnvelope::failure(err.to_string()).with_traceback(format!("{err:?}"))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(tool = tool.name(), %message, "tool panicked");
                ResultEnvelope::failure(format!("{}() panicked: {message}", tool.name()))
            }
        }
    }
}

/// Reject calls that would not bind to the handler's declared parameters.
fn check_arguments(tool: &Tool, args: &Arguments) -> Result<(), String> {
    if let Some(missing) = tool
        .required_params()
        .into_iter()
        .find(|name| !args.contains_key(*name))
    {
        return Err(format!(
            "{}() missing required argument: '{missing}'",
            tool.name()
        ));
    }

    if let Some(declared) = tool.declared_params() {
        if let Some(unexpected) = args.keys().find(|k| !declared.contains(&k.as_str())) {
            return Err(format!(
                "{}() got an unexpected argument '{unexpected}'",
                tool.name()
            ));
        }
    }

    Ok(())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}
