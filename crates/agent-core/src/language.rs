//! Agent Language
//!
//! Translates goals, tools, memory and environment into a [`Prompt`], and a
//! model response back into an [`Invocation`]. [`AgentLanguage::parse_response`]
//! is the only place model output is validated before it can steer the loop.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::{AgentError, Result};
use crate::goal::{self, Goal};
use crate::message::{Memory, Turn};
use crate::provider::ModelResponse;
use crate::tool::{Arguments, Invocation, ToolRegistry, ToolSchema};

const CONTRACT: &str = r#"You are an autonomous agent.
YOU MUST ALWAYS return a JSON OBJECT containing exactly two fields:

1. "tool": the name of the tool to call (string)
2. "args": the argument object for that tool (object)

VALID FORMAT (MANDATORY):
{"tool": "<tool_name>", "args": {"param1": "...", "param2": "..."}}

Rules:
- NEVER return anything except this JSON.
- NEVER add explanations, markdown, code fences or natural language.
- NEVER call more than one tool per response.
- ONLY use tools provided in the tool list. NEVER invent tool names.
- Wait for the environment's result before choosing the next tool."#;

/// One prompt, built fresh for every iteration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub system: String,
    pub messages: Vec<Turn>,
    pub tools: Vec<ToolSchema>,
}

impl Prompt {
    /// System turn followed by the transcript
    pub fn to_messages(&self) -> Vec<Turn> {
        std::iter::once(Turn::system(self.system.as_str()))
            .chain(self.messages.iter().cloned())
            .collect()
    }
}

/// Wire shape of a raw-text tool call
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireInvocation {
    tool: String,
    args: Arguments,
}

/// Prompt construction and response parsing
#[derive(Clone, Debug, Default)]
pub struct AgentLanguage {
    memory_limit: Option<usize>,
}

impl AgentLanguage {
    pub const fn new() -> Self {
        Self { memory_limit: None }
    }

    /// Include only the earliest `limit` turns in each prompt.
    #[must_use]
    pub const fn with_memory_limit(mut self, limit: Option<usize>) -> Self {
        self.memory_limit = limit;
        self
    }

    pub fn build_prompt(
        &self,
        goals: &[Goal],
        tools: &ToolRegistry,
        memory: &Memory,
        environment: &Environment,
    ) -> Prompt {
        Prompt {
            system: Self::system_message(goals, environment),
            messages: memory.read(self.memory_limit).to_vec(),
            tools: tools.schema(),
        }
    }

    /// Deterministic system text: the call contract, goals and environment
    pub fn system_message(goals: &[Goal], environment: &Environment) -> String {
        let goals_text = goal::ordered(goals)
            .into_iter()
            .map(Goal::render)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{CONTRACT}\n\nYour goals:\n{goals_text}\n\nEnvironment: {}",
            environment.name()
        )
    }

    /// Turn one model response into an invocation, or refuse it.
    pub fn parse_response(&self, response: ModelResponse) -> Result<Invocation> {
        match response {
            ModelResponse::StructuredInvocation(invocation) => {
                if invocation.tool.trim().is_empty() {
                    return Err(AgentError::MalformedResponse(
                        "structured invocation has an empty tool name".into(),
                    ));
                }
                Ok(invocation)
            }
            ModelResponse::RawText(text) => Self::parse_text(&text),
        }
    }

    fn parse_text(text: &str) -> Result<Invocation> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            AgentError::MalformedResponse(format!("invalid JSON returned by model ({e}): {text}"))
        })?;

        let Some(object) = value.as_object() else {
            return Err(AgentError::MalformedResponse(format!(
                "expected a JSON object: {text}"
            )));
        };
        if !object.contains_key("tool") || !object.contains_key("args") {
            return Err(AgentError::MalformedResponse(format!(
                "response missing required fields ('tool', 'args'): {text}"
            )));
        }

        let wire: WireInvocation = serde_json::from_value(value).map_err(|e| {
            AgentError::MalformedResponse(format!("invalid tool call ({e}): {text}"))
        })?;

        Ok(Invocation::new(wire.tool, wire.args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::tool::{ParamType, Tool};
    use serde_json::{Value, json};

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                Tool::builder("read_file")
                    .description("Read the contents of a specific file")
                    .param("file_name", ParamType::String, "File to read")
                    .handler(|_| async { Ok(Value::Null) })
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_build_prompt() {
        let goals = vec![
            Goal::new(2, "Terminate", "Stop when done"),
            Goal::new(1, "file_management", "Manage files"),
        ];
        let mut memory = Memory::new();
        memory.append(Role::User, "What is in a.txt?");

        let language = AgentLanguage::new();
        let prompt = language.build_prompt(&goals, &registry(), &memory, &Environment::default());

        let first = prompt.system.find("[1] file_management").unwrap();
        let second = prompt.system.find("[2] Terminate").unwrap();
        assert!(first < second);
        assert!(prompt.system.contains("\"tool\""));
        assert!(prompt.system.ends_with("Environment: Environment"));
        assert_eq!(prompt.messages, memory.read(None));
        assert_eq!(prompt.tools.len(), 1);
        assert_eq!(prompt.tools[0].function.name, "read_file");

        let messages = prompt.to_messages();
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_system_message_is_deterministic() {
        let goals = vec![Goal::new(1, "a", "b")];
        let env = Environment::new("Sandbox");
        assert_eq!(
            AgentLanguage::system_message(&goals, &env),
            AgentLanguage::system_message(&goals, &env)
        );
    }

    #[test]
    fn test_memory_limit() {
        let mut memory = Memory::new();
        memory.append(Role::User, "one");
        memory.append(Role::User, "two");

        let language = AgentLanguage::new().with_memory_limit(Some(1));
        let prompt = language.build_prompt(&[], &registry(), &memory, &Environment::default());
        assert_eq!(prompt.messages.len(), 1);
        assert_eq!(prompt.messages[0].content, "one");
    }

    #[test]
    fn test_parse_raw_text() {
        let language = AgentLanguage::new();
        let invocation = language
            .parse_response(ModelResponse::RawText(
                r#" {"tool": "read_file", "args": {"file_name": "a.txt"}} "#.into(),
            ))
            .unwrap();

        assert_eq!(invocation.tool, "read_file");
        assert_eq!(invocation.args["file_name"], json!("a.txt"));
    }

    #[test]
    fn test_parse_structured_passes_through() {
        let invocation = Invocation::new("terminate", Arguments::new());
        let parsed = AgentLanguage::new()
            .parse_response(ModelResponse::StructuredInvocation(invocation.clone()))
            .unwrap();
        assert_eq!(parsed, invocation);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let language = AgentLanguage::new();
        let cases = [
            "not json",
            "[1, 2]",
            r#"{"tool": "read_file"}"#,
            r#"{"args": {}}"#,
            r#"{"tool": 7, "args": {}}"#,
            r#"{"tool": "read_file", "args": "a.txt"}"#,
            r#"{"tool": "read_file", "args": {}, "reason": "because"}"#,
            "```json\n{\"tool\": \"read_file\", \"args\": {}}\n```",
        ];

        for case in cases {
            let result = language.parse_response(ModelResponse::RawText(case.into()));
            assert!(
                matches!(result, Err(AgentError::MalformedResponse(_))),
                "accepted {case:?}"
            );
        }
    }
}
