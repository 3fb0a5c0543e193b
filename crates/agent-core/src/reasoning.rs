//! Agent Loop
//!
//! Each iteration builds a prompt, asks the [`ResponseGenerator`] for one tool
//! call, resolves it against the agent's registry view, executes it through the
//! [`Environment`] and records the exchange in [`Memory`].
//!
//! ```text
//!            ┌──────────────────────── Running(n) ◄──────────────┐
//!            │                             │                     │
//!   budget spent?──yes──► Exhausted        │ correction /        │ tool executed
//!            │                             │ first-action guard  │ (non-terminal)
//!            ▼                             │                     │
//!   prompt → generate → parse → resolve ───┴──► execute ─────────┤
//!                                                 │              │
//!                                            terminal tool ──► Terminated
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::Instrument;

use crate::environment::Environment;
use crate::error::{AgentError, Result};
use crate::goal::Goal;
use crate::language::AgentLanguage;
use crate::message::{Memory, Role};
use crate::provider::ResponseGenerator;
use crate::tool::ToolRegistry;

/// What to do when the model names a tool outside the agent's view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownToolPolicy {
    /// Append a system correction and let the next iteration self-correct
    #[default]
    Correct,
    /// End the run with [`AgentError::UnknownTool`]
    Fail,
}

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum number of model calls per run
    pub max_iterations: usize,

    /// Handling of hallucinated tool names
    pub unknown_tool_policy: UnknownToolPolicy,

    /// Only the earliest `n` turns go into each prompt
    pub memory_limit: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            unknown_tool_policy: UnknownToolPolicy::default(),
            memory_limit: None,
        }
    }
}

impl AgentConfig {
    /// Defaults overridden by `AGENT_MAX_ITERATIONS` when set
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("AGENT_MAX_ITERATIONS") {
            config.max_iterations = raw.trim().parse().map_err(|_| {
                AgentError::Config(format!(
                    "AGENT_MAX_ITERATIONS must be a non-negative integer, got '{raw}'"
                ))
            })?;
        }
        Ok(config)
    }
}

/// Why a run stopped on purpose
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The model chose this terminal tool
    TerminalTool(String),
}

/// Loop state between iterations
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// `iteration_count` tools have been executed so far
    Running { iteration_count: usize },
    Terminated(TerminationReason),
    Exhausted,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running { .. } => f.write_str("RUNNING"),
            Self::Terminated(_) => f.write_str("TERMINATED"),
            Self::Exhausted => f.write_str("EXHAUSTED"),
        }
    }
}

/// Result of a completed run. The transcript stays in the caller's [`Memory`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// `Terminated` or `Exhausted`
    pub state: LoopState,

    /// Iterations in which a tool was executed, excluding a final terminal call
    pub iteration_count: usize,

    /// Budget spent
    pub model_calls: usize,
}

impl RunOutcome {
    pub const fn is_terminated(&self) -> bool {
        matches!(self.state, LoopState::Terminated(_))
    }

    pub const fn is_exhausted(&self) -> bool {
        matches!(self.state, LoopState::Exhausted)
    }
}

/// Outcome plus the memory it was produced in
#[derive(Clone, Debug)]
pub struct AgentRun {
    pub outcome: RunOutcome,
    pub memory: Memory,
}

const FIRST_ACTION_CORRECTION: &str = "Termination is not allowed as the first action. \
     Use one of the available tools to make progress before terminating.";

/// The main Agent struct
pub struct Agent {
    goals: Vec<Goal>,
    language: AgentLanguage,
    tools: ToolRegistry,
    generator: Arc<dyn ResponseGenerator>,
    environment: Environment,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    ///
    /// `tools` is the agent's view; it is not modified afterwards.
    pub fn new(
        goals: Vec<Goal>,
        tools: ToolRegistry,
        generator: Arc<dyn ResponseGenerator>,
        environment: Environment,
        config: AgentConfig,
    ) -> Self {
        Self {
            goals,
            language: AgentLanguage::new().with_memory_limit(config.memory_limit),
            tools,
            generator,
            environment,
            config,
        }
    }

    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Run `task` against the caller's memory.
    ///
    /// On a fatal error the memory keeps every turn appended before the
    /// failing iteration.
    pub async fn run(&self, task: &str, memory: &mut Memory) -> Result<RunOutcome> {
        let span = tracing::info_span!(
            "agent_run",
            run_id = %uuid::Uuid::new_v4(),
            generator = self.generator.name(),
        );

        async move {
            tracing::info!(
                max_iterations = self.config.max_iterations,
                tools = ?self.tools.names(),
                "starting run"
            );
            memory.append(Role::User, task);

            let mut iteration_count = 0;
            let mut model_calls = 0;
            let state = loop {
                if model_calls >= self.config.max_iterations {
                    tracing::info!(model_calls, iteration_count, "iteration budget exhausted");
                    break LoopState::Exhausted;
                }
                model_calls += 1;

                match self.step(memory, iteration_count).await? {
                    LoopState::Running { iteration_count: next } => iteration_count = next,
                    done => break done,
                }
            };

            tracing::info!(?state, iteration_count, model_calls, "run finished");
            Ok::<_, AgentError>(RunOutcome {
                state,
                iteration_count,
                model_calls,
            })
        }
        .instrument(span)
        .await
    }

    /// Run `task` in a fresh memory and return both.
    pub async fn run_task(&self, task: &str) -> Result<AgentRun> {
        let mut memory = Memory::new();
        let outcome = self.run(task, &mut memory).await?;
        Ok(AgentRun { outcome, memory })
    }

    /// One iteration from `Running { iteration_count }`.
    ///
    /// Returns the next state; errors are fatal to the run.
    pub async fn step(&self, memory: &mut Memory, iteration_count: usize) -> Result<LoopState> {
        let prompt =
            self.language
                .build_prompt(&self.goals, &self.tools, memory, &self.environment);
        tracing::debug!(
            iteration_count,
            messages = prompt.messages.len(),
            "prompting model"
        );

        let response = self
            .generator
            .generate(&prompt)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "response generation failed"))?;
        let issued = response.as_text();

        let invocation = self
            .language
            .parse_response(response)
            .inspect_err(|e| tracing::error!(error = %e, "unparseable model response"))?;

        let tool = match self.tools.resolve(&invocation.tool) {
            Ok(tool) => tool,
            Err(err) if self.config.unknown_tool_policy == UnknownToolPolicy::Fail => {
                tracing::error!(tool = %invocation.tool, "model chose an unknown tool");
                return Err(err);
            }
            Err(_) => {
                tracing::warn!(tool = %invocation.tool, "model chose an unknown tool, correcting");
                memory.append(
                    Role::System,
                    format!(
                        "Unknown tool '{}'. Choose one of the available tools: {}.",
                        invocation.tool,
                        self.tools.names().join(", ")
                    ),
                );
                return Ok(LoopState::Running { iteration_count });
            }
        };

        if tool.is_terminal() && iteration_count == 0 {
            tracing::warn!(tool = tool.name(), "refusing termination as first action");
            memory.append(Role::System, FIRST_ACTION_CORRECTION);
            return Ok(LoopState::Running { iteration_count });
        }

        tracing::debug!(tool = tool.name(), "executing tool");
        let envelope = self.environment.execute(&tool, invocation.args).await;

        memory.append(Role::Assistant, issued);
        memory.append_serialized(Role::User, &envelope)?;

        if tool.is_terminal() {
            tracing::info!(tool = tool.name(), "agent requested termination");
            return Ok(LoopState::Terminated(TerminationReason::TerminalTool(
                tool.name().to_owned(),
            )));
        }

        Ok(LoopState::Running {
            iteration_count: iteration_count + 1,
        })
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Get the tool registry view
    pub const fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
#[derive(Default)]
pub struct AgentBuilder {
    goals: Vec<Goal>,
    generator: Option<Arc<dyn ResponseGenerator>>,
    tools: ToolRegistry,
    view: Vec<String>,
    environment: Environment,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    #[must_use]
    pub fn goals(mut self, goals: impl IntoIterator<Item = Goal>) -> Self {
        self.goals.extend(goals);
        self
    }

    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn ResponseGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Restrict the agent to tools carrying any of `tags`
    #[must_use]
    pub fn view<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.view = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub const fn unknown_tool_policy(mut self, policy: UnknownToolPolicy) -> Self {
        self.config.unknown_tool_policy = policy;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let generator = self
            .generator
            .ok_or_else(|| AgentError::Config("Response generator is required".into()))?;

        let tools = self.tools.view(self.view);
        if tools.is_empty() {
            return Err(AgentError::Config("Agent has no visible tools".into()));
        }

        Ok(Agent::new(
            self.goals,
            tools,
            generator,
            self.environment,
            self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.unknown_tool_policy, UnknownToolPolicy::Correct);
        assert!(config.memory_limit.is_none());
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(LoopState::Running { iteration_count: 3 }.to_string(), "RUNNING");
        assert_eq!(
            LoopState::Terminated(TerminationReason::TerminalTool("terminate".into())).to_string(),
            "TERMINATED"
        );
        assert_eq!(LoopState::Exhausted.to_string(), "EXHAUSTED");
    }

    #[test]
    fn test_builder_requires_generator() {
        let err = Agent::builder().build().err().unwrap();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
