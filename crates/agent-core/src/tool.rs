//! Tool System
//!
//! Tools are declared once at startup with [`Tool::builder`], collected into a
//! [`ToolRegistry`], and narrowed per agent role with [`ToolRegistry::view`].
//! After that the registry is read-only for the lifetime of a run.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{AgentError, Result};

/// Arguments of a tool call, keyed by parameter name
pub type Arguments = Map<String, Value>;

/// A single tool call chosen by the model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Tool identifier
    pub tool: String,

    /// Arguments as key-value pairs
    pub args: Arguments,
}

impl Invocation {
    pub fn new(tool: impl Into<String>, args: Arguments) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }

    /// Canonical JSON text, as recorded in the assistant turn
    pub fn to_json(&self) -> String {
        json!({"tool": self.tool, "args": self.args}).to_string()
    }
}

/// JSON Schema primitive types allowed for tool parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// Parameter definition for hand-declared tool schemas
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type
    #[serde(rename = "type")]
    pub param_type: ParamType,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

/// Render a parameter list into an object schema:
/// `{"type": "object", "properties": {..}, "required": [..]}`.
pub fn object_schema(params: &[ParameterSchema]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in params {
        let mut property = Map::new();
        property.insert("type".into(), json!(param.param_type));
        if let Some(description) = &param.description {
            property.insert("description".into(), json!(description));
        }
        properties.insert(param.name.clone(), Value::Object(property));

        if param.required {
            required.push(json!(param.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Derive an object schema from a typed argument struct.
///
/// Runs once per tool at build time. `Option` fields come out as optional and
/// doc comments become descriptions. Root-level annotations are dropped so the
/// result matches a hand-written declaration.
pub fn infer_schema<A: schemars::JsonSchema>() -> Value {
    let mut schema = schemars::schema_for!(A).to_value();
    if let Value::Object(root) = &mut schema {
        root.remove("$schema");
        root.remove("title");
        root.remove("description");
        root.entry("properties").or_insert_with(|| json!({}));
        root.entry("required").or_insert_with(|| json!([]));
    }
    schema
}

/// Function-calling schema exposed to the model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Always `"function"`
    #[serde(rename = "type")]
    pub kind: String,

    pub function: FunctionSchema,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Executable part of a tool
///
/// Handlers signal failure by returning `Err`; they must not swallow faults
/// into a successful value.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value>;
}

/// Handler over the raw argument map
struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        (self.0)(args).await
    }
}

/// Handler that deserializes its arguments into `A` and serializes its output
struct TypedHandler<A, F> {
    f: F,
    _args: PhantomData<fn(A)>,
}

#[async_trait]
impl<A, F, Fut, R> ToolHandler for TypedHandler<A, F>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    R: Serialize + Send + 'static,
{
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let args: A =
            serde_json::from_value(Value::Object(args)).context("argument mismatch")?;
        let output = (self.f)(args).await?;
        Ok(serde_json::to_value(output)?)
    }
}

/// A named, schema-described callable the model may invoke
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    parameters: Value,
    terminal: bool,
    tags: BTreeSet<String>,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn builder(name: impl Into<String>) -> ToolBuilder {
        ToolBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// JSON-Schema-like object describing the accepted arguments
    pub const fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Whether choosing this tool ends the run
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_any_tag(&self, tags: &BTreeSet<String>) -> bool {
        !self.tags.is_disjoint(tags)
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// Names listed under `required` in the parameter schema
    pub fn required_params(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Names listed under `properties`, or `None` when the schema declares none
    pub fn declared_params(&self) -> Option<Vec<&str>> {
        self.parameters
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
    }

    pub fn schema(&self) -> ToolSchema {
        ToolSchema {
            kind: "function".into(),
            function: FunctionSchema {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: self.parameters.clone(),
            },
        }
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("terminal", &self.terminal)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Tool {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.parameters == other.parameters
            && self.terminal == other.terminal
            && self.tags == other.tags
            && Arc::ptr_eq(&self.handler, &other.handler)
    }
}

/// Explicit startup-time declaration of a tool
pub struct ToolBuilder {
    name: String,
    description: Option<String>,
    params: Vec<ParameterSchema>,
    parameters: Option<Value>,
    inferred: Option<Value>,
    terminal: bool,
    tags: BTreeSet<String>,
    handler: Option<Arc<dyn ToolHandler>>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
            parameters: None,
            inferred: None,
            terminal: false,
            tags: BTreeSet::new(),
            handler: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into().trim().to_owned());
        self
    }

    /// Declare a required parameter
    #[must_use]
    pub fn param(
        mut self,
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(ParameterSchema {
            name: name.into(),
            param_type,
            description: Some(description.into()),
            required: true,
        });
        self
    }

    /// Declare an optional parameter
    #[must_use]
    pub fn optional_param(
        mut self,
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(ParameterSchema {
            name: name.into(),
            param_type,
            description: Some(description.into()),
            required: false,
        });
        self
    }

    /// Override the parameter schema entirely
    #[must_use]
    pub fn parameters(mut self, schema: Value) -> Self {
        self.parameters = Some(schema);
        self
    }

    #[must_use]
    pub const fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Use a handler over the raw argument map
    #[must_use]
    pub fn handler<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.handler = Some(Arc::new(FnHandler(f)));
        self
    }

    /// Use a handler over a typed argument struct.
    ///
    /// The parameter schema is inferred from `A` unless one was given with
    /// [`parameters`](Self::parameters).
    #[must_use]
    pub fn typed_handler<A, F, Fut, R>(mut self, f: F) -> Self
    where
        A: DeserializeOwned + schemars::JsonSchema + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Serialize + Send + 'static,
    {
        self.inferred = Some(infer_schema::<A>());
        self.handler = Some(Arc::new(TypedHandler {
            f,
            _args: PhantomData,
        }));
        self
    }

    /// Use a stateful handler object
    #[must_use]
    pub fn handler_impl(mut self, handler: impl ToolHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Tool> {
        let handler = self
            .handler
            .ok_or_else(|| AgentError::Config(format!("tool '{}' has no handler", self.name)))?;

        let parameters = self
            .parameters
            .or(self.inferred)
            .unwrap_or_else(|| object_schema(&self.params));

        Ok(Tool {
            name: self.name,
            description: self
                .description
                .unwrap_or_else(|| "No description provided.".into()),
            parameters,
            terminal: self.terminal,
            tags: self.tags,
            handler,
        })
    }
}

/// Registry of available tools, in registration order
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(&mut self, tool: Tool) -> Result<()> {
        self.insert(Arc::new(tool))
    }

    /// Register a tool that must carry at least one tag.
    pub fn register_tagged(&mut self, tool: Tool) -> Result<()> {
        if tool.tags.is_empty() {
            return Err(AgentError::MissingTag(tool.name));
        }
        self.register(tool)
    }

    fn insert(&mut self, tool: Arc<Tool>) -> Result<()> {
        if self.index.contains_key(tool.name()) {
            return Err(AgentError::DuplicateTool(tool.name.clone()));
        }
        self.index.insert(tool.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Register every tool of `other`, in its order.
    ///
    /// Fails without registering anything if any name is already taken.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if let Some(taken) = other
            .tools
            .iter()
            .find(|tool| self.index.contains_key(tool.name()))
        {
            return Err(AgentError::DuplicateTool(taken.name.clone()));
        }
        for tool in &other.tools {
            self.insert(Arc::clone(tool))?;
        }
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Get a tool by name, failing with [`AgentError::UnknownTool`]
    pub fn resolve(&self, name: &str) -> Result<Arc<Tool>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| AgentError::UnknownTool(name.to_owned()))
    }

    /// Tools sharing at least one tag with `tags`; everything if `tags` is empty.
    pub fn view<I, S>(&self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        if tags.is_empty() {
            return self.clone();
        }

        let mut view = Self::new();
        for tool in self.tools.iter().filter(|t| t.has_any_tag(&tags)) {
            view.index.insert(tool.name.clone(), view.tools.len());
            view.tools.push(Arc::clone(tool));
        }
        view
    }

    /// Function-calling schemas, in registration order
    pub fn schema(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    pub fn tools(&self) -> impl Iterator<Item = &Arc<Tool>> {
        self.tools.iter()
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;

    fn echo(name: &str, tags: &[&str]) -> Tool {
        Tool::builder(name)
            .description("Echo the arguments back")
            .param("text", ParamType::String, "Text to echo")
            .tags(tags.iter().copied())
            .handler(|args| async move { Ok(Value::Object(args)) })
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_resolve() {
        let tool = echo("echo", &["util"]);
        let mut registry = ToolRegistry::new();
        registry.register(tool.clone()).unwrap();

        assert_eq!(*registry.resolve("echo").unwrap(), tool);
        assert!(registry.get("missing").is_none());
        assert!(matches!(
            registry.resolve("missing"),
            Err(AgentError::UnknownTool(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("echo", &["util"])).unwrap();

        let err = registry.register(echo("echo", &["other"])).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_tagged_registration_requires_tags() {
        let mut registry = ToolRegistry::new();
        let err = registry.register_tagged(echo("bare", &[])).unwrap_err();
        assert!(matches!(err, AgentError::MissingTag(name) if name == "bare"));

        registry.register(echo("bare", &[])).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_view_filters_by_tag() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("read", &["file", "read"])).unwrap();
        registry.register(echo("write", &["write"])).unwrap();
        registry.register(echo("stop", &["system"])).unwrap();

        let view = registry.view(["read", "system"]);
        assert_eq!(view.names(), vec!["read", "stop"]);
        for tool in view.tools() {
            assert!(tool.tags().contains("read") || tool.tags().contains("system"));
        }
        assert!(view.resolve("write").is_err());

        let all = registry.view(Vec::<String>::new());
        assert_eq!(all.names(), vec!["read", "write", "stop"]);
    }

    #[test]
    fn test_schema_is_ordered_and_stable() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("zeta", &["a"])).unwrap();
        registry.register(echo("alpha", &["a"])).unwrap();

        let first = registry.schema();
        assert_eq!(first, registry.schema());
        assert_eq!(first[0].function.name, "zeta");
        assert_eq!(first[1].function.name, "alpha");

        let wire = serde_json::to_value(&first[0]).unwrap();
        assert_eq!(wire["type"], "function");
        assert_eq!(wire["function"]["parameters"]["required"], json!(["text"]));
        assert_eq!(
            wire["function"]["parameters"]["properties"]["text"]["type"],
            "string"
        );
    }

    #[test]
    fn test_merge() {
        let mut core = ToolRegistry::new();
        core.register(echo("terminate", &["system"])).unwrap();

        let mut registry = ToolRegistry::new();
        registry.register(echo("read", &["file"])).unwrap();
        registry.merge(&core).unwrap();
        assert_eq!(registry.names(), vec!["read", "terminate"]);
        assert!(registry.merge(&core).is_err());
    }

    #[test]
    fn test_failed_merge_changes_nothing() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("read", &["file"])).unwrap();

        let mut other = ToolRegistry::new();
        other.register(echo("write", &["write"])).unwrap();
        other.register(echo("read", &["file"])).unwrap();

        let err = registry.merge(&other).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(name) if name == "read"));
        assert_eq!(registry.names(), vec!["read"]);
        assert!(registry.get("write").is_none());
    }

    #[test]
    fn test_default_description_and_missing_handler() {
        let tool = Tool::builder("noop")
            .handler(|_| async { Ok(Value::Null) })
            .build()
            .unwrap();
        assert_eq!(tool.description(), "No description provided.");
        assert!(!tool.is_terminal());

        assert!(matches!(
            Tool::builder("broken").build(),
            Err(AgentError::Config(_))
        ));
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct SearchArgs {
        /// File to search
        file_name: String,
        search_term: String,
        max_hits: Option<u32>,
    }

    #[tokio::test]
    async fn test_typed_handler_infers_schema() {
        let tool = Tool::builder("search")
            .typed_handler(|args: SearchArgs| async move { Ok(args.search_term) })
            .build()
            .unwrap();

        let mut required = tool.required_params();
        required.sort_unstable();
        assert_eq!(required, vec!["file_name", "search_term"]);
        assert_eq!(tool.parameters()["type"], "object");
        assert!(tool.parameters().get("title").is_none());
        assert!(tool.declared_params().unwrap().contains(&"max_hits"));

        let args = json!({"file_name": "a.txt", "search_term": "fn"});
        let Value::Object(args) = args else { unreachable!() };
        let output = tool.handler().call(args).await.unwrap();
        assert_eq!(output, json!("fn"));
    }
}
