//! Capability registry.
//!
//! Tools, resources, and prompts are registered once at boot as descriptors
//! carrying public metadata plus a boxed async handler. The registry is
//! read-mostly afterwards; listing projects descriptors to their public
//! fields only and never exposes handlers.

use {
    crate::uri_template::UriTemplate,
    anyhow::Result,
    futures_util::future::BoxFuture,
    schemars::JsonSchema,
    serde::de::DeserializeOwned,
    serde_json::{json, Value},
    std::collections::BTreeMap,
    std::sync::Arc,
    tracing::debug,
};

/// Tool handler: arguments in, any JSON-serializable value out (or an error,
/// which the engine soft-wraps into tool output).
pub type ToolHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Resource handler: receives the raw matched URI.
pub type ResourceHandler = Arc<dyn Fn(String) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Prompt handler: arguments in, prompt content out.
pub type PromptHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<PromptContent>> + Send + Sync>;

#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler,
}

#[derive(Clone)]
pub struct ResourceDescriptor {
    pub template: UriTemplate,
    pub name: String,
    pub description: String,
    pub mime_type: String,
    pub handler: ResourceHandler,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

#[derive(Clone)]
pub struct PromptDescriptor {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
    pub handler: PromptHandler,
}

/// What a prompt handler produces.
#[derive(Debug, Clone)]
pub struct PromptContent {
    /// Overrides the registered description when present.
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: Value,
}

impl PromptMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: json!({"type": "text", "text": text.into()}),
        }
    }
}

/// A registered capability, tagged by kind.
#[derive(Clone)]
pub enum Capability {
    Tool(ToolDescriptor),
    Resource(ResourceDescriptor),
    Prompt(PromptDescriptor),
}

/// In-memory capability table. `BTreeMap` keys make listings independent of
/// registration order.
#[derive(Default)]
pub struct CapabilityRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
    resources: BTreeMap<String, ResourceDescriptor>,
    prompts: BTreeMap<String, PromptDescriptor>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Upsert semantics: re-registering a key replaces
    /// the previous descriptor.
    pub fn register(&mut self, capability: Capability) {
        match capability {
            Capability::Tool(tool) => self.register_tool(tool),
            Capability::Resource(resource) => self.register_resource(resource),
            Capability::Prompt(prompt) => self.register_prompt(prompt),
        }
    }

    pub fn register_tool(&mut self, tool: ToolDescriptor) {
        debug!(tool = %tool.name, "registering tool");
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Register a tool with its input schema derived from a Rust type.
    pub fn register_typed_tool<I, F>(&mut self, name: &str, description: &str, handler: F)
    where
        I: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(I) -> BoxFuture<'static, Result<Value>> + Send + Sync + 'static,
    {
        let schema = serde_json::to_value(schemars::schema_for!(I)).unwrap_or_else(|_| json!({}));
        let wrapper: ToolHandler = Arc::new(move |args: Value| {
            let input: Result<I, _> = serde_json::from_value(args);
            match input {
                Ok(input) => handler(input),
                Err(e) => Box::pin(async move { Err(anyhow::anyhow!("invalid arguments: {e}")) }),
            }
        });
        self.register_tool(ToolDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: schema,
            handler: wrapper,
        });
    }

    pub fn register_resource(&mut self, resource: ResourceDescriptor) {
        debug!(template = %resource.template.as_str(), "registering resource");
        self.resources
            .insert(resource.template.as_str().to_string(), resource);
    }

    pub fn register_prompt(&mut self, prompt: PromptDescriptor) {
        debug!(prompt = %prompt.name, "registering prompt");
        self.prompts.insert(prompt.name.clone(), prompt);
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Find the first registered resource whose compiled template matches.
    pub fn match_resource(&self, uri: &str) -> Option<&ResourceDescriptor> {
        self.resources
            .values()
            .find(|r| r.template.matches(uri).is_some())
    }

    pub fn prompt(&self, name: &str) -> Option<&PromptDescriptor> {
        self.prompts.get(name)
    }

    /// Public projection for `tools/list`.
    pub fn list_tools(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                })
            })
            .collect()
    }

    /// Public projection for `resources/list`.
    pub fn list_resources(&self) -> Vec<Value> {
        self.resources
            .values()
            .map(|r| {
                json!({
                    "uri": r.template.as_str(),
                    "name": r.name,
                    "description": r.description,
                    "mimeType": r.mime_type,
                })
            })
            .collect()
    }

    /// Public projection for `prompts/list`.
    pub fn list_prompts(&self) -> Vec<Value> {
        self.prompts
            .values()
            .map(|p| {
                json!({
                    "name": p.name,
                    "description": p.description,
                    "arguments": p.arguments,
                })
            })
            .collect()
    }
}
