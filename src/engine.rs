//! Protocol core: the seven MCP operations against the capability registry.
//!
//! Handler failure policy is asymmetric on purpose: a tool handler error is
//! domain data the calling agent should reason about, so it is soft-wrapped
//! into tool output (`isError: true`); resource and prompt lookup failures
//! are protocol errors. The soft wrapping happens in exactly one place,
//! [`tool_outcome_to_wire`].

use {
    crate::error::{RpcError, RpcResult},
    crate::protocol::{InitializeParams, PromptGetParams, ServerInfo, PROTOCOL_VERSION},
    crate::registry::CapabilityRegistry,
    serde_json::{json, Value},
    tokio::sync::RwLock,
    tracing::{debug, info, warn},
};

/// Session state: `None` until the first successful `initialize`, then the
/// snapshot returned by it. Repeat calls are idempotent and return the
/// stored snapshot, since clients re-send `initialize` on reconnection.
pub struct ProtocolEngine {
    registry: CapabilityRegistry,
    server_info: ServerInfo,
    session: RwLock<Option<Value>>,
}

impl ProtocolEngine {
    pub fn new(registry: CapabilityRegistry, server_info: ServerInfo) -> Self {
        Self {
            registry,
            server_info,
            session: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub async fn is_initialized(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Handle `initialize`. The write lock makes concurrent first calls
    /// settle on a single snapshot.
    pub async fn initialize(&self, params: InitializeParams) -> RpcResult<Value> {
        if let Some(snapshot) = self.session.read().await.as_ref() {
            debug!("repeat initialize, returning stored session snapshot");
            return Ok(snapshot.clone());
        }

        let mut session = self.session.write().await;
        if let Some(snapshot) = session.as_ref() {
            return Ok(snapshot.clone());
        }

        if let Some(client_info) = &params.client_info {
            info!(client = %client_info, "MCP client initializing");
        } else {
            info!("MCP client initializing (no clientInfo)");
        }
        if let Some(requested) = &params.protocol_version {
            debug!(client_version = %requested, server_version = PROTOCOL_VERSION, "protocol version");
        }

        let snapshot = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {},
            },
            "serverInfo": self.server_info.to_json(),
        });
        *session = Some(snapshot.clone());
        info!("session initialized");
        Ok(snapshot)
    }

    pub fn list_tools(&self) -> Value {
        json!({ "tools": self.registry.list_tools() })
    }

    pub fn list_resources(&self) -> Value {
        json!({ "resources": self.registry.list_resources() })
    }

    pub fn list_prompts(&self) -> Value {
        json!({ "prompts": self.registry.list_prompts() })
    }

    /// Handle `tools/call`. Unknown tool is a protocol error; a failing
    /// handler is not.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> RpcResult<Value> {
        let tool = self
            .registry
            .tool(name)
            .ok_or_else(|| RpcError::UnknownTool(name.to_string()))?;

        debug!(tool = %name, "invoking tool handler");
        let outcome = (tool.handler)(arguments).await;
        if let Err(e) = &outcome {
            warn!(tool = %name, error = %e, "tool handler failed, returning as tool output");
        }
        Ok(tool_outcome_to_wire(outcome))
    }

    /// Handle `resources/read`. The URI is matched against every compiled
    /// template; the handler receives the raw URI.
    pub async fn read_resource(&self, uri: &str) -> RpcResult<Value> {
        let resource = self
            .registry
            .match_resource(uri)
            .ok_or_else(|| RpcError::UnknownResource(uri.to_string()))?;

        debug!(uri = %uri, template = %resource.template.as_str(), "reading resource");
        let content = (resource.handler)(uri.to_string())
            .await
            .map_err(|e| RpcError::Internal(e.to_string()))?;

        Ok(json!({
            "contents": [{
                "uri": uri,
                "mimeType": resource.mime_type,
                "text": stringify_if_not_string(content),
            }]
        }))
    }

    /// Handle `prompts/get`. The handler's description, when present,
    /// overrides the registered default.
    pub async fn get_prompt(&self, params: PromptGetParams) -> RpcResult<Value> {
        let prompt = self
            .registry
            .prompt(&params.name)
            .ok_or_else(|| RpcError::UnknownPrompt(params.name.clone()))?;

        let content = (prompt.handler)(params.arguments)
            .await
            .map_err(|e| RpcError::Internal(e.to_string()))?;

        let description = content
            .description
            .unwrap_or_else(|| prompt.description.clone());
        Ok(json!({
            "description": description,
            "messages": content.messages,
        }))
    }
}

/// The single conversion point from a tool handler outcome to the wire shape.
///
/// Success and failure share the same content-block shape; failure adds
/// `isError: true` so the agent sees tool failure as output, not as a broken
/// connection.
pub fn tool_outcome_to_wire(outcome: anyhow::Result<Value>) -> Value {
    match outcome {
        Ok(result) => json!({
            "content": [{
                "type": "text",
                "text": stringify_if_not_string(result),
            }]
        }),
        Err(e) => json!({
            "content": [{
                "type": "text",
                "text": format!("Error: {e}"),
            }],
            "isError": true,
        }),
    }
}

/// Strings pass through; anything else becomes pretty-printed JSON.
fn stringify_if_not_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{
        PromptContent, PromptDescriptor, PromptMessage, ResourceDescriptor, ToolDescriptor,
    };
    use crate::uri_template::UriTemplate;
    use std::sync::Arc;

    fn engine_with_echo() -> ProtocolEngine {
        let mut registry = CapabilityRegistry::new();
        registry.register_tool(ToolDescriptor {
            name: "echo".to_string(),
            description: "echoes input".to_string(),
            input_schema: json!({"type": "object"}),
            handler: Arc::new(|args| Box::pin(async move { Ok(args) })),
        });
        registry.register_tool(ToolDescriptor {
            name: "boom".to_string(),
            description: "always fails".to_string(),
            input_schema: json!({"type": "object"}),
            handler: Arc::new(|_| Box::pin(async { Err(anyhow::anyhow!("boom")) })),
        });
        ProtocolEngine::new(registry, ServerInfo::default())
    }

    #[tokio::test]
    async fn echo_result_is_pretty_json() {
        let engine = engine_with_echo();
        let result = engine.call_tool("echo", json!({"msg": "hi"})).await.unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "{\n  \"msg\": \"hi\"\n}");
        assert!(result.get("isError").is_none());
    }

    #[tokio::test]
    async fn string_results_pass_through_unquoted() {
        let mut registry = CapabilityRegistry::new();
        registry.register_tool(ToolDescriptor {
            name: "greet".to_string(),
            description: String::new(),
            input_schema: json!({}),
            handler: Arc::new(|_| Box::pin(async { Ok(json!("hello")) })),
        });
        let engine = ProtocolEngine::new(registry, ServerInfo::default());
        let result = engine.call_tool("greet", json!({})).await.unwrap();
        assert_eq!(result["content"][0]["text"], "hello");
    }

    #[tokio::test]
    async fn failing_tool_is_soft_wrapped() {
        let engine = engine_with_echo();
        let result = engine.call_tool("boom", json!({})).await.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["text"], "Error: boom");
    }

    #[tokio::test]
    async fn unknown_tool_is_protocol_error() {
        let engine = engine_with_echo();
        let err = engine.call_tool("missing", json!({})).await.unwrap_err();
        assert_eq!(err.error_code(), -32601);
    }

    #[tokio::test]
    async fn unmatched_resource_is_protocol_error() {
        let engine = engine_with_echo();
        let err = engine.read_resource("design://nope").await.unwrap_err();
        assert!(matches!(err, RpcError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn resource_read_wraps_contents() {
        let mut registry = CapabilityRegistry::new();
        registry.register_resource(ResourceDescriptor {
            template: UriTemplate::compile("design://file/{file_key}"),
            name: "file".to_string(),
            description: String::new(),
            mime_type: "application/json".to_string(),
            handler: Arc::new(|uri| Box::pin(async move { Ok(json!({"uri": uri})) })),
        });
        let engine = ProtocolEngine::new(registry, ServerInfo::default());
        let result = engine.read_resource("design://file/k1").await.unwrap();
        let entry = &result["contents"][0];
        assert_eq!(entry["uri"], "design://file/k1");
        assert_eq!(entry["mimeType"], "application/json");
        assert!(entry["text"].as_str().unwrap().contains("design://file/k1"));
    }

    #[tokio::test]
    async fn prompt_description_override() {
        let mut registry = CapabilityRegistry::new();
        registry.register_prompt(PromptDescriptor {
            name: "review".to_string(),
            description: "default description".to_string(),
            arguments: vec![],
            handler: Arc::new(|_| {
                Box::pin(async {
                    Ok(PromptContent {
                        description: Some("handler description".to_string()),
                        messages: vec![PromptMessage::user_text("review this")],
                    })
                })
            }),
        });
        let engine = ProtocolEngine::new(registry, ServerInfo::default());
        let result = engine
            .get_prompt(PromptGetParams {
                name: "review".to_string(),
                arguments: json!({}),
            })
            .await
            .unwrap();
        assert_eq!(result["description"], "handler description");
        assert_eq!(result["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let engine = engine_with_echo();
        let params = || InitializeParams {
            protocol_version: Some(PROTOCOL_VERSION.to_string()),
            capabilities: json!({}),
            client_info: Some(json!({"name": "test"})),
        };
        let first = engine.initialize(params()).await.unwrap();
        let second = engine.initialize(params()).await.unwrap();
        assert_eq!(first, second);
        assert!(engine.is_initialized().await);
        assert_eq!(first["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(first["serverInfo"]["name"], "draftbridge");
    }

    #[tokio::test]
    async fn concurrent_first_initialize_settles_on_one_snapshot() {
        let engine = Arc::new(engine_with_echo());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .initialize(InitializeParams {
                        protocol_version: None,
                        capabilities: json!({}),
                        client_info: None,
                    })
                    .await
                    .unwrap()
            }));
        }
        let mut snapshots = Vec::new();
        for handle in handles {
            snapshots.push(handle.await.unwrap());
        }
        assert!(snapshots.windows(2).all(|w| w[0] == w[1]));
    }
}
