//! JSON-RPC message parsing.
//!
//! Incoming envelopes are pulled apart into a [`RawMessage`] first so the
//! dispatcher can make the notification-vs-request decision before any
//! per-method parsing, then converted into a typed [`ParsedRequest`].

use {
    crate::error::{RpcError, RpcResult},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// A loosely-parsed JSON-RPC envelope.
///
/// Every field is optional because validation happens *after* extraction:
/// a malformed envelope must still yield its `id` so the error response can
/// echo it.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub jsonrpc: Option<String>,
    pub id: Option<Value>,
    pub method: Option<String>,
    pub params: Option<Value>,
}

impl RawMessage {
    pub fn from_value(message: &Value) -> Self {
        Self {
            jsonrpc: message
                .get("jsonrpc")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            id: message.get("id").cloned(),
            method: message
                .get("method")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            params: message.get("params").cloned(),
        }
    }

    /// A request without an `id` is a notification and must never produce
    /// a response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// The `id` to echo in responses; null when the envelope carried none.
    pub fn id_value(&self) -> Value {
        self.id.clone().unwrap_or(Value::Null)
    }

    /// Check the envelope structure before routing.
    pub fn validate(&self) -> RpcResult<()> {
        match self.jsonrpc.as_deref() {
            Some("2.0") => {}
            Some(other) => {
                return Err(RpcError::InvalidRequest(format!(
                    "Invalid jsonrpc version: {other}"
                )))
            }
            None => {
                return Err(RpcError::InvalidRequest(
                    "Missing or invalid 'jsonrpc' field".to_string(),
                ))
            }
        }
        match self.method.as_deref() {
            Some(m) if !m.is_empty() => Ok(()),
            _ => Err(RpcError::InvalidRequest(
                "Missing or invalid 'method' field".to_string(),
            )),
        }
    }

    /// Parse `params` according to the method name.
    pub fn parse(&self) -> RpcResult<ParsedRequest> {
        self.validate()?;
        let method = self.method.as_deref().unwrap_or_default();

        match method {
            "initialize" => {
                let params = self.require_params("initialize")?;
                let parsed: InitializeParams = serde_json::from_value(params).map_err(|e| {
                    RpcError::InvalidParams(format!("Invalid initialize params: {e}"))
                })?;
                Ok(ParsedRequest::Initialize(parsed))
            }
            "tools/list" => Ok(ParsedRequest::ToolsList),
            "tools/call" => {
                let params = self.require_params("tools/call")?;
                let parsed: ToolCallParams = serde_json::from_value(params).map_err(|e| {
                    RpcError::InvalidParams(format!("Invalid tools/call params: {e}"))
                })?;
                Ok(ParsedRequest::ToolsCall(parsed))
            }
            "resources/list" => Ok(ParsedRequest::ResourcesList),
            "resources/read" => {
                let params = self.require_params("resources/read")?;
                let parsed: ResourceReadParams = serde_json::from_value(params).map_err(|e| {
                    RpcError::InvalidParams(format!("Invalid resources/read params: {e}"))
                })?;
                Ok(ParsedRequest::ResourcesRead(parsed))
            }
            "prompts/list" => Ok(ParsedRequest::PromptsList),
            "prompts/get" => {
                let params = self.require_params("prompts/get")?;
                let parsed: PromptGetParams = serde_json::from_value(params).map_err(|e| {
                    RpcError::InvalidParams(format!("Invalid prompts/get params: {e}"))
                })?;
                Ok(ParsedRequest::PromptsGet(parsed))
            }
            other => Err(RpcError::UnknownMethod(other.to_string())),
        }
    }

    fn require_params(&self, method: &str) -> RpcResult<Value> {
        self.params
            .clone()
            .ok_or_else(|| RpcError::InvalidParams(format!("Missing params for {method}")))
    }
}

/// Typed view of a validated request.
#[derive(Debug)]
pub enum ParsedRequest {
    Initialize(InitializeParams),
    ToolsList,
    ToolsCall(ToolCallParams),
    ResourcesList,
    ResourcesRead(ResourceReadParams),
    PromptsList,
    PromptsGet(PromptGetParams),
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: Option<Value>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResourceReadParams {
    pub uri: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PromptGetParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}
