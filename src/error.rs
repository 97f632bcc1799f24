//! Error taxonomy for the bridge.
//!
//! Two families are kept deliberately separate:
//!
//! - [`RpcError`] — protocol-level failures that surface as JSON-RPC `error`
//!   objects (bad envelope, unknown method, unmatched resource, ...).
//! - [`UpstreamError`] — failures talking to the design-file API. An `Api`
//!   rejection (non-2xx) is usually not transient; a `Network` failure
//!   (DNS, connect, timeout) plausibly is, so callers can retry the latter.
//!
//! Tool handler failures are neither: they are soft-wrapped into tool output
//! by the protocol engine (see `engine::tool_outcome_to_wire`).

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    UnknownMethod(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Resource not found: {0}")]
    UnknownResource(String),

    #[error("Prompt not found: {0}")]
    UnknownPrompt(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Domain-specific error carrying an explicit code and `data` payload.
    #[error("{message}")]
    Custom {
        code: i32,
        message: String,
        data: Option<Value>,
    },
}

impl RpcError {
    /// JSON-RPC 2.0 error code for this error.
    pub fn error_code(&self) -> i32 {
        match self {
            Self::InvalidRequest(_) => -32600,
            Self::UnknownMethod(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::UnknownTool(_) | Self::UnknownResource(_) | Self::UnknownPrompt(_) => -32601,
            Self::Json(_) => -32700,
            Self::Internal(_) => -32603,
            Self::Custom { code, .. } => *code,
        }
    }

    /// Optional `data` member for the wire error object.
    pub fn error_data(&self) -> Option<Value> {
        match self {
            Self::Custom { data, .. } => data.clone(),
            _ => None,
        }
    }

    /// Build the full JSON-RPC error response envelope.
    pub fn to_json_rpc_error(&self, id: Value) -> Value {
        let mut error = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        if let Some(data) = self.error_data() {
            error["data"] = data;
        }
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": error,
        })
    }
}

pub type RpcResult<T> = Result<T, RpcError>;

/// Failures from the upstream design-file API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-2xx status. Carries the status code
    /// and the response body text so handlers can surface the rejection.
    #[error("upstream API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Transport-level failure: DNS, connection reset, timeout. Never carries
    /// an HTTP status because no response was received.
    #[error("network error: {0}")]
    Network(String),
}

impl UpstreamError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
