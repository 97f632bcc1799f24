//! JSON-RPC / MCP protocol surface.
//!
//! Envelope builders and protocol constants live here; per-method parameter
//! parsing lives in [`message`].

pub mod message;

pub use message::{
    InitializeParams, ParsedRequest, PromptGetParams, RawMessage, ResourceReadParams,
    ToolCallParams,
};

use serde_json::{json, Value};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// The seven request methods the dispatcher routes.
pub const METHODS: [&str; 7] = [
    "initialize",
    "tools/list",
    "tools/call",
    "resources/list",
    "resources/read",
    "prompts/list",
    "prompts/get",
];

/// Server identity advertised in `initialize` responses.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "draftbridge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerInfo {
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "version": self.version,
        })
    }
}

/// Build a success response envelope.
pub fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

/// Build an error response envelope with an explicit code.
pub fn error_response(id: Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let resp = success_response(json!(7), json!({"ok": true}));
        assert_eq!(resp["jsonrpc"], "2.0");
        assert_eq!(resp["id"], 7);
        assert_eq!(resp["result"]["ok"], true);
        assert!(resp.get("error").is_none());
    }

    #[test]
    fn error_envelope_shape() {
        let resp = error_response(json!("abc"), -32601, "nope");
        assert_eq!(resp["id"], "abc");
        assert_eq!(resp["error"]["code"], -32601);
        assert_eq!(resp["error"]["message"], "nope");
        assert!(resp.get("result").is_none());
    }
}
