//! Shared helpers for integration tests: spawn a bridge server on an
//! ephemeral port and talk JSON-RPC to it.
#![allow(dead_code)]

use {
    draftbridge::{
        engine::ProtocolEngine,
        protocol::ServerInfo,
        registry::{CapabilityRegistry, ToolDescriptor},
        server::BridgeServer,
    },
    serde_json::{json, Value},
    std::sync::Arc,
    tokio::task::JoinHandle,
};

/// A running test server. The serve task is aborted on drop.
pub struct TestServer {
    pub endpoint: String,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_server(registry: CapabilityRegistry) -> TestServer {
    let engine = ProtocolEngine::new(registry, ServerInfo::default());
    let server = BridgeServer::new(engine);
    let (addr, serve) = server
        .bind(([127, 0, 0, 1], 0).into())
        .await
        .expect("bind test server");
    let handle = tokio::spawn(serve);
    TestServer {
        endpoint: format!("http://{addr}/mcp"),
        handle,
    }
}

/// Registry with an `echo` tool (returns its arguments) and a `boom` tool
/// (always fails).
pub fn echo_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry.register_tool(ToolDescriptor {
        name: "echo".to_string(),
        description: "echoes its arguments".to_string(),
        input_schema: json!({"type": "object"}),
        handler: Arc::new(|args| Box::pin(async move { Ok(args) })),
    });
    registry.register_tool(ToolDescriptor {
        name: "boom".to_string(),
        description: "always fails".to_string(),
        input_schema: json!({"type": "object"}),
        handler: Arc::new(|_| Box::pin(async { Err(anyhow::anyhow!("boom")) })),
    });
    registry
}

/// POST a JSON-RPC payload, returning status and raw body text.
pub async fn post_raw(endpoint: &str, body: String) -> (u16, String) {
    let client = reqwest::Client::new();
    let response = client
        .post(endpoint)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .expect("post request");
    let status = response.status().as_u16();
    let text = response.text().await.expect("response body");
    (status, text)
}

/// POST a JSON-RPC payload and parse the JSON response.
pub async fn post_rpc(endpoint: &str, payload: Value) -> Value {
    let (status, text) = post_raw(endpoint, payload.to_string()).await;
    assert_eq!(status, 200, "unexpected status, body: {text}");
    serde_json::from_str(&text).expect("JSON response body")
}
