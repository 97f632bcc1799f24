//! Request dispatcher: envelope validation, notification handling, method
//! routing, and batch fan-out.

use {
    crate::engine::ProtocolEngine,
    crate::error::RpcResult,
    crate::protocol::{success_response, ParsedRequest, RawMessage},
    futures_util::future::join_all,
    serde_json::Value,
    std::sync::Arc,
    tracing::{debug, warn},
};

pub struct RequestDispatcher {
    engine: Arc<ProtocolEngine>,
}

impl RequestDispatcher {
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<ProtocolEngine> {
        &self.engine
    }

    /// Dispatch a single envelope. Returns `None` for notifications, which
    /// must never produce a response regardless of outcome.
    pub async fn dispatch(&self, message: Value) -> Option<Value> {
        let raw = RawMessage::from_value(&message);

        // Envelope validation precedes the notification rule: a request that
        // is not JSON-RPC 2.0 is answered even without an id (id echoes null).
        if let Err(e) = raw.validate() {
            warn!(error = %e, "rejecting malformed envelope");
            return Some(e.to_json_rpc_error(raw.id_value()));
        }

        let method = raw.method.clone().unwrap_or_default();
        debug!(method = %method, id = ?raw.id, "dispatching request");

        let result = self.route(&raw).await;

        if raw.is_notification() {
            if let Err(e) = result {
                // Failures in notifications are logged server-side only.
                warn!(method = %method, error = %e, "notification failed (no response emitted)");
            }
            return None;
        }

        Some(match result {
            Ok(value) => success_response(raw.id_value(), value),
            Err(e) => e.to_json_rpc_error(raw.id_value()),
        })
    }

    /// Dispatch a batch. Entries execute concurrently; the output preserves
    /// the relative order of the non-notification inputs. An all-notification
    /// batch yields an empty array.
    pub async fn dispatch_batch(&self, batch: Vec<Value>) -> Vec<Value> {
        let futures = batch.into_iter().map(|entry| self.dispatch(entry));
        join_all(futures).await.into_iter().flatten().collect()
    }

    async fn route(&self, raw: &RawMessage) -> RpcResult<Value> {
        match raw.parse()? {
            ParsedRequest::Initialize(params) => self.engine.initialize(params).await,
            ParsedRequest::ToolsList => Ok(self.engine.list_tools()),
            ParsedRequest::ToolsCall(params) => {
                self.engine.call_tool(&params.name, params.arguments).await
            }
            ParsedRequest::ResourcesList => Ok(self.engine.list_resources()),
            ParsedRequest::ResourcesRead(params) => self.engine.read_resource(&params.uri).await,
            ParsedRequest::PromptsList => Ok(self.engine.list_prompts()),
            ParsedRequest::PromptsGet(params) => self.engine.get_prompt(params).await,
        }
    }
}
