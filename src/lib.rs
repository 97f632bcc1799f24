//! draftbridge — an MCP server bridging AI agents to a remote design-file API.
//!
//! JSON-RPC 2.0 over a single HTTP POST ingress, a boot-time capability
//! registry (tools, resources, prompts), and a TTL-caching upstream client
//! for the design-file API.

pub mod capabilities;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod http;
pub mod logging;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod upstream;
pub mod uri_template;

pub use config::BridgeConfig;
pub use dispatch::RequestDispatcher;
pub use engine::ProtocolEngine;
pub use error::{RpcError, UpstreamError};
pub use registry::CapabilityRegistry;
pub use server::BridgeServer;
pub use upstream::UpstreamClient;
