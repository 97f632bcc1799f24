//! Server binary: wire the design-file capabilities to the upstream API and
//! serve the MCP ingress.

use {
    anyhow::Result,
    draftbridge::{
        capabilities::register_design_capabilities,
        engine::ProtocolEngine,
        logging,
        protocol::ServerInfo,
        registry::CapabilityRegistry,
        upstream::{ClientOptions, StaticTokenAuth, UpstreamClient},
        BridgeConfig, BridgeServer,
    },
    std::sync::Arc,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let config = BridgeConfig::from_env()?;

    let upstream = Arc::new(UpstreamClient::new(
        config.upstream_base_url.clone(),
        Arc::new(StaticTokenAuth::new("X-Api-Token", config.api_token.clone())),
        ClientOptions {
            timeout: config.upstream_timeout,
            cache_ttl: config.cache_ttl,
        },
    )?);

    let mut registry = CapabilityRegistry::new();
    register_design_capabilities(&mut registry, upstream);

    let engine = ProtocolEngine::new(registry, ServerInfo::default());
    BridgeServer::new(engine).run(config.port).await
}
