//! Server assembly: binds the ingress and serves it.

use {
    crate::dispatch::RequestDispatcher,
    crate::engine::ProtocolEngine,
    crate::http,
    anyhow::{Context, Result},
    std::future::Future,
    std::net::SocketAddr,
    std::sync::Arc,
    tokio::net::TcpListener,
    tokio_stream::wrappers::TcpListenerStream,
    tracing::info,
};

pub struct BridgeServer {
    dispatcher: Arc<RequestDispatcher>,
}

impl BridgeServer {
    pub fn new(engine: ProtocolEngine) -> Self {
        Self {
            dispatcher: Arc::new(RequestDispatcher::new(Arc::new(engine))),
        }
    }

    pub fn dispatcher(&self) -> Arc<RequestDispatcher> {
        self.dispatcher.clone()
    }

    /// Bind to `addr` and return the bound address plus the serve future.
    /// Port 0 yields an ephemeral port, which the tests rely on.
    pub async fn bind(&self, addr: SocketAddr) -> Result<(SocketAddr, impl Future<Output = ()>)> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("could not bind to {addr}"))?;
        let local_addr = listener.local_addr().context("no local address")?;
        let routes = http::routes(self.dispatcher.clone());
        let serve = warp::serve(routes).run_incoming(TcpListenerStream::new(listener));
        Ok((local_addr, serve))
    }

    /// Bind and serve until the process exits.
    pub async fn run(&self, port: u16) -> Result<()> {
        let addr: SocketAddr = ([127, 0, 0, 1], port).into();
        let (local_addr, serve) = self.bind(addr).await?;
        info!(%local_addr, "MCP ingress listening (POST /mcp)");
        serve.await;
        Ok(())
    }
}
