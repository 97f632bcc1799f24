//! Upstream design-file API access: an HTTP client with a TTL response cache.

pub mod cache;
pub mod client;

pub use cache::ResponseCache;
pub use client::{AuthProvider, ClientOptions, RequestOptions, StaticTokenAuth, UpstreamClient};
