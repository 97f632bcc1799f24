//! HTTP client for the upstream design-file API.
//!
//! Failure classification matters to callers: a non-2xx answer becomes
//! [`UpstreamError::Api`] (usually not worth retrying), a transport failure
//! or timeout becomes [`UpstreamError::Network`] (plausibly transient).
//! GET responses are cached by request signature; mutating verbs never are.

use {
    crate::error::UpstreamError,
    crate::upstream::cache::ResponseCache,
    async_trait::async_trait,
    reqwest::Method,
    serde_json::Value,
    std::sync::Arc,
    std::time::Duration,
    tracing::{debug, warn},
};

/// Produces authentication headers for each upstream request.
///
/// Async so implementations can refresh tokens; credential format is the
/// caller's concern.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn headers(&self) -> Vec<(String, String)>;
}

/// Fixed token sent under a fixed header name.
pub struct StaticTokenAuth {
    header: String,
    token: String,
}

impl StaticTokenAuth {
    pub fn new(header: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn headers(&self) -> Vec<(String, String)> {
        vec![(self.header.clone(), self.token.clone())]
    }
}

/// Per-request options. A verb-less request is a GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn post(body: Value) -> Self {
        Self {
            method: Some(Method::POST),
            body: Some(body),
        }
    }
}

/// Client construction options.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            cache_ttl: ResponseCache::DEFAULT_TTL,
        }
    }
}

pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
    cache: ResponseCache,
}

impl UpstreamClient {
    pub fn new(
        base_url: impl Into<String>,
        auth: Arc<dyn AuthProvider>,
        options: ClientOptions,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(UpstreamError::from)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            auth,
            cache: ResponseCache::new(options.cache_ttl),
        })
    }

    /// Perform a request against `base_url + endpoint`, consulting the cache
    /// for GETs.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, UpstreamError> {
        let method = options.method.clone().unwrap_or(Method::GET);
        let url = format!("{}{}", self.base_url, endpoint);
        let cacheable = method == Method::GET;
        let cache_key = request_signature(&method, &url, options.body.as_ref());

        if cacheable {
            if let Some(hit) = self.cache.get(&cache_key) {
                debug!(url = %url, "upstream cache hit");
                return Ok(hit);
            }
        }

        debug!(method = %method, url = %url, "upstream request");
        let mut request = self.http.request(method, &url);
        for (name, value) in self.auth.headers().await {
            request = request.header(&name, &value);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(UpstreamError::from)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), url = %url, "upstream rejected request");
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await.map_err(UpstreamError::from)?;
        if cacheable {
            self.cache.insert(cache_key, payload.clone());
        }
        Ok(payload)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn set_cache_enabled(&self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }
}

/// Canonical cache key: verb, full URL, and serialized body.
fn request_signature(method: &Method, url: &str, body: Option<&Value>) -> String {
    match body {
        Some(body) => format!("{method} {url} {body}"),
        None => format!("{method} {url}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signature_distinguishes_verb_url_and_body() {
        let get = request_signature(&Method::GET, "http://u/a", None);
        let post = request_signature(&Method::POST, "http://u/a", None);
        let get_b = request_signature(&Method::GET, "http://u/b", None);
        let with_body = request_signature(&Method::GET, "http://u/a", Some(&json!({"x": 1})));
        assert_ne!(get, post);
        assert_ne!(get, get_b);
        assert_ne!(get, with_body);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = UpstreamClient::new(
            "http://upstream.test/v1/",
            Arc::new(StaticTokenAuth::new("X-Api-Token", "t")),
            ClientOptions::default(),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://upstream.test/v1");
    }

    #[tokio::test]
    async fn static_auth_produces_header_pair() {
        let auth = StaticTokenAuth::new("X-Api-Token", "secret");
        assert_eq!(
            auth.headers().await,
            vec![("X-Api-Token".to_string(), "secret".to_string())]
        );
    }
}
