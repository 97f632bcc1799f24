//! HTTP ingress.
//!
//! A single `/mcp` POST endpoint accepting one JSON-RPC envelope or a batch
//! array. OPTIONS answers CORS preflight, every other method gets 405, and
//! anything not already converted into a JSON-RPC error (e.g. an unparseable
//! body) becomes a 500 with an internal-error envelope.

use {
    crate::dispatch::RequestDispatcher,
    serde_json::{json, Value},
    std::convert::Infallible,
    std::sync::Arc,
    tracing::{debug, error},
    warp::http::StatusCode,
    warp::hyper::body::Bytes,
    warp::{reply, Filter, Rejection, Reply},
};

/// Build the warp route tree for the ingress.
pub fn routes(
    dispatcher: Arc<RequestDispatcher>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let post = warp::path!("mcp")
        .and(warp::post())
        .and(warp::body::bytes())
        .and(with_dispatcher(dispatcher))
        .and_then(handle_post);

    let preflight = warp::path!("mcp")
        .and(warp::options())
        .map(|| with_cors(reply::with_status(String::new(), StatusCode::OK)));

    // POST and OPTIONS were consumed above; anything else on /mcp is a 405.
    let method_guard = warp::path!("mcp").map(|| {
        debug!("rejecting non-POST request");
        with_cors(reply::with_status(
            "Method Not Allowed".to_string(),
            StatusCode::METHOD_NOT_ALLOWED,
        ))
    });

    post.or(preflight).or(method_guard)
}

fn with_dispatcher(
    dispatcher: Arc<RequestDispatcher>,
) -> impl Filter<Extract = (Arc<RequestDispatcher>,), Error = Infallible> + Clone {
    warp::any().map(move || dispatcher.clone())
}

async fn handle_post(
    body: Bytes,
    dispatcher: Arc<RequestDispatcher>,
) -> Result<Box<dyn Reply>, Rejection> {
    let parsed: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, "unparseable request body");
            return Ok(internal_error_reply(e.to_string()));
        }
    };

    match parsed {
        Value::Array(batch) => {
            debug!(entries = batch.len(), "handling batch request");
            let responses = dispatcher.dispatch_batch(batch).await;
            if responses.is_empty() {
                // Batch of notifications only: nothing to say.
                Ok(Box::new(with_cors(reply::with_status(
                    String::new(),
                    StatusCode::OK,
                ))))
            } else {
                Ok(Box::new(with_cors(reply::json(&responses))))
            }
        }
        single => match dispatcher.dispatch(single).await {
            Some(response) => Ok(Box::new(with_cors(reply::json(&response)))),
            // Notification: the transport must emit nothing.
            None => Ok(Box::new(with_cors(reply::with_status(
                String::new(),
                StatusCode::OK,
            )))),
        },
    }
}

/// Final 500 mapping for adapter-level failures.
fn internal_error_reply(detail: String) -> Box<dyn Reply> {
    let body = json!({
        "jsonrpc": "2.0",
        "error": {
            "code": -32603,
            "message": "Internal error",
            "data": detail,
        }
    });
    Box::new(with_cors(reply::with_status(
        reply::json(&body),
        StatusCode::INTERNAL_SERVER_ERROR,
    )))
}

/// CORS headers for the MCP endpoint.
fn with_cors(rep: impl Reply) -> impl Reply {
    let rep = reply::with_header(rep, "access-control-allow-origin", "*");
    let rep = reply::with_header(rep, "access-control-allow-methods", "POST, OPTIONS");
    reply::with_header(
        rep,
        "access-control-allow-headers",
        "content-type, authorization",
    )
}
