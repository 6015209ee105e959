//! `/api` forwarding proxy for local development.
//!
//! Forwards method, path, query, headers and body to the target and relays
//! status, headers (including every `set-cookie`) and body back. The `Host`
//! header is rewritten to the target's, and redirects are passed through
//! untouched.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::DevError;
use crate::config::ProxyConfig;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
struct ProxyState {
    http: reqwest::Client,
    target: String,
}

/// Build the proxy router for `target` (e.g. `http://localhost:8000`).
///
/// # Errors
///
/// Returns an error if the outbound HTTP client cannot be constructed.
pub fn router(target: &str) -> Result<Router, DevError> {
    let http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| DevError::HttpClientBuild(e.to_string()))?;
    let state = ProxyState { http, target: target.trim_end_matches('/').to_owned() };

    Ok(Router::new()
        .route("/api", any(forward))
        .route("/api/{*rest}", any(forward))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Run the proxy described by `config`.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the port cannot be bound.
pub async fn serve(config: &ProxyConfig) -> Result<(), DevError> {
    tracing::info!(target_url = %config.target, "proxying /api");
    super::serve(router(&config.target)?, config.port, "dev proxy").await
}

async fn forward(State(state): State<ProxyState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let Ok(bytes) = to_bytes(body, MAX_BODY_BYTES).await else {
        return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
    };

    let path_and_query = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let url = format!("{}{}", state.target, path_and_query);

    let upstream = state
        .http
        .request(parts.method.clone(), &url)
        .headers(forwardable(&parts.headers))
        .body(bytes)
        .send()
        .await;
    let upstream = match upstream {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %e, %url, "proxy upstream request failed");
            return (StatusCode::BAD_GATEWAY, "upstream request failed").into_response();
        }
    };

    let status = upstream.status();
    let headers = forwardable(upstream.headers());
    let body = match upstream.bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, %url, "proxy upstream body read failed");
            return (StatusCode::BAD_GATEWAY, "upstream body read failed").into_response();
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Copy end-to-end headers, dropping hop-by-hop ones and those the HTTP
/// stack recomputes.
fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    *name == header::HOST
        || *name == header::CONNECTION
        || *name == header::CONTENT_LENGTH
        || *name == header::TRANSFER_ENCODING
        || *name == header::UPGRADE
        || *name == header::TE
        || *name == header::TRAILER
        || *name == header::PROXY_AUTHORIZATION
        || *name == header::PROXY_AUTHENTICATE
        || name.as_str() == "keep-alive"
}

#[cfg(test)]
#[path = "proxy_test.rs"]
mod tests;
