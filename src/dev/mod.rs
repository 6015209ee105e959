//! Local development tooling: the `/api` forwarding proxy and the in-memory
//! stub backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! With an empty `CUSTOMER_API_BASE` the client talks to its own origin; the
//! proxy is what listens there and forwards to `PROXY_API_TARGET`. The stub
//! backend speaks the same HTTP contract as the real server and backs the
//! test suite.

pub mod proxy;
pub mod stub_backend;

use axum::Router;

/// Errors produced while starting dev servers.
#[derive(Debug, thiserror::Error)]
pub enum DevError {
    /// The outbound HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Binding or serving the listener failed.
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Bind `0.0.0.0:{port}` and serve `app` until the process exits.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or serving fails.
pub async fn serve(app: Router, port: u16, name: &'static str) -> Result<(), DevError> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(%port, "{name} listening");
    axum::serve(listener, app).await?;
    Ok(())
}
