//! Shared helpers for tests that need a live HTTP backend.

use std::sync::Arc;

use axum::Router;

use crate::api::ApiClient;
use crate::config::ApiConfig;
use crate::dev::stub_backend::StubBackend;
use crate::session::SessionController;
use crate::storage::MemoryStore;

pub(crate) const ADMIN_USERNAME: &str = "admin";
pub(crate) const ADMIN_PASSWORD: &str = "secret";

/// Serve `router` on an ephemeral localhost port; returns its base URL.
pub(crate) async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub(crate) async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(&ApiConfig::new(base_url)).expect("api client")
}

/// Stub backend with one admin user, served on an ephemeral port.
pub(crate) async fn spawn_stub() -> (StubBackend, String) {
    let stub = StubBackend::new([(ADMIN_USERNAME, ADMIN_PASSWORD)]);
    let base = spawn_router(stub.router()).await;
    (stub, base)
}

/// Controller against the stub backend with empty in-memory storage.
pub(crate) async fn stub_session() -> (StubBackend, SessionController, Arc<MemoryStore>) {
    let (stub, base) = spawn_stub().await;
    let store = Arc::new(MemoryStore::new());
    let controller = SessionController::start(client_for(&base), store.clone());
    (stub, controller, store)
}
