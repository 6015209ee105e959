//! In-memory stub of the customer records backend.
//!
//! DESIGN
//! ======
//! Speaks the same HTTP contract as the real server: session cookie auth,
//! public list/retrieve, authenticated create/update/delete, DRF-style error
//! bodies (`{"detail": ...}` or per-field lists). State is held in memory
//! behind a `RwLock` and lost on exit.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use super::DevError;
use crate::api::client::{CUSTOMERS_PATH, HEALTH_PATH, LOGIN_PATH, LOGOUT_PATH};
use crate::config::StubConfig;
use crate::customer::Customer;

pub const SESSION_COOKIE: &str = "sessionid";

/// Shared handle to the stub's state; clones see the same data.
#[derive(Clone)]
pub struct StubBackend {
    inner: Arc<RwLock<StubState>>,
}

#[derive(Default)]
struct StubState {
    /// username -> password
    users: HashMap<String, String>,
    /// session token -> username
    sessions: HashMap<String, String>,
    customers: BTreeMap<i64, Customer>,
    next_id: i64,
}

impl StubBackend {
    /// Stub with the given `(username, password)` accounts.
    #[must_use]
    pub fn new<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        let state = StubState {
            users: users.into_iter().map(|(u, p)| (u.into(), p.into())).collect(),
            next_id: 1,
            ..StubState::default()
        };
        Self { inner: Arc::new(RwLock::new(state)) }
    }

    /// Router serving the HTTP contract.
    pub fn router(&self) -> Router {
        let detail = format!("{CUSTOMERS_PATH}{{id}}/");
        Router::new()
            .route(HEALTH_PATH, get(health))
            .route(LOGIN_PATH, post(login))
            .route(LOGOUT_PATH, post(logout))
            .route(CUSTOMERS_PATH, get(list_customers).post(create_customer))
            .route(&detail, get(get_customer).put(update_customer).delete(delete_customer))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    /// Run the stub on the configured port.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound.
    pub async fn serve(&self, config: &StubConfig) -> Result<(), DevError> {
        super::serve(self.router(), config.port, "stub backend").await
    }

    /// Number of stored customers.
    pub async fn customer_count(&self) -> usize {
        self.inner.read().await.customers.len()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    async fn session_user(&self, jar: &CookieJar) -> Option<String> {
        let token = jar.get(SESSION_COOKIE).map(Cookie::value)?;
        self.inner.read().await.sessions.get(token).cloned()
    }

    async fn require_user(&self, jar: &CookieJar) -> Result<String, StubRejection> {
        self.session_user(jar).await.ok_or(StubRejection::NotAuthenticated)
    }
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Current UTC time as RFC 3339, the way the real backend serializes it.
fn timestamp_now() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

fn generate_session_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// REJECTIONS
// =============================================================================

enum StubRejection {
    NotAuthenticated,
    NotFound,
    Invalid(Value),
}

impl IntoResponse for StubRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => (
                StatusCode::FORBIDDEN,
                Json(json!({ "detail": "Authentication credentials were not provided." })),
            )
                .into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
            Self::Invalid(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        }
    }
}

// =============================================================================
// AUTH HANDLERS
// =============================================================================

async fn health() -> Json<Value> {
    Json(json!({ "message": "Server is up!" }))
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(
    State(stub): State<StubBackend>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), StubRejection> {
    let mut state = stub.inner.write().await;
    let valid = state
        .users
        .get(&req.username)
        .is_some_and(|password| *password == req.password);
    if !valid {
        return Err(StubRejection::Invalid(json!({
            "non_field_errors": ["Invalid username or password."]
        })));
    }

    let token = generate_session_token();
    state.sessions.insert(token.clone(), req.username.clone());
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(json!({ "username": req.username, "is_authenticated": true }))))
}

async fn logout(State(stub): State<StubBackend>, jar: CookieJar) -> Result<(CookieJar, Json<Value>), StubRejection> {
    stub.require_user(&jar).await?;
    if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) {
        stub.inner.write().await.sessions.remove(&token);
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(json!({ "detail": "Logged out" }))))
}

// =============================================================================
// CUSTOMER HANDLERS
// =============================================================================

#[derive(Deserialize)]
struct CustomerInput {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

impl CustomerInput {
    /// Per-field errors the way DRF reports them.
    fn errors(&self) -> Option<Value> {
        let mut errors = serde_json::Map::new();
        for (name, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
        ] {
            match value.as_deref() {
                None => {
                    errors.insert(name.to_owned(), json!(["This field is required."]));
                }
                Some(v) if v.trim().is_empty() => {
                    errors.insert(name.to_owned(), json!(["This field may not be blank."]));
                }
                Some(_) => {}
            }
        }
        if errors.is_empty() { None } else { Some(Value::Object(errors)) }
    }

    fn into_customer(self, id: i64, created_at: String, updated_at: String) -> Customer {
        Customer {
            id,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }
}

async fn list_customers(State(stub): State<StubBackend>) -> Json<Vec<Customer>> {
    Json(stub.inner.read().await.customers.values().cloned().collect())
}

async fn get_customer(State(stub): State<StubBackend>, Path(id): Path<i64>) -> Result<Json<Customer>, StubRejection> {
    stub.inner
        .read()
        .await
        .customers
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StubRejection::NotFound)
}

async fn create_customer(
    State(stub): State<StubBackend>,
    jar: CookieJar,
    Json(input): Json<CustomerInput>,
) -> Result<(StatusCode, Json<Customer>), StubRejection> {
    stub.require_user(&jar).await?;
    if let Some(errors) = input.errors() {
        return Err(StubRejection::Invalid(errors));
    }
    let mut state = stub.inner.write().await;
    let id = state.next_id;
    state.next_id += 1;
    let now = timestamp_now();
    let customer = input.into_customer(id, now.clone(), now);
    state.customers.insert(id, customer.clone());
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(stub): State<StubBackend>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Json(input): Json<CustomerInput>,
) -> Result<Json<Customer>, StubRejection> {
    stub.require_user(&jar).await?;
    let mut state = stub.inner.write().await;
    let Some(existing) = state.customers.get(&id) else {
        return Err(StubRejection::NotFound);
    };
    if let Some(errors) = input.errors() {
        return Err(StubRejection::Invalid(errors));
    }
    let now = timestamp_now();
    let created_at = existing.created_at.clone().unwrap_or_else(|| now.clone());
    let customer = input.into_customer(id, created_at, now);
    state.customers.insert(id, customer.clone());
    Ok(Json(customer))
}

async fn delete_customer(
    State(stub): State<StubBackend>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<StatusCode, StubRejection> {
    stub.require_user(&jar).await?;
    match stub.inner.write().await.customers.remove(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(StubRejection::NotFound),
    }
}

#[cfg(test)]
#[path = "stub_backend_test.rs"]
mod tests;
