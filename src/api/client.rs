//! Cookie-session HTTP client for the customer records backend.
//!
//! DESIGN
//! ======
//! Every operation funnels through [`ApiClient::request`]: JSON content type,
//! shared cookie jar, body read as text first, then normalized into
//! [`ApiBody`] or [`ApiError`]. No retries, no caching; each call is exactly
//! one round trip.
//!
//! Clones share the same connection pool and cookie jar, so the session
//! cookie set by `login` rides along on every later call from any clone.
//! [`ApiClient::with_cookie_jar`] swaps the in-memory jar for a persisted one.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::debug;

use super::cookies::PersistentCookieJar;
use super::types::{ApiBody, ApiError};
use crate::config::ApiConfig;
use crate::customer::{Customer, CustomerPayload};

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const LOGOUT_PATH: &str = "/api/auth/logout/";
pub const HEALTH_PATH: &str = "/api/health/";
pub const CUSTOMERS_PATH: &str = "/api/customers/";

/// Detail path for one customer, e.g. `/api/customers/7/`.
#[must_use]
pub fn customer_path(id: i64) -> String {
    format!("{CUSTOMERS_PATH}{id}/")
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::build(config, reqwest::Client::builder().cookie_store(true))
    }

    /// Build a client whose cookies live in `jar`, so a session cookie set
    /// in one run is still sent after a restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_cookie_jar(config: &ApiConfig, jar: Arc<PersistentCookieJar>) -> Result<Self, ApiError> {
        Self::build(config, reqwest::Client::builder().cookie_provider(jar))
    }

    fn build(config: &ApiConfig, builder: reqwest::ClientBuilder) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = builder
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    /// Send one request and normalize the response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if no response arrived and
    /// [`ApiError::Status`] for any non-2xx status.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiBody, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let parsed = ApiBody::parse(text);

        debug!(%method, path, status = status.as_u16(), "api request");
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), parsed));
        }
        Ok(parsed)
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// `POST /api/auth/login/`. The body is the backend's user object, if any.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<ApiBody, ApiError> {
        let body = json!({ "username": username, "password": password });
        self.request(Method::POST, LOGIN_PATH, Some(&body)).await
    }

    /// `POST /api/auth/logout/`.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors unchanged.
    pub async fn logout(&self) -> Result<ApiBody, ApiError> {
        self.request(Method::POST, LOGOUT_PATH, None).await
    }

    /// `GET /api/health/`.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors unchanged.
    pub async fn health(&self) -> Result<ApiBody, ApiError> {
        self.request(Method::GET, HEALTH_PATH, None).await
    }

    // =========================================================================
    // CUSTOMERS
    // =========================================================================

    /// `GET /api/customers/`. A success body that is not an array yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors; [`ApiError::Decode`] if an
    /// array element is not a customer.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        match self.request(Method::GET, CUSTOMERS_PATH, None).await? {
            ApiBody::Json(Value::Array(items)) => items.into_iter().map(decode_customer_value).collect(),
            _ => Ok(Vec::new()),
        }
    }

    /// `GET /api/customers/{id}/`.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors; [`ApiError::Decode`] if the
    /// body is not a customer.
    pub async fn get_customer(&self, id: i64) -> Result<Customer, ApiError> {
        let body = self.request(Method::GET, &customer_path(id), None).await?;
        decode_customer(body)
    }

    /// `POST /api/customers/`.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors; [`ApiError::Decode`] if the
    /// body is not a customer.
    pub async fn create_customer(&self, payload: &CustomerPayload) -> Result<Customer, ApiError> {
        let body = self
            .request(Method::POST, CUSTOMERS_PATH, Some(&payload.to_json()))
            .await?;
        decode_customer(body)
    }

    /// `PUT /api/customers/{id}/` (full replace).
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors; [`ApiError::Decode`] if the
    /// body is not a customer.
    pub async fn update_customer(&self, id: i64, payload: &CustomerPayload) -> Result<Customer, ApiError> {
        let body = self
            .request(Method::PUT, &customer_path(id), Some(&payload.to_json()))
            .await?;
        decode_customer(body)
    }

    /// `DELETE /api/customers/{id}/`.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors unchanged.
    pub async fn delete_customer(&self, id: i64) -> Result<ApiBody, ApiError> {
        self.request(Method::DELETE, &customer_path(id), None).await
    }
}

fn decode_customer(body: ApiBody) -> Result<Customer, ApiError> {
    match body {
        ApiBody::Json(value) => decode_customer_value(value),
        other => Err(ApiError::Decode(format!("expected customer object, got {}", other.kind()))),
    }
}

fn decode_customer_value(value: Value) -> Result<Customer, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
