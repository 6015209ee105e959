//! Response body and error types shared by every API operation.

use std::num::FpCategory;

use serde_json::Value;

/// Message used when an error body carries neither `detail` nor `error`.
pub const FALLBACK_ERROR_MESSAGE: &str = "Request failed";

// =============================================================================
// BODY
// =============================================================================

/// A response body, decoded as far as it allows.
///
/// Successful responses never fail on malformed JSON; the raw text is kept
/// instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    /// The response had no body.
    Empty,
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not valid JSON.
    Text(String),
}

impl ApiBody {
    /// Classify raw response text.
    #[must_use]
    pub fn parse(text: String) -> Self {
        if text.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Field of a JSON object body rendered as message text.
    ///
    /// Strings are used as-is; numbers, `true`, arrays and objects are
    /// rendered. Missing fields, `null`, `false`, zero and anything that
    /// renders empty yield `None`.
    #[must_use]
    pub fn message_field(&self, key: &str) -> Option<String> {
        self.as_json()
            .and_then(|v| v.get(key))
            .and_then(render_message)
            .filter(|s| !s.is_empty())
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty body",
            Self::Json(Value::Array(_)) => "JSON array",
            Self::Json(Value::Object(_)) => "JSON object",
            Self::Json(_) => "JSON scalar",
            Self::Text(_) => "non-JSON text",
        }
    }
}

/// Pick the user-facing message for an error body: `detail`, then `error`,
/// then [`FALLBACK_ERROR_MESSAGE`].
#[must_use]
pub fn error_message(body: &ApiBody) -> String {
    body.message_field("detail")
        .or_else(|| body.message_field("error"))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_owned())
}

/// Render a JSON value as message text; falsy values render as `None`.
/// Arrays join their elements with `,` (DRF field errors are lists).
fn render_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_owned()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            let falsy = n
                .as_f64()
                .is_some_and(|f| matches!(f.classify(), FpCategory::Zero | FpCategory::Nan));
            (!falsy).then(|| n.to_string())
        }
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| render_message(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by API client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String, body: ApiBody },

    /// A successful body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Build a status error, deriving the message from the body.
    #[must_use]
    pub fn from_status(status: u16, body: ApiBody) -> Self {
        let message = error_message(&body);
        Self::Status { status, message, body }
    }

    /// HTTP status for backend errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw error body for backend errors.
    #[must_use]
    pub fn body(&self) -> Option<&ApiBody> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The body's `detail` field as text, if the backend sent one.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        self.body().and_then(|b| b.message_field("detail"))
    }

    /// True for 401/403, which callers answer by sending the user to login.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
