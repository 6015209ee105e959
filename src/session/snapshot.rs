//! User snapshot: the display-only copy of who is signed in.
//!
//! The snapshot is a cache, not a credential. It seeds the session at
//! startup and is never checked against the server; the session cookie is
//! what actually authenticates requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::ApiBody;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the persisted snapshot.
pub const SNAPSHOT_KEY: &str = "auth_user";

const FALLBACK_DISPLAY_NAME: &str = "user";

/// The backend's user object, with every field preserved as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserSnapshot(Map<String, Value>);

impl UserSnapshot {
    /// Minimal snapshot holding only a username.
    #[must_use]
    pub fn from_username(username: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("username".to_owned(), Value::String(username.to_owned()));
        Self(fields)
    }

    #[must_use]
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.0.get("username").and_then(Value::as_str)
    }

    /// Name for "Signed in as ..." labels.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_DISPLAY_NAME)
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

// =============================================================================
// LOGIN RESPONSE
// =============================================================================

/// A successful login body, classified once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginResponse {
    /// The backend returned a user object.
    StructuredUser(Map<String, Value>),
    /// Anything else: empty body, text, array, scalar.
    Unstructured,
}

impl LoginResponse {
    #[must_use]
    pub fn classify(body: ApiBody) -> Self {
        match body {
            ApiBody::Json(Value::Object(fields)) => Self::StructuredUser(fields),
            _ => Self::Unstructured,
        }
    }

    /// Canonical snapshot; unstructured responses get `{username}`.
    #[must_use]
    pub fn into_snapshot(self, username: &str) -> UserSnapshot {
        match self {
            Self::StructuredUser(fields) => UserSnapshot::from_fields(fields),
            Self::Unstructured => UserSnapshot::from_username(username),
        }
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Read the persisted snapshot. Missing, unparseable, or non-object values
/// yield `Ok(None)`.
///
/// # Errors
///
/// Returns an error only if the store itself fails.
pub fn load_snapshot(store: &dyn KeyValueStore) -> Result<Option<UserSnapshot>, StorageError> {
    let Some(raw) = store.get(SNAPSHOT_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(fields)) => Ok(Some(UserSnapshot::from_fields(fields))),
        Ok(_) => Ok(None),
        Err(e) => {
            debug!(error = %e, "ignoring unparseable session snapshot");
            Ok(None)
        }
    }
}

/// Write `user` to the snapshot slot, or clear the slot when `None`.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn persist_snapshot(store: &dyn KeyValueStore, user: Option<&UserSnapshot>) -> Result<(), StorageError> {
    match user {
        Some(user) => store.set(SNAPSHOT_KEY, &serde_json::to_string(user)?),
        None => store.remove(SNAPSHOT_KEY),
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
