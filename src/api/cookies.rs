//! Cookie jar that survives restarts.
//!
//! The backend authenticates writes with an HttpOnly session cookie. The
//! default reqwest jar lives only as long as the process, so a restarted
//! shell would restore the user snapshot but send no cookie. This jar keeps
//! its cookies in a [`KeyValueStore`] slot next to the snapshot.
//!
//! The client talks to a single origin, so cookies are keyed by name only;
//! domain and path attributes are not tracked.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum_extra::extract::cookie::Cookie;
use reqwest::Url;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the persisted cookies.
pub const COOKIES_KEY: &str = "session_cookies";

pub struct PersistentCookieJar {
    store: Arc<dyn KeyValueStore>,
    cookies: Mutex<BTreeMap<String, String>>,
}

impl PersistentCookieJar {
    /// Jar seeded from `store`. An unreadable or corrupt slot starts empty.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let cookies = match read_cookies(store.as_ref()) {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!(error = %e, "persisted cookies unreadable; starting with an empty jar");
                BTreeMap::new()
            }
        };
        Self { store, cookies: Mutex::new(cookies) }
    }

    /// Value of the cookie `name`, if held.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn persist(&self, cookies: &BTreeMap<String, String>) {
        let result = if cookies.is_empty() {
            self.store.remove(COOKIES_KEY)
        } else {
            serde_json::to_string(cookies)
                .map_err(StorageError::from)
                .and_then(|raw| self.store.set(COOKIES_KEY, &raw))
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist cookies");
        }
    }
}

fn read_cookies(store: &dyn KeyValueStore) -> Result<BTreeMap<String, String>, StorageError> {
    match store.get(COOKIES_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(BTreeMap::new()),
    }
}

/// A `Set-Cookie` that clears the cookie rather than setting it.
fn is_removal(cookie: &Cookie<'_>) -> bool {
    cookie.value().is_empty()
        || cookie.max_age().is_some_and(|age| age.is_zero() || age.is_negative())
        || cookie
            .expires_datetime()
            .is_some_and(|at| at <= OffsetDateTime::now_utc())
}

impl CookieStore for PersistentCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &Url) {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let mut changed = false;
        for header in cookie_headers {
            let Some(cookie) = header.to_str().ok().and_then(|raw| Cookie::parse(raw.to_owned()).ok()) else {
                continue;
            };
            if is_removal(&cookie) {
                changed |= cookies.remove(cookie.name()).is_some();
            } else {
                let previous = cookies.insert(cookie.name().to_owned(), cookie.value().to_owned());
                changed |= previous.as_deref() != Some(cookie.value());
            }
        }
        if changed {
            debug!(count = cookies.len(), "cookie jar updated");
            self.persist(&cookies);
        }
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        if cookies.is_empty() {
            return None;
        }
        let joined = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
