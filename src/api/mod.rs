//! HTTP access to the customer records backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `client` turns typed operations into exactly one HTTP round trip each,
//! and `types` holds the normalized body and error shapes every caller
//! branches on (for example 401/403 driving a redirect to login).
//! `cookies` keeps the session cookie across restarts.

pub mod client;
pub mod cookies;
pub mod types;

pub use client::ApiClient;
pub use cookies::PersistentCookieJar;
pub use types::{ApiBody, ApiError};
