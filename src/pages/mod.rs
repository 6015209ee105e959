//! Page models for the route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns its form and message state and calls the API client or
//! session controller directly. Rendering is left to the caller; a page
//! reports where to go next by returning a [`Navigation`].

pub mod customer_form;
pub mod customer_list;
pub mod login;

pub use customer_form::{CustomerFormPage, FormMode};
pub use customer_list::CustomerListPage;
pub use login::LoginPage;

use crate::api::ApiError;
pub use crate::routes::Navigation;

/// Message a page shows for a failed call: the error's own message when
/// it has one, otherwise `fallback`.
pub(crate) fn failure_message(err: &ApiError, fallback: &str) -> String {
    let message = err.to_string();
    if message.is_empty() { fallback.to_owned() } else { message }
}
