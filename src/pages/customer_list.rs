//! Customer list with per-row delete.

use super::{Navigation, failure_message};
use crate::api::ApiClient;
use crate::customer::Customer;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load customers";
pub const DELETE_FAILED_MESSAGE: &str = "Delete failed";
pub const DELETED_MESSAGE: &str = "Customer deleted.";
pub const EMPTY_MESSAGE: &str = "No customers yet.";

pub struct CustomerListPage {
    api: ApiClient,
    pub items: Vec<Customer>,
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl CustomerListPage {
    /// A fresh page starts in the loading state until [`Self::load`] runs.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, items: Vec::new(), loading: true, error: None, success: None }
    }

    /// Refetch the whole list. Nothing is cached across loads.
    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;
        match self.api.list_customers().await {
            Ok(items) => self.items = items,
            Err(e) => self.error = Some(failure_message(&e, LOAD_FAILED_MESSAGE)),
        }
        self.loading = false;
    }

    /// Delete one customer and drop its row locally on success.
    ///
    /// Returns [`Navigation::Login`] when the backend rejects the session.
    pub async fn delete(&mut self, id: i64) -> Option<Navigation> {
        self.error = None;
        self.success = None;
        match self.api.delete_customer(id).await {
            Ok(_) => {
                self.success = Some(DELETED_MESSAGE.to_owned());
                self.items.retain(|c| c.id != id);
                None
            }
            Err(e) => {
                self.error = Some(failure_message(&e, DELETE_FAILED_MESSAGE));
                e.is_auth_failure().then_some(Navigation::Login)
            }
        }
    }

    /// Placeholder row text, shown only once loading finished with no rows.
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        (!self.loading && self.items.is_empty()).then_some(EMPTY_MESSAGE)
    }
}

#[cfg(test)]
#[path = "customer_list_test.rs"]
mod tests;
