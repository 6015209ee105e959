//! Add/edit customer form.
//!
//! Edit mode loads the record into the draft first. Submit validates
//! locally before any request, then creates or fully replaces the record.

use super::{Navigation, failure_message};
use crate::api::{ApiClient, ApiError};
use crate::customer::CustomerDraft;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load customer";
pub const SAVE_FAILED_MESSAGE: &str = "Save failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(i64),
}

pub struct CustomerFormPage {
    api: ApiClient,
    pub mode: FormMode,
    pub values: CustomerDraft,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
}

impl CustomerFormPage {
    #[must_use]
    pub fn new(api: ApiClient, mode: FormMode) -> Self {
        Self {
            api,
            mode,
            values: CustomerDraft::default(),
            loading: matches!(mode, FormMode::Edit(_)),
            saving: false,
            error: None,
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add customer",
            FormMode::Edit(_) => "Edit customer",
        }
    }

    /// Prefill the draft from the backend in edit mode; no-op in add mode.
    pub async fn load(&mut self) {
        let FormMode::Edit(id) = self.mode else {
            return;
        };
        match self.api.get_customer(id).await {
            Ok(customer) => self.values = CustomerDraft::from(&customer),
            Err(e) => self.error = Some(failure_message(&e, LOAD_FAILED_MESSAGE)),
        }
        self.loading = false;
    }

    /// Validate and save. Returns [`Navigation::Home`] on success.
    pub async fn submit(&mut self) -> Option<Navigation> {
        self.error = None;
        let payload = match self.values.validate() {
            Ok(payload) => payload,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        self.saving = true;
        let result = match self.mode {
            FormMode::Add => self.api.create_customer(&payload).await,
            FormMode::Edit(id) => self.api.update_customer(id, &payload).await,
        };
        self.saving = false;

        match result {
            // A 2xx whose body is not a customer still means the write landed.
            Ok(_) | Err(ApiError::Decode(_)) => Some(Navigation::Home),
            Err(e) => {
                self.error = Some(failure_message(&e, SAVE_FAILED_MESSAGE));
                None
            }
        }
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.saving { "Saving..." } else { "Save" }
    }
}

#[cfg(test)]
#[path = "customer_form_test.rs"]
mod tests;
