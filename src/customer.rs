//! Customer record, write payload, and local form validation.
//!
//! DESIGN
//! ======
//! `Customer` is what the backend returns; `CustomerPayload` is what create
//! and update send (full replace, no id); `CustomerDraft` holds raw form
//! input until `validate` trims it and checks the required fields. Validation
//! happens before any network call.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

pub const REQUIRED_FIELDS_MESSAGE: &str = "First name, last name and email are required.";

/// A customer as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Server-assigned, immutable.
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    /// Read-only backend timestamps; never sent back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Writable customer fields sent by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl CustomerPayload {
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "first_name": self.first_name,
            "last_name": self.last_name,
            "email": self.email,
            "phone": self.phone,
            "address": self.address,
        })
    }
}

/// Local validation failure; detected before contacting the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{}", REQUIRED_FIELDS_MESSAGE)]
    MissingRequired,
}

/// Raw, untrimmed form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl CustomerDraft {
    /// Trim every field and require first name, last name and email.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequired`] if any required field is
    /// blank after trimming.
    pub fn validate(&self) -> Result<CustomerPayload, ValidationError> {
        let payload = CustomerPayload {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            address: self.address.trim().to_owned(),
        };
        if payload.first_name.is_empty() || payload.last_name.is_empty() || payload.email.is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        Ok(payload)
    }

    /// Set a field by its wire name. Returns `false` for unknown names.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        let slot = match name {
            "first_name" => &mut self.first_name,
            "last_name" => &mut self.last_name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "address" => &mut self.address,
            _ => return false,
        };
        value.clone_into(slot);
        true
    }
}

impl From<&Customer> for CustomerDraft {
    fn from(customer: &Customer) -> Self {
        Self {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
        }
    }
}

#[cfg(test)]
#[path = "customer_test.rs"]
mod tests;
