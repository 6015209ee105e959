use super::*;

fn draft(first: &str, last: &str, email: &str) -> CustomerDraft {
    CustomerDraft {
        first_name: first.to_owned(),
        last_name: last.to_owned(),
        email: email.to_owned(),
        ..CustomerDraft::default()
    }
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn validate_trims_all_fields() {
    let d = CustomerDraft {
        first_name: "  Ada ".to_owned(),
        last_name: " Lovelace".to_owned(),
        email: "ada@example.com  ".to_owned(),
        phone: " 555 ".to_owned(),
        address: "\t1 Analytical Way\n".to_owned(),
    };
    let payload = d.validate().unwrap();
    assert_eq!(payload.first_name, "Ada");
    assert_eq!(payload.last_name, "Lovelace");
    assert_eq!(payload.email, "ada@example.com");
    assert_eq!(payload.phone, "555");
    assert_eq!(payload.address, "1 Analytical Way");
}

#[test]
fn validate_rejects_missing_email() {
    let err = draft("A", "B", "").validate().unwrap_err();
    assert_eq!(err, ValidationError::MissingRequired);
    assert_eq!(err.to_string(), "First name, last name and email are required.");
}

#[test]
fn validate_rejects_whitespace_only_names() {
    assert!(draft("   ", "B", "a@b.com").validate().is_err());
    assert!(draft("A", "\t", "a@b.com").validate().is_err());
}

#[test]
fn validate_allows_empty_optional_fields() {
    let payload = draft("A", "B", "a@b.com").validate().unwrap();
    assert_eq!(payload.phone, "");
    assert_eq!(payload.address, "");
}

// =============================================================================
// set_field / From<&Customer>
// =============================================================================

#[test]
fn set_field_known_and_unknown() {
    let mut d = CustomerDraft::default();
    assert!(d.set_field("email", "x@y.z"));
    assert!(d.set_field("address", "Main St"));
    assert!(!d.set_field("id", "7"));
    assert_eq!(d.email, "x@y.z");
    assert_eq!(d.address, "Main St");
}

#[test]
fn draft_from_customer_copies_writable_fields() {
    let customer = Customer {
        id: 3,
        first_name: "A".to_owned(),
        last_name: "B".to_owned(),
        email: "a@b.com".to_owned(),
        phone: "1".to_owned(),
        address: "2".to_owned(),
        created_at: Some("2024-01-01T00:00:00Z".to_owned()),
        updated_at: None,
    };
    let d = CustomerDraft::from(&customer);
    assert_eq!(d.validate().unwrap().to_json(), serde_json::json!({
        "first_name": "A", "last_name": "B", "email": "a@b.com", "phone": "1", "address": "2"
    }));
}

// =============================================================================
// serde
// =============================================================================

#[test]
fn customer_deserializes_null_and_missing_optionals() {
    let customer: Customer = serde_json::from_value(serde_json::json!({
        "id": 9,
        "first_name": "A",
        "last_name": "B",
        "email": "a@b.com",
        "phone": null,
    }))
    .unwrap();
    assert_eq!(customer.phone, "");
    assert_eq!(customer.address, "");
    assert_eq!(customer.created_at, None);
}

#[test]
fn customer_requires_id() {
    let result = serde_json::from_value::<Customer>(serde_json::json!({ "first_name": "A" }));
    assert!(result.is_err());
}
