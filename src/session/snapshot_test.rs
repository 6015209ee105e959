use super::*;
use crate::storage::MemoryStore;
use serde_json::json;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// =============================================================================
// UserSnapshot
// =============================================================================

#[test]
fn from_username_holds_only_username() {
    let user = UserSnapshot::from_username("alice");
    assert_eq!(user.to_json(), json!({ "username": "alice" }));
    assert_eq!(user.username(), Some("alice"));
}

#[test]
fn display_name_falls_back_to_user() {
    let no_name = UserSnapshot::from_fields(object(json!({ "role": "admin" })));
    assert_eq!(no_name.display_name(), "user");
    let blank = UserSnapshot::from_username("");
    assert_eq!(blank.display_name(), "user");
    assert_eq!(UserSnapshot::from_username("bob").display_name(), "bob");
}

#[test]
fn serializes_transparently() {
    let user = UserSnapshot::from_fields(object(json!({ "username": "alice", "role": "admin" })));
    let text = serde_json::to_string(&user).unwrap();
    let back: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(back, json!({ "username": "alice", "role": "admin" }));
}

// =============================================================================
// LoginResponse
// =============================================================================

#[test]
fn classify_object_is_structured() {
    let body = ApiBody::Json(json!({ "username": "alice", "is_authenticated": true }));
    let response = LoginResponse::classify(body);
    assert!(matches!(response, LoginResponse::StructuredUser(_)));
    let user = response.into_snapshot("ignored");
    assert_eq!(user.to_json(), json!({ "username": "alice", "is_authenticated": true }));
}

#[test]
fn classify_non_objects_are_unstructured() {
    for body in [
        ApiBody::Empty,
        ApiBody::Text("ok".to_owned()),
        ApiBody::Json(json!(["alice"])),
        ApiBody::Json(json!("alice")),
        ApiBody::Json(Value::Null),
    ] {
        let response = LoginResponse::classify(body);
        assert_eq!(response, LoginResponse::Unstructured);
        assert_eq!(response.into_snapshot("carol").to_json(), json!({ "username": "carol" }));
    }
}

// =============================================================================
// load / persist
// =============================================================================

#[test]
fn load_missing_is_none() {
    let store = MemoryStore::new();
    assert!(load_snapshot(&store).unwrap().is_none());
}

#[test]
fn load_valid_object() {
    let store = MemoryStore::new();
    store.set(SNAPSHOT_KEY, r#"{"username":"dave","id":4}"#).unwrap();
    let user = load_snapshot(&store).unwrap().unwrap();
    assert_eq!(user.to_json(), json!({ "username": "dave", "id": 4 }));
}

#[test]
fn load_corrupt_or_non_object_is_none() {
    let store = MemoryStore::new();
    store.set(SNAPSHOT_KEY, "{not json").unwrap();
    assert!(load_snapshot(&store).unwrap().is_none());
    store.set(SNAPSHOT_KEY, "null").unwrap();
    assert!(load_snapshot(&store).unwrap().is_none());
    store.set(SNAPSHOT_KEY, "\"dave\"").unwrap();
    assert!(load_snapshot(&store).unwrap().is_none());
}

#[test]
fn load_propagates_store_failure() {
    let store = MemoryStore::new();
    store.set_failing(true);
    assert!(load_snapshot(&store).is_err());
}

#[test]
fn persist_some_then_none() {
    let store = MemoryStore::new();
    let user = UserSnapshot::from_username("erin");
    persist_snapshot(&store, Some(&user)).unwrap();
    let raw = store.get(SNAPSHOT_KEY).unwrap().unwrap();
    assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), json!({ "username": "erin" }));
    persist_snapshot(&store, None).unwrap();
    assert!(store.get(SNAPSHOT_KEY).unwrap().is_none());
}
