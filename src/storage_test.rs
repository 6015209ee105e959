use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("customer-manager-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

// =============================================================================
// FileStore
// =============================================================================

#[test]
fn file_store_missing_key_is_none() {
    let store = FileStore::new(scratch_dir("missing"));
    assert!(store.get("auth_user").unwrap().is_none());
}

#[test]
fn file_store_set_creates_dir_and_reads_back() {
    let dir = scratch_dir("roundtrip");
    let store = FileStore::new(&dir);
    store.set("auth_user", r#"{"username":"alice"}"#).unwrap();
    assert!(dir.join("auth_user.json").exists());
    assert_eq!(store.get("auth_user").unwrap().as_deref(), Some(r#"{"username":"alice"}"#));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_store_set_overwrites() {
    let dir = scratch_dir("overwrite");
    let store = FileStore::new(&dir);
    store.set("k", "one").unwrap();
    store.set("k", "two").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_store_remove_is_idempotent() {
    let dir = scratch_dir("remove");
    let store = FileStore::new(&dir);
    store.set("k", "v").unwrap();
    store.remove("k").unwrap();
    store.remove("k").unwrap();
    assert!(store.get("k").unwrap().is_none());
    let _ = std::fs::remove_dir_all(&dir);
}

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_roundtrip_and_remove() {
    let store = MemoryStore::new();
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    store.remove("k").unwrap();
    assert!(store.get("k").unwrap().is_none());
}

#[test]
fn memory_store_failing_mode_errors_everywhere() {
    let store = MemoryStore::new();
    store.set("k", "v").unwrap();
    store.set_failing(true);
    assert!(matches!(store.get("k"), Err(StorageError::Unavailable)));
    assert!(matches!(store.set("k", "w"), Err(StorageError::Unavailable)));
    assert!(matches!(store.remove("k"), Err(StorageError::Unavailable)));
    store.set_failing(false);
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
}
