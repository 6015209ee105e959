use super::*;
use crate::api::ApiClient;
use crate::config::ApiConfig;
use crate::customer::CustomerPayload;
use crate::storage::MemoryStore;
use crate::test_support::{ADMIN_PASSWORD, ADMIN_USERNAME, spawn_stub};

fn origin() -> Url {
    Url::parse("http://127.0.0.1:8000/api/auth/login/").unwrap()
}

fn receive(jar: &PersistentCookieJar, headers: &[&'static str]) {
    let values: Vec<HeaderValue> = headers.iter().copied().map(HeaderValue::from_static).collect();
    jar.set_cookies(&mut values.iter(), &origin());
}

fn sent(jar: &PersistentCookieJar) -> Option<String> {
    jar.cookies(&origin()).map(|v| v.to_str().unwrap().to_owned())
}

fn payload() -> CustomerPayload {
    CustomerPayload {
        first_name: "A".to_owned(),
        last_name: "B".to_owned(),
        email: "a@b.com".to_owned(),
        phone: String::new(),
        address: String::new(),
    }
}

// =============================================================================
// jar behavior
// =============================================================================

#[test]
fn set_cookie_is_sent_and_persisted() {
    let store = Arc::new(MemoryStore::new());
    let jar = PersistentCookieJar::load(store.clone());
    assert_eq!(sent(&jar), None);

    receive(&jar, &["sessionid=abc; Path=/; HttpOnly; SameSite=Lax", "csrftoken=xyz; Path=/"]);
    assert_eq!(sent(&jar).as_deref(), Some("csrftoken=xyz; sessionid=abc"));
    assert_eq!(
        store.get(COOKIES_KEY).unwrap().as_deref(),
        Some(r#"{"csrftoken":"xyz","sessionid":"abc"}"#)
    );
}

#[test]
fn expired_cookie_is_dropped_from_jar_and_store() {
    let store = Arc::new(MemoryStore::new());
    let jar = PersistentCookieJar::load(store.clone());
    receive(&jar, &["sessionid=abc; Path=/"]);

    receive(&jar, &["sessionid=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"]);
    assert_eq!(jar.get("sessionid"), None);
    assert_eq!(sent(&jar), None);
    assert!(store.get(COOKIES_KEY).unwrap().is_none());
}

#[test]
fn load_restores_cookies_from_store() {
    let store = Arc::new(MemoryStore::new());
    store.set(COOKIES_KEY, r#"{"sessionid":"abc"}"#).unwrap();
    let jar = PersistentCookieJar::load(store);
    assert_eq!(jar.get("sessionid").as_deref(), Some("abc"));
    assert_eq!(sent(&jar).as_deref(), Some("sessionid=abc"));
}

#[test]
fn corrupt_or_unreadable_store_starts_empty() {
    let store = Arc::new(MemoryStore::new());
    store.set(COOKIES_KEY, "not json").unwrap();
    assert_eq!(sent(&PersistentCookieJar::load(store)), None);

    let failing = Arc::new(MemoryStore::new());
    failing.set_failing(true);
    let jar = PersistentCookieJar::load(failing);
    receive(&jar, &["sessionid=abc"]);
    assert_eq!(jar.get("sessionid").as_deref(), Some("abc"));
}

#[test]
fn unparseable_header_is_ignored() {
    let jar = PersistentCookieJar::load(Arc::new(MemoryStore::new()));
    receive(&jar, &["no equals sign here"]);
    assert_eq!(sent(&jar), None);
}

// =============================================================================
// across restarts
// =============================================================================

#[tokio::test]
async fn session_cookie_survives_client_restart() {
    let (stub, base) = spawn_stub().await;
    let config = ApiConfig::new(&base);
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());

    let first = ApiClient::with_cookie_jar(&config, Arc::new(PersistentCookieJar::load(store.clone()))).unwrap();
    first.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    drop(first);

    let restarted = ApiClient::with_cookie_jar(&config, Arc::new(PersistentCookieJar::load(store.clone()))).unwrap();
    restarted.create_customer(&payload()).await.unwrap();
    assert_eq!(stub.customer_count().await, 1);

    restarted.logout().await.unwrap();
    assert!(store.get(COOKIES_KEY).unwrap().is_none());
}

#[tokio::test]
async fn plain_client_loses_session_on_restart() {
    let (_stub, base) = spawn_stub().await;
    let config = ApiConfig::new(&base);
    let first = ApiClient::new(&config).unwrap();
    first.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();

    let restarted = ApiClient::new(&config).unwrap();
    let err = restarted.create_customer(&payload()).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}
