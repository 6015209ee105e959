use super::*;
use crate::api::client::{CUSTOMERS_PATH, LOGIN_PATH};
use crate::customer::CustomerPayload;
use crate::test_support::{
    ADMIN_PASSWORD, ADMIN_USERNAME, client_for, closed_base_url, spawn_router, spawn_stub,
};
use axum::routing::get;

async fn proxied_stub() -> (crate::dev::stub_backend::StubBackend, String) {
    let (stub, upstream) = spawn_stub().await;
    let proxy = spawn_router(router(&upstream).unwrap()).await;
    (stub, proxy)
}

#[test]
fn hop_by_hop_headers_are_dropped() {
    let mut headers = HeaderMap::new();
    headers.insert(header::HOST, "localhost:3000".parse().unwrap());
    headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
    headers.insert(header::CONTENT_LENGTH, "12".parse().unwrap());
    headers.insert(header::COOKIE, "sessionid=abc".parse().unwrap());
    headers.append(header::SET_COOKIE, "a=1".parse().unwrap());
    headers.append(header::SET_COOKIE, "b=2".parse().unwrap());

    let out = forwardable(&headers);
    assert!(out.get(header::HOST).is_none());
    assert!(out.get(header::CONNECTION).is_none());
    assert!(out.get(header::CONTENT_LENGTH).is_none());
    assert_eq!(out.get(header::COOKIE).unwrap(), "sessionid=abc");
    assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
}

#[tokio::test]
async fn relays_set_cookie_from_login() {
    let (_stub, proxy) = proxied_stub().await;
    let resp = reqwest::Client::new()
        .post(format!("{proxy}{LOGIN_PATH}"))
        .json(&serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let cookie = resp
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("sessionid="));
}

#[tokio::test]
async fn client_session_works_through_proxy() {
    let (stub, proxy) = proxied_stub().await;
    let api = client_for(&proxy);
    api.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();

    let payload = CustomerPayload {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        email: "ada@example.com".to_owned(),
        phone: String::new(),
        address: String::new(),
    };
    let created = api.create_customer(&payload).await.unwrap();
    assert_eq!(created.first_name, "Ada");
    assert_eq!(stub.customer_count().await, 1);

    api.delete_customer(created.id).await.unwrap();
    assert_eq!(stub.customer_count().await, 0);
}

#[tokio::test]
async fn forwards_status_and_error_body() {
    let (_stub, proxy) = proxied_stub().await;
    let resp = reqwest::Client::new()
        .get(format!("{proxy}{CUSTOMERS_PATH}404/"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Not found.");
}

#[tokio::test]
async fn forwards_query_string() {
    let upstream = Router::new().route(
        "/api/echo",
        get(|req: Request| async move { req.uri().query().unwrap_or_default().to_owned() }),
    );
    let upstream = spawn_router(upstream).await;
    let proxy = spawn_router(router(&upstream).unwrap()).await;

    let text = reqwest::get(format!("{proxy}/api/echo?page=2&q=ada"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, "page=2&q=ada");
}

#[tokio::test]
async fn non_api_paths_are_not_proxied() {
    let (_stub, proxy) = proxied_stub().await;
    let resp = reqwest::get(format!("{proxy}/customers")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unreachable_target_is_bad_gateway() {
    let proxy = spawn_router(router(&closed_base_url().await).unwrap()).await;
    let resp = reqwest::get(format!("{proxy}/api/health/")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
}
