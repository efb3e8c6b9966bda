//! HTTP-level tests of the router.
//!
//! Run with: cargo test --test routes_test

mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use std::sync::atomic::Ordering;
use tower::ServiceExt;

use coop_dashboard::poller;
use coop_dashboard::routes::build_router;

use common::{FakeBackend, sample_users, spawn_backend, state_for, unreachable_backend};

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn healthz_reports_loading_state() {
    let state = state_for(&unreachable_backend().await);
    let response = send(build_router(state), get("/healthz")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["snapshot_generation"], 0);
}

#[tokio::test]
async fn dashboard_shows_loading_before_first_poll() {
    let state = state_for(&unreachable_backend().await);
    let response = send(build_router(state), get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let html = body_text(response).await;
    assert!(html.contains("Loading dashboard…"));
    assert!(html.contains("Smart Poultry House"));
}

#[tokio::test]
async fn dashboard_shows_warnings_and_mock_cards_when_backend_down() {
    let state = state_for(&unreachable_backend().await);
    assert!(poller::poll_once(&state).await);

    let html = body_text(send(build_router(state), get("/")).await).await;

    assert!(html.contains(r#"<div class="warning">Live readings unavailable"#));
    assert!(html.contains("mock-coop-1"));
    assert!(html.contains("26.4 °C"));
    assert_eq!(html.matches("(simulated)").count(), 4);
    assert_eq!(html.matches("<svg").count(), 4);
}

#[tokio::test]
async fn dashboard_rejects_unknown_range() {
    let state = state_for(&unreachable_backend().await);
    let response = send(build_router(state), get("/?range=1y")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_endpoint_serves_ranges() {
    let state = state_for(&unreachable_backend().await);
    let app = build_router(state);

    let bogus = send(app.clone(), get("/api/history?range=bogus")).await;
    assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
    let error = body_json(bogus).await;
    assert!(error["error"].as_str().unwrap().contains("bogus"));

    let week = send(app, get("/api/history?range=7d")).await;
    assert_eq!(week.status(), StatusCode::OK);
    let body = body_json(week).await;
    assert_eq!(body["range"], "7d");
    assert_eq!(body["series"].as_array().unwrap().len(), 4);
    assert_eq!(body["series"][0]["source"], "mock");
    assert_eq!(body["series"][0]["points"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn snapshot_endpoint_returns_latest_poll() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = json!([{"deviceId": "coop-1", "temperature": 31.5}]);
    let state = state_for(&spawn_backend(fake).await);
    let app = build_router(state);

    let refresh = Request::builder()
        .method(Method::POST)
        .uri("/api/refresh")
        .body(Body::empty())
        .unwrap();
    let refreshed = body_json(send(app.clone(), refresh).await).await;
    assert_eq!(refreshed["accepted"], true);

    let snapshot = body_json(send(app, get("/api/snapshot")).await).await;
    assert_eq!(snapshot["generation"], 1);
    assert_eq!(snapshot["source"], "live");
    assert_eq!(snapshot["readings"][0]["deviceId"], "coop-1");
    assert_eq!(snapshot["readings"][0]["temperature"], 31.5);
}

#[tokio::test]
async fn unconfirmed_api_delete_is_rejected_without_backend_call() {
    let fake = FakeBackend::with_users(sample_users());
    let state = state_for(&spawn_backend(fake.clone()).await);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/users/u1")
        .body(Body::empty())
        .unwrap();
    let response = send(build_router(state), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fake.user_requests(), 0);
    assert_eq!(fake.stored_users().len(), 2);
}

#[tokio::test]
async fn confirmed_api_delete_returns_refreshed_list() {
    let fake = FakeBackend::with_users(sample_users());
    let state = state_for(&spawn_backend(fake.clone()).await);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/users/u2?confirm=true")
        .body(Body::empty())
        .unwrap();
    let response = send(build_router(state), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["stats"]["technicians"], 0);
}

#[tokio::test]
async fn api_create_validates_before_calling_backend() {
    let fake = FakeBackend::with_users(sample_users());
    let state = state_for(&spawn_backend(fake.clone()).await);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Fatou","email":"fatou@farm.test"}"#))
        .unwrap();
    let response = send(build_router(state), request).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing required field: password");
    assert_eq!(fake.user_requests(), 0);
}

#[tokio::test]
async fn users_api_maps_backend_outage_to_bad_gateway() {
    let state = state_for(&unreachable_backend().await);
    let response = send(build_router(state), get("/api/users")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn users_page_lists_accounts_and_stats() {
    let fake = FakeBackend::with_users(sample_users());
    let state = state_for(&spawn_backend(fake).await);

    let html = body_text(send(build_router(state), get("/users")).await).await;

    assert!(html.contains("Awa Diop"));
    assert!(html.contains("moussa@farm.test"));
    assert!(html.contains("Total users"));
    assert!(html.contains(r#"action="/users/u1/delete""#));
}

#[tokio::test]
async fn unticked_delete_form_keeps_user() {
    let fake = FakeBackend::with_users(sample_users());
    let state = state_for(&spawn_backend(fake.clone()).await);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users/u1/delete")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::empty())
        .unwrap();
    let html = body_text(send(build_router(state), request).await).await;

    assert!(html.contains("Deletion cancelled"));
    assert_eq!(fake.user_requests(), 0);
    assert_eq!(fake.stored_users().len(), 2);
}

#[tokio::test]
async fn create_form_shows_backend_message() {
    let fake = FakeBackend::with_users(sample_users());
    *fake.reject_writes.lock().unwrap() = Some("Email already in use".to_string());
    let state = state_for(&spawn_backend(fake).await);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "name=Awa&email=awa%40farm.test&password=pw&role=admin",
        ))
        .unwrap();
    let html = body_text(send(build_router(state), request).await).await;

    assert!(html.contains("Email already in use"));
}

#[tokio::test]
async fn logout_clears_cookie_and_redirects() {
    let state = state_for(&unreachable_backend().await);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/logout")
        .body(Body::empty())
        .unwrap();
    let response = send(build_router(state), request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("coop_user=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn user_cookie_is_shown_in_header() {
    let state = state_for(&unreachable_backend().await);
    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, "theme=dark; coop_user=Alice")
        .body(Body::empty())
        .unwrap();
    let html = body_text(send(build_router(state), request).await).await;

    assert!(html.contains("Signed in as Alice"));
}

#[tokio::test]
async fn updating_unknown_user_is_not_found() {
    let fake = FakeBackend::with_users(sample_users());
    let state = state_for(&spawn_backend(fake).await);

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/users/u404")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"name":"Ghost","email":"ghost@farm.test","role":"user"}"#,
        ))
        .unwrap();
    let response = send(build_router(state), request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "User not found");
}

#[tokio::test]
async fn create_form_reports_success_when_reload_fails() {
    let fake = FakeBackend::with_users(sample_users());
    fake.fail_list.store(true, Ordering::SeqCst);
    let state = state_for(&spawn_backend(fake.clone()).await);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=Fatou&email=fatou%40farm.test&password=pw&role=user"))
        .unwrap();
    let html = body_text(send(build_router(state), request).await).await;

    assert!(html.contains(r#"<div class="notice success">User created.</div>"#));
    assert!(html.contains("Could not load users: user store unavailable"));
    assert_eq!(fake.stored_users().len(), 3);
}

#[tokio::test]
async fn api_create_carries_reload_warning() {
    let fake = FakeBackend::with_users(sample_users());
    fake.fail_list.store(true, Ordering::SeqCst);
    let state = state_for(&spawn_backend(fake).await);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"name":"Fatou","email":"fatou@farm.test","password":"pw","role":"user"}"#,
        ))
        .unwrap();
    let response = send(build_router(state), request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["warning"], "user store unavailable");
}

#[tokio::test]
async fn user_ids_are_percent_encoded_in_links() {
    let fake = FakeBackend::with_users(vec![json!({
        "_id": "farm/a?b#c",
        "name": "Odd Id",
        "email": "odd@farm.test",
        "role": "user"
    })]);
    let state = state_for(&spawn_backend(fake).await);
    let app = build_router(state);

    let html = body_text(send(app.clone(), get("/users")).await).await;
    assert!(html.contains(r#"action="/users/farm%2Fa%3Fb%23c/delete""#));
    assert!(html.contains(r#"href="/users?edit=farm%2Fa%3Fb%23c""#));

    let editing = body_text(send(app, get("/users?edit=farm%2Fa%3Fb%23c")).await).await;
    assert!(editing.contains(r#"action="/users/farm%2Fa%3Fb%23c""#));
    assert!(editing.contains("Edit user"));
}
