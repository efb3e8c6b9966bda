//! Shared helpers: an in-process fake of the farm backend.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use coop_dashboard::backend::BackendClient;
use coop_dashboard::common::AppState;
use coop_dashboard::config::Config;

/// Programmable backend. `Value::Null` payloads answer with HTTP 500.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub latest: Arc<Mutex<Value>>,
    pub history: Arc<Mutex<Value>>,
    pub users: Arc<Mutex<Vec<Value>>>,
    pub reject_writes: Arc<Mutex<Option<String>>>,
    pub last_write: Arc<Mutex<Option<Value>>>,
    /// Makes `GET /users` fail while writes still succeed.
    pub fail_list: Arc<AtomicBool>,
    pub user_requests: Arc<AtomicUsize>,
    pub sensor_requests: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn with_users(users: Vec<Value>) -> Self {
        let fake = Self::default();
        *fake.users.lock().unwrap() = users;
        fake
    }

    pub fn user_requests(&self) -> usize {
        self.user_requests.load(Ordering::SeqCst)
    }

    pub fn stored_users(&self) -> Vec<Value> {
        self.users.lock().unwrap().clone()
    }
}

pub fn sample_users() -> Vec<Value> {
    vec![
        json!({"_id": "u1", "name": "Awa Diop", "email": "awa@farm.test", "role": "admin", "createdAt": "2026-01-05T08:00:00.000Z"}),
        json!({"_id": "u2", "name": "Moussa Ba", "email": "moussa@farm.test", "role": "technician", "createdAt": "2026-02-11T09:30:00.000Z"}),
    ]
}

/// Serve the fake on an ephemeral port and return its `/api` base URL.
pub async fn spawn_backend(fake: FakeBackend) -> String {
    let app = Router::new()
        .route("/api/sensors/latest", get(latest))
        .route("/api/sensors/history", get(history))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", put(update_user).delete(delete_user))
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub fn config_for(base_url: &str) -> Config {
    let mut config = Config::with_backend(base_url);
    config.disable_rate_limiting = true;
    config.backend_timeout_seconds = 5;
    config
}

pub fn state_for(base_url: &str) -> AppState {
    state_with(config_for(base_url))
}

pub fn state_with(config: Config) -> AppState {
    let client = BackendClient::new(&config).unwrap();
    AppState::new(config, client)
}

type Reply = (StatusCode, Json<Value>);

fn server_error() -> Reply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "sensor gateway offline"})),
    )
}

async fn latest(State(fake): State<FakeBackend>) -> Reply {
    fake.sensor_requests.fetch_add(1, Ordering::SeqCst);
    let body = fake.latest.lock().unwrap().clone();
    if body.is_null() {
        return server_error();
    }
    (StatusCode::OK, Json(body))
}

async fn history(
    State(fake): State<FakeBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    fake.sensor_requests.fetch_add(1, Ordering::SeqCst);
    assert!(params.contains_key("type"), "history request without type");
    assert!(params.contains_key("limit"), "history request without limit");
    let body = fake.history.lock().unwrap().clone();
    if body.is_null() {
        return server_error();
    }
    (StatusCode::OK, Json(body))
}

async fn list_users(State(fake): State<FakeBackend>) -> Reply {
    fake.user_requests.fetch_add(1, Ordering::SeqCst);
    if fake.fail_list.load(Ordering::SeqCst) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "user store unavailable"})),
        );
    }
    (StatusCode::OK, Json(Value::Array(fake.stored_users())))
}

fn rejected(fake: &FakeBackend) -> Option<Reply> {
    fake.reject_writes
        .lock()
        .unwrap()
        .clone()
        .map(|message| (StatusCode::BAD_REQUEST, Json(json!({"message": message}))))
}

async fn create_user(State(fake): State<FakeBackend>, Json(body): Json<Value>) -> Reply {
    fake.user_requests.fetch_add(1, Ordering::SeqCst);
    *fake.last_write.lock().unwrap() = Some(body.clone());
    if let Some(reply) = rejected(&fake) {
        return reply;
    }

    let mut users = fake.users.lock().unwrap();
    let id = format!("u{}", users.len() + 1);
    let user = json!({
        "_id": id,
        "name": body["name"],
        "email": body["email"],
        "role": body["role"],
        "passwordHash": "$2b$10$hash",
        "createdAt": "2026-10-01T12:00:00.000Z",
    });
    users.push(user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn update_user(
    State(fake): State<FakeBackend>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    fake.user_requests.fetch_add(1, Ordering::SeqCst);
    *fake.last_write.lock().unwrap() = Some(body.clone());
    if let Some(reply) = rejected(&fake) {
        return reply;
    }

    let mut users = fake.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u["_id"] == id.as_str()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "User not found"})),
        );
    };
    for field in ["name", "email", "role"] {
        user[field] = body[field].clone();
    }
    (StatusCode::OK, Json(user.clone()))
}

async fn delete_user(State(fake): State<FakeBackend>, Path(id): Path<String>) -> Reply {
    fake.user_requests.fetch_add(1, Ordering::SeqCst);
    let mut users = fake.users.lock().unwrap();
    users.retain(|u| u["_id"] != id.as_str());
    (StatusCode::OK, Json(json!({"message": "deleted"})))
}
