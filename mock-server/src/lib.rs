//! Local HTTP server for exercising the client over real sockets.
//!
//! Serves a small in-memory user store, echoes requests back as JSON so the
//! exact method, URL, headers and body a client sent can be asserted, and
//! answers with arbitrary status codes on demand.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CreatedUser {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiMessage {
    pub message: String,
}

/// What `/echo` saw.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Debug)]
pub struct Store {
    next_id: u64,
    users: HashMap<String, User>,
}

impl Default for Store {
    /// Seeded with user `42` named `a`.
    fn default() -> Self {
        let mut users = HashMap::new();
        users.insert("42".to_string(), User { name: "a".to_string() });
        Self { next_id: 100, users }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/form", get(form))
        .route("/status/{code}", any(status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found() -> (StatusCode, Json<ApiMessage>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiMessage {
            message: "not found".to_string(),
        }),
    )
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<User>,
) -> (StatusCode, Json<CreatedUser>) {
    let mut store = db.write().await;
    let id = store.next_id.to_string();
    store.next_id += 1;
    store.users.insert(id.clone(), input.clone());
    (StatusCode::CREATED, Json(CreatedUser { id, name: input.name }))
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<User>, (StatusCode, Json<ApiMessage>)> {
    let store = db.read().await;
    store.users.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<User>,
) -> Result<Json<User>, (StatusCode, Json<ApiMessage>)> {
    let mut store = db.write().await;
    let user = store.users.get_mut(&id).ok_or_else(not_found)?;
    user.name = input.name;
    Ok(Json(user.clone()))
}

async fn delete_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ApiMessage>)> {
    let mut store = db.write().await;
    store
        .users
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        uri: uri.to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn form() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
        "a=1&b=two+words",
    )
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(serde_json::json!({ "code": status.as_u16() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_is_seeded() {
        let store = Store::default();
        assert_eq!(store.users.get("42"), Some(&User { name: "a".to_string() }));
    }

    #[test]
    fn api_message_serializes() {
        let json = serde_json::to_value(ApiMessage {
            message: "not found".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"message": "not found"}));
    }

    #[test]
    fn user_rejects_missing_name() {
        let result: Result<User, _> = serde_json::from_str(r#"{}"#);
        assert!(result.is_err());
    }
}
