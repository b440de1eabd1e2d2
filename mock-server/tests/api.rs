use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ApiMessage, CreatedUser, Echo, User};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- users ---

#[tokio::test]
async fn get_seeded_user() {
    let resp = app().oneshot(empty_request("GET", "/users/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "a");
}

#[tokio::test]
async fn get_missing_user_returns_404_message() {
    let resp = app().oneshot(empty_request("GET", "/users/7")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let message: ApiMessage = body_json(resp).await;
    assert_eq!(message.message, "not found");
}

#[tokio::test]
async fn create_user_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"name":"b"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CreatedUser = body_json(resp).await;
    assert_eq!(created.name, "b");
    assert!(!created.id.is_empty());
}

#[tokio::test]
async fn create_user_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"nope":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_user_then_404() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", "/users/42"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/users/42"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_request() {
    let request = Request::builder()
        .method("PATCH")
        .uri("/echo/a/b?x=1&y=two")
        .header("cookie", "a=1; b=2")
        .body("payload".to_string())
        .unwrap();
    let resp = app().oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PATCH");
    assert_eq!(echo.uri, "/echo/a/b?x=1&y=two");
    assert_eq!(echo.headers.get("cookie").map(String::as_str), Some("a=1; b=2"));
    assert_eq!(echo.body, "payload");
}

// --- form & status ---

#[tokio::test]
async fn form_is_urlencoded() {
    let resp = app().oneshot(empty_request("GET", "/form")).await.unwrap();

    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/x-www-form-urlencoded"
    );
    assert_eq!(&body_bytes(resp).await[..], b"a=1&b=two+words");
}

#[tokio::test]
async fn status_route_answers_requested_code() {
    let resp = app().oneshot(empty_request("DELETE", "/status/503")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], 503);
}
