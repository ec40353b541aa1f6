//! Tests for `HttpFetcher` against a loopback server.
mod common;
use common::*;
use jsonflow::prelude::*;
use serde_json::{Value, json};

fn request(url: String, method: HttpMethod, body: Option<Value>) -> FetchRequest {
    FetchRequest { url, method, body }
}

#[tokio::test]
async fn test_json_body_and_status() {
    let (url, server) = serve_once("200 OK", r#"{"userId": 1, "id": 7}"#).await;
    let fetcher = HttpFetcher::with_defaults().unwrap();

    let response = fetcher.fetch(request(url, HttpMethod::Get, None)).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "userId": 1, "id": 7 }));

    let received = server.await.unwrap();
    assert!(received.starts_with("GET /items HTTP/1.1"));
    assert!(received.to_ascii_lowercase().contains("user-agent: jsonflow/"));
}

#[tokio::test]
async fn test_blank_body_reads_as_null() {
    let (url, _server) = serve_once("200 OK", " \n").await;
    let fetcher = HttpFetcher::with_defaults().unwrap();
    let response = fetcher.fetch(request(url, HttpMethod::Get, None)).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, Value::Null);

    let (url, _server) = serve_once("404 Not Found", "").await;
    let response = fetcher.fetch(request(url, HttpMethod::Delete, None)).await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, Value::Null);
}

#[tokio::test]
async fn test_non_json_body_keeps_real_status() {
    let (url, _server) = serve_once("502 Bad Gateway", "<html>oops</html>").await;
    let fetcher = HttpFetcher::with_defaults().unwrap();
    let err = fetcher
        .fetch(request(url, HttpMethod::Get, None))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidJson { status: 502, .. }));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let (url, server) = serve_once("201 Created", r#"{"ok": true}"#).await;
    let fetcher = HttpFetcher::new(FetchConfig::default().with_user_agent("todo-app/2")).unwrap();
    let response = fetcher
        .fetch(request(url, HttpMethod::Post, Some(json!({ "title": "new" }))))
        .await
        .unwrap();
    assert_eq!(response.status, 201);

    let received = server.await.unwrap();
    let lower = received.to_ascii_lowercase();
    assert!(received.starts_with("POST /items HTTP/1.1"));
    assert!(lower.contains("content-type: application/json"));
    assert!(lower.contains("user-agent: todo-app/2"));
    assert!(received.ends_with(r#"{"title":"new"}"#));
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let fetcher = HttpFetcher::with_defaults().unwrap();
    let err = fetcher
        .fetch(request(refused_url().await, HttpMethod::Get, None))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
    assert!(err.to_string().starts_with("Request failed"));
}
