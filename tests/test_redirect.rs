mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use raindrop_client::server::{redirect_router, wait_for_authorization_code};
use raindrop_client::RaindropError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

async fn redirect(uri: &str) -> (StatusCode, String, Option<raindrop_client::server::RedirectOutcome>) {
    let (tx, mut rx) = mpsc::channel(1);
    let app = redirect_router("/oauth/callback", tx);

    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap(), rx.try_recv().ok())
}

#[tokio::test]
async fn test_redirect_with_code() {
    common::init_test_logging();

    let (status, page, outcome) = redirect("/oauth/callback?code=abc123").await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("You've been authorized"));
    assert!(page.contains("abc123"));
    assert_eq!(outcome.unwrap().unwrap(), "abc123");
}

#[tokio::test]
async fn test_redirect_with_error() {
    common::init_test_logging();

    let (status, page, outcome) = redirect("/oauth/callback?error=access_denied").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(page.contains("access_denied"));
    match outcome.unwrap() {
        Err(RaindropError::AuthorizationDenied(error)) => assert_eq!(error, "access_denied"),
        other => panic!("expected AuthorizationDenied, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redirect_without_code_or_error() {
    common::init_test_logging();

    let (status, _, outcome) = redirect("/oauth/callback").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(matches!(
        outcome.unwrap(),
        Err(RaindropError::MissingAuthorizationCode { status: 400 })
    ));
}

#[tokio::test]
async fn test_redirect_page_escapes_code() {
    common::init_test_logging();

    let (_, page, _) = redirect("/oauth/callback?code=%3Cscript%3E").await;

    assert!(!page.contains("<script>"));
    assert!(page.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_wait_for_authorization_code() {
    common::init_test_logging();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();

    let waiter = tokio::spawn(wait_for_authorization_code(
        listener,
        "/oauth/callback",
        shutdown.clone(),
    ));

    let page = reqwest::get(format!("http://{}/oauth/callback?code=xyz", addr))
        .await
        .unwrap();
    assert_eq!(page.status().as_u16(), 200);
    assert!(page.text().await.unwrap().contains("xyz"));

    let code = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .expect("server should stop after the first redirect")
        .unwrap()
        .unwrap();
    assert_eq!(code, "xyz");
}

#[tokio::test]
async fn test_wait_for_authorization_code_cancelled() {
    common::init_test_logging();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let result = wait_for_authorization_code(listener, "/oauth/callback", shutdown).await;

    assert!(matches!(result, Err(RaindropError::Cancelled)));
}
