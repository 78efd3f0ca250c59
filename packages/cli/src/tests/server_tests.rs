use crate::{build_app, Config};
use autohub_api::DbState;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use std::collections::HashMap;
use tower::ServiceExt;

async fn app_with_origin(origin: &str) -> axum::Router {
    let vars: HashMap<&str, &str> = [("CORS_ORIGIN", origin)].into_iter().collect();
    let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
    let pool = autohub_storage::memory_pool().await.unwrap();
    build_app(DbState::new(pool), &config).unwrap()
}

#[tokio::test]
async fn test_health_through_layers() {
    let app = app_with_origin("http://localhost:5173").await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/health")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_preflight_allows_identity_headers() {
    let app = app_with_origin("http://localhost:5173").await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/vehicles")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "x-user-id,x-user-role")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed.contains("x-user-id"));
    assert!(allowed.contains("x-user-role"));
}

#[tokio::test]
async fn test_invalid_cors_origin_is_a_config_error() {
    let config = Config::from_lookup(|key| {
        (key == "CORS_ORIGIN").then(|| "bad\norigin".to_string())
    })
    .unwrap();
    let pool = autohub_storage::memory_pool().await.unwrap();

    assert!(build_app(DbState::new(pool), &config).is_err());
}
