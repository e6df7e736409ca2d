//! Integration tests for the identity extraction middleware.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::any,
    Router,
};
use portcullis_http::{
    config::IdentityConfig,
    middleware::{extract_identity, IdentityExtractor},
    VarMap, IDENTITY_VAR,
};
use tower::ServiceExt;

/// Router whose handler reports the published identity variable, or
/// `<missing>` when no namespace was provisioned at all.
fn identity_app(header_name: &str) -> Router {
    let config =
        IdentityConfig { source: "header".to_owned(), header_name: header_name.to_owned() };
    let extractor = IdentityExtractor::from_config(&config).expect("extractor");

    async fn report(request: Request<Body>) -> String {
        request
            .extensions()
            .get::<VarMap>()
            .and_then(|vars| vars.get(IDENTITY_VAR))
            .unwrap_or_else(|| "<missing>".to_owned())
    }

    Router::new()
        .route("/", any(report))
        .route("/{*path}", any(report))
        .layer(middleware::from_fn_with_state(extractor, extract_identity))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn header_value_is_published() {
    let app = identity_app("x-client-id");
    let request = Request::builder()
        .uri("/orders")
        .header("x-client-id", "abc123")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "abc123");
}

#[tokio::test]
async fn header_lookup_is_case_insensitive() {
    let app = identity_app("X-Client-Id");
    let request = Request::builder()
        .uri("/orders")
        .header("x-CLIENT-id", "abc123")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(body_string(response).await, "abc123");
}

#[tokio::test]
async fn absent_header_publishes_empty_string() {
    let app = identity_app("x-client-id");

    let response = app.oneshot(portcullis_testing::get("/orders")).await.expect("response");

    // The variable exists and is empty; the request is never rejected.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn first_header_value_wins() {
    let app = identity_app("x-client-id");
    let request = Request::builder()
        .uri("/orders")
        .header("x-client-id", "first")
        .header("x-client-id", "second")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(body_string(response).await, "first");
}
