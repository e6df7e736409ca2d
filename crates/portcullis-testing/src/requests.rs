//! Request builders for integration tests.

use axum::body::Body;
use http::Request;

/// A GET request with an empty body.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request build")
}

/// A POST request carrying a JSON body.
pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request build")
}

/// A POST request carrying arbitrary bytes.
pub fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::from(body.into())).expect("request build")
}
