use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Header carrying the client credential.
const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests whose `x-api-key` header is absent or does not match the
/// configured secret. Applied to every route except root and the
/// health/metrics surface.
pub(crate) async fn require_api_key(
    State(expected): State<Arc<String>>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty());

    match provided {
        None => unauthorized("API key is required"),
        Some(key) if key != expected.as_str() => unauthorized("Invalid API key"),
        Some(_) => next.run(request).await,
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}
