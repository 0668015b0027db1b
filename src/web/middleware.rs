use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::{ApiError, AppState};

/// Request logging middleware. Logs the path only: the query carries the
/// shared secret.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

/// Gate for the admin routes: same `secret` query parameter as the trigger.
pub async fn require_secret(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let provided = secret_from_uri(request.uri());

    if !secret_matches(&state.trigger_secret, provided.as_deref()) {
        warn!(path = %request.uri().path(), "Rejected admin request with bad secret");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

/// Constant-time comparison. An empty expected secret never matches.
pub fn secret_matches(expected: &str, provided: Option<&str>) -> bool {
    match provided {
        Some(provided) if !expected.is_empty() => expected.as_bytes().ct_eq(provided.as_bytes()).into(),
        _ => false,
    }
}

pub fn secret_from_uri(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "secret")
        .map(|(_, value)| value.into_owned())
}
