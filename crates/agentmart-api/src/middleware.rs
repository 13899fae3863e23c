//! API Middleware

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::error::ApiError;

/// Request timing middleware
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let elapsed = start.elapsed();

    if elapsed.as_millis() > 1000 {
        tracing::warn!(
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed.as_millis(),
            status = response.status().as_u16(),
            "Slow request detected"
        );
    } else {
        tracing::debug!(
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed.as_millis(),
            status = response.status().as_u16(),
            "Request completed"
        );
    }

    response
}

/// Reject requests whose declared Content-Length exceeds `max_size`
pub async fn body_limit_middleware(req: Request, next: Next, max_size: usize) -> Response {
    let declared = req
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(length) = declared {
        if length > max_size {
            return ApiError::RequestTooLarge(max_size).into_response();
        }
    }

    next.run(req).await
}

/// Security headers middleware
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("strict-origin-when-cross-origin"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::post, Router};
    use tower::ServiceExt;

    fn limited(max: usize) -> Router {
        Router::new()
            .route("/", post(|| async { "ok" }))
            .layer(axum::middleware::from_fn(move |req: Request, next: Next| {
                body_limit_middleware(req, next, max)
            }))
            .layer(axum::middleware::from_fn(security_headers_middleware))
    }

    #[tokio::test]
    async fn test_body_limit_rejects_large_declared_length() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-length", "64")
            .body(Body::from(vec![0u8; 64]))
            .unwrap();

        let response = limited(16).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()["X-Frame-Options"], "DENY");
    }

    #[tokio::test]
    async fn test_body_limit_passes_small_bodies() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-length", "2")
            .body(Body::from("{}"))
            .unwrap();

        let response = limited(16).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
