use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

use super::errors::{error_response, ApiError};

/// Limits applied before a request reaches the handlers
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_request_size: usize,
}

/// Reject bodies that are not JSON or that announce more bytes than allowed
pub async fn request_validation_middleware(
    State(limits): State<RequestLimits>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    validate_content_type(&request)?;
    validate_request_size(&request, limits.max_request_size)?;

    Ok(next.run(request).await)
}

// Association routes are POST/DELETE without a body
fn expects_json_body(request: &Request) -> bool {
    let method = request.method();
    (method == Method::POST || method == Method::PUT || method == Method::PATCH)
        && !request.uri().path().contains("/foods/")
}

fn validate_content_type(request: &Request) -> Result<(), ApiError> {
    if !expects_json_body(request) {
        return Ok(());
    }

    match request.headers().get(header::CONTENT_TYPE) {
        Some(content_type) => {
            let content_type = content_type.to_str().unwrap_or("");
            if content_type.starts_with("application/json") {
                Ok(())
            } else {
                warn!("Invalid content type: {}", content_type);
                Err(error_response(
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "Content-Type must be application/json",
                ))
            }
        }
        None => {
            warn!("Missing content type header");
            Err(error_response(
                StatusCode::BAD_REQUEST,
                "Content-Type header is required for requests with body",
            ))
        }
    }
}

fn validate_request_size(request: &Request, max_request_size: usize) -> Result<(), ApiError> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    match declared {
        Some(length) if length > max_request_size => {
            error!("Request too large: {} bytes", length);
            Err(error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "Request size {} bytes exceeds maximum of {} bytes",
                    length, max_request_size
                ),
            ))
        }
        _ => Ok(()),
    }
}

pub async fn cors_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Location"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );

    response
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'self'"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::Request as HttpRequest,
        middleware,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    async fn accepted() -> StatusCode {
        StatusCode::NO_CONTENT
    }

    fn app() -> Router {
        Router::new()
            .route("/Dinner", post(accepted))
            .route("/Dinner/:dinner_id/foods/:food_id", post(accepted))
            .route("/health/status", get(accepted))
            .layer(middleware::from_fn_with_state(
                RequestLimits {
                    max_request_size: 64,
                },
                request_validation_middleware,
            ))
            .layer(middleware::from_fn(cors_middleware))
            .layer(middleware::from_fn(security_headers_middleware))
    }

    fn post_request(uri: &str, content_type: Option<&str>, body: &str) -> Request {
        let mut builder = HttpRequest::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_post_passes() {
        let response = app()
            .oneshot(post_request("/Dinner", Some("application/json"), "{\"name\":\"x\"}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_wrong_content_type_rejected() {
        let response = app()
            .oneshot(post_request("/Dinner", Some("text/plain"), "name=x"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_missing_content_type_rejected() {
        let response = app()
            .oneshot(post_request("/Dinner", None, "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_association_route_needs_no_content_type() {
        let response = app()
            .oneshot(post_request("/Dinner/1/foods/2", None, ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let body = format!("{{\"name\":\"{}\"}}", "a".repeat(100));
        let response = app()
            .oneshot(post_request("/Dinner", Some("application/json"), &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_and_security_headers() {
        let request = HttpRequest::builder()
            .uri("/health/status")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
    }
}
