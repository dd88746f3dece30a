//! Security Header Middleware.
//! Augments matched responses with the fixed security header set.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::security::{HeaderPolicy, SecurityHeaders};

/// State required for header injection.
#[derive(Clone)]
pub struct SecurityHeadersState {
    pub headers: Arc<SecurityHeaders>,
    pub policy: Arc<HeaderPolicy>,
    pub enabled: bool,
}

impl SecurityHeadersState {
    pub fn new(headers: SecurityHeaders, policy: HeaderPolicy, enabled: bool) -> Self {
        Self {
            headers: Arc::new(headers),
            policy: Arc::new(policy),
            enabled,
        }
    }
}

/// Pass-through middleware that conditionally applies the security header set.
///
/// The policy is evaluated against the request before it is consumed; the
/// response body and status are never touched.
pub async fn security_headers_middleware(
    State(state): State<SecurityHeadersState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // 1. Disabled: plain passthrough.
    if !state.enabled {
        return next.run(req).await;
    }

    // 2. Evaluate the policy before handing the request on.
    let augment = state.policy.applies_to(req.uri().path(), req.headers());

    // 3. Always forward; augment matched responses only.
    let mut response = next.run(req).await;
    if augment {
        state.headers.apply(response.headers_mut());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    use crate::config::SecurityConfig;

    fn test_router(enabled: bool) -> Router {
        let config = SecurityConfig::default();
        let state = SecurityHeadersState::new(
            SecurityHeaders::new(),
            HeaderPolicy::new(config.exempt_path_prefixes, config.exempt_paths),
            enabled,
        );
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/api/users", get(|| async { "users" }))
            .route("/favicon.ico", get(|| async { "icon" }))
            .layer(middleware::from_fn_with_state(
                state,
                security_headers_middleware,
            ))
    }

    async fn send(router: Router, req: Request<Body>) -> Response {
        router.oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn test_page_response_gets_all_headers() {
        let response = send(
            test_router(true),
            Request::builder()
                .uri("/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        let headers = response.headers();
        assert_eq!(
            headers.get("strict-transport-security").unwrap(),
            "max-age=31536000; includeSubDomains; preload"
        );
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert!(headers.contains_key("content-security-policy"));
        assert!(headers.contains_key("x-xss-protection"));
        assert!(headers.contains_key("referrer-policy"));
        assert!(headers.contains_key("permissions-policy"));
    }

    #[tokio::test]
    async fn test_exempt_paths_get_no_headers() {
        for uri in ["/api/users", "/favicon.ico"] {
            let response = send(
                test_router(true),
                Request::builder().uri(uri).body(Body::empty()).unwrap(),
            )
            .await;

            let headers = response.headers();
            assert!(
                !headers.contains_key("strict-transport-security"),
                "unexpected headers on {uri}"
            );
            assert!(!headers.contains_key("content-security-policy"));
        }
    }

    #[tokio::test]
    async fn test_prefetch_request_gets_no_headers() {
        let response = send(
            test_router(true),
            Request::builder()
                .uri("/dashboard")
                .header("purpose", HeaderValue::from_static("prefetch"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert!(!response.headers().contains_key("strict-transport-security"));
        assert!(!response.headers().contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn test_disabled_middleware_is_passthrough() {
        let response = send(
            test_router(false),
            Request::builder().uri("/").body(Body::empty()).unwrap(),
        )
        .await;

        assert!(!response.headers().contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn test_applying_twice_equals_once() {
        // Stack the middleware twice; header values and counts must match a
        // single application.
        let config = SecurityConfig::default();
        let state = SecurityHeadersState::new(
            SecurityHeaders::new(),
            HeaderPolicy::new(config.exempt_path_prefixes, config.exempt_paths),
            true,
        );
        let doubled = Router::new()
            .route("/dashboard", get(|| async { "dashboard" }))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                security_headers_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                state,
                security_headers_middleware,
            ));

        let response = send(
            doubled,
            Request::builder()
                .uri("/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        let single = send(
            test_router(true),
            Request::builder()
                .uri("/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        for name in [
            "strict-transport-security",
            "x-xss-protection",
            "content-security-policy",
            "x-content-type-options",
            "referrer-policy",
            "permissions-policy",
        ] {
            assert_eq!(
                response.headers().get_all(name).iter().count(),
                1,
                "duplicated header {name}"
            );
            assert_eq!(response.headers().get(name), single.headers().get(name));
        }
    }
}
