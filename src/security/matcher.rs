//! Header policy matching.
//!
//! # Responsibilities
//! - Decide whether a request gets the security header set
//! - Exempt framework-internal paths (API, static assets, image optimizer, favicon)
//! - Exempt client-router prefetch requests
//!
//! # Design Decisions
//! - Pure function of request path and headers; no request mutation
//! - Prefix/exact string comparison only, no regex (O(n) over a tiny rule list)
//! - Built once from config at startup, immutable afterwards

use axum::http::HeaderMap;

/// Header set by the client router on speculative navigation requests.
/// Matched on presence alone.
const ROUTER_PREFETCH_HEADER: &str = "next-router-prefetch";

/// Generic prefetch indicator; only the value `prefetch` counts.
const PURPOSE_HEADER: &str = "purpose";
const PURPOSE_PREFETCH: &str = "prefetch";

/// Decides which responses receive the security header set.
///
/// A request is exempt when its path matches any exclusion rule or when it
/// carries a prefetch-indicating header; every other request is augmented.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    exempt_prefixes: Vec<String>,
    exempt_paths: Vec<String>,
}

impl HeaderPolicy {
    /// Create a policy from exclusion rules.
    pub fn new(exempt_prefixes: Vec<String>, exempt_paths: Vec<String>) -> Self {
        Self {
            exempt_prefixes,
            exempt_paths,
        }
    }

    /// Returns true if the response for this request should be augmented
    /// with the security header set.
    pub fn applies_to(&self, path: &str, headers: &HeaderMap) -> bool {
        !self.is_exempt_path(path) && !is_prefetch(headers)
    }

    /// Path-based exemption: excluded prefix or exact excluded path.
    pub fn is_exempt_path(&self, path: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
            || self.exempt_paths.iter().any(|p| path == p)
    }
}

/// Returns true if the request is a client-side prefetch.
///
/// The router prefetch header counts regardless of value; `purpose` counts
/// only when its value is `prefetch` (case-insensitive).
pub fn is_prefetch(headers: &HeaderMap) -> bool {
    if headers.contains_key(ROUTER_PREFETCH_HEADER) {
        return true;
    }
    headers
        .get(PURPOSE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case(PURPOSE_PREFETCH))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use axum::http::HeaderValue;

    fn default_policy() -> HeaderPolicy {
        let config = SecurityConfig::default();
        HeaderPolicy::new(config.exempt_path_prefixes, config.exempt_paths)
    }

    #[test]
    fn test_page_paths_match() {
        let policy = default_policy();
        let headers = HeaderMap::new();

        assert!(policy.applies_to("/", &headers));
        assert!(policy.applies_to("/dashboard", &headers));
        assert!(policy.applies_to("/settings/billing", &headers));
    }

    #[test]
    fn test_excluded_prefixes() {
        let policy = default_policy();
        let headers = HeaderMap::new();

        assert!(!policy.applies_to("/api", &headers));
        assert!(!policy.applies_to("/api/users", &headers));
        assert!(!policy.applies_to("/_next/static/chunks/main.js", &headers));
        assert!(!policy.applies_to("/_next/image?url=%2Flogo.png", &headers));
    }

    #[test]
    fn test_favicon_is_exact_match_only() {
        let policy = default_policy();
        let headers = HeaderMap::new();

        assert!(!policy.applies_to("/favicon.ico", &headers));
        // Only the exact path is excluded.
        assert!(policy.applies_to("/favicon.ico.bak", &headers));
        assert!(policy.applies_to("/assets/favicon.ico", &headers));
    }

    #[test]
    fn test_router_prefetch_header_any_value() {
        let policy = default_policy();

        let mut headers = HeaderMap::new();
        headers.insert(ROUTER_PREFETCH_HEADER, HeaderValue::from_static("1"));
        assert!(!policy.applies_to("/dashboard", &headers));

        let mut headers = HeaderMap::new();
        headers.insert(ROUTER_PREFETCH_HEADER, HeaderValue::from_static(""));
        assert!(!policy.applies_to("/dashboard", &headers));
    }

    #[test]
    fn test_purpose_header_requires_prefetch_value() {
        let policy = default_policy();

        let mut headers = HeaderMap::new();
        headers.insert(PURPOSE_HEADER, HeaderValue::from_static("prefetch"));
        assert!(!policy.applies_to("/dashboard", &headers));

        let mut headers = HeaderMap::new();
        headers.insert(PURPOSE_HEADER, HeaderValue::from_static("Prefetch"));
        assert!(!policy.applies_to("/dashboard", &headers));

        // Other purposes do not exempt the request.
        let mut headers = HeaderMap::new();
        headers.insert(PURPOSE_HEADER, HeaderValue::from_static("preview"));
        assert!(policy.applies_to("/dashboard", &headers));
    }

    #[test]
    fn test_unrelated_headers_do_not_exempt() {
        let policy = default_policy();
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("text/html"));
        headers.insert("cookie", HeaderValue::from_static("nix-auth=abc"));

        assert!(policy.applies_to("/dashboard", &headers));
    }
}
