//! The fixed security header set applied to page responses.
//!
//! # Responsibilities
//! - Define the exact header names and values (HSTS, CSP, etc.)
//! - Collapse the CSP directive list into a single-line header value
//! - Apply the full set to a response header map, atomically and idempotently
//!
//! # Design Decisions
//! - Values are static: never derived from request data
//! - `insert` semantics, so re-applying can never duplicate a header
//! - The set is built once at startup and shared via Arc

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// CSP directives, kept readable here and collapsed to one line at build time.
const CSP_POLICY: &str = "
    default-src 'self';
    script-src 'self' 'unsafe-eval' 'unsafe-inline' https://js.stripe.com;
    style-src 'self' 'unsafe-inline';
    img-src 'self' blob: data: https://*.stripe.com;
    font-src 'self';
    object-src 'none';
    base-uri 'self';
    form-action 'self';
    frame-ancestors 'none';
    block-all-mixed-content;
    upgrade-insecure-requests;
";

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains; preload";
const XSS_PROTECTION_VALUE: &str = "1; mode=block";
const CONTENT_TYPE_OPTIONS_VALUE: &str = "nosniff";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
const PERMISSIONS_POLICY_VALUE: &str =
    "camera=(), microphone=(), geolocation=(), interest-cohort=()";

/// The immutable security header set.
///
/// All headers are applied together or not at all; there is no per-header
/// configuration by design.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    pairs: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    /// Build the header set. Values are compile-time constants, so
    /// construction cannot fail at runtime.
    pub fn new() -> Self {
        let csp = collapse_whitespace(CSP_POLICY);
        let pairs = vec![
            (
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static(HSTS_VALUE),
            ),
            (
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static(XSS_PROTECTION_VALUE),
            ),
            (
                HeaderName::from_static("content-security-policy"),
                HeaderValue::from_str(&csp)
                    .expect("static CSP directives form a valid header value"),
            ),
            (
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static(CONTENT_TYPE_OPTIONS_VALUE),
            ),
            (
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static(REFERRER_POLICY_VALUE),
            ),
            (
                HeaderName::from_static("permissions-policy"),
                HeaderValue::from_static(PERMISSIONS_POLICY_VALUE),
            ),
        ];
        Self { pairs }
    }

    /// Apply the full set to a response header map.
    ///
    /// Uses insert semantics: existing values under these names are replaced,
    /// everything else is left untouched. Applying twice is a no-op.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.pairs {
            headers.insert(name.clone(), value.clone());
        }
    }

    /// Header names in application order.
    pub fn names(&self) -> impl Iterator<Item = &HeaderName> {
        self.pairs.iter().map(|(name, _)| name)
    }

    /// Number of headers in the set.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse all whitespace runs (including newlines) to single spaces and
/// trim the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
