//! Response headers for pages that carry one-time secrets.
//!
//! Responsibility:
//! - Keep secret pages out of every cache (browser, proxy, back/forward)
//! - Keep one-time links out of Referer headers
//! - Clickjacking / MIME sniffing protection

use axum::Router;
use axum::http::header::{self, HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Apply the headers to all responses, without overriding handler-set values.
pub fn apply(router: Router) -> Router {
    let headers: [(HeaderName, &'static str); 7] = [
        // A consumed secret must not be re-served from any cache.
        (header::CACHE_CONTROL, "no-store"),
        (header::PRAGMA, "no-cache"),
        (header::REFERRER_POLICY, "no-referrer"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (
            header::CONTENT_SECURITY_POLICY,
            "default-src 'none'; style-src 'unsafe-inline'; form-action 'self'; frame-ancestors 'none'",
        ),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (
            HeaderName::from_static("permissions-policy"),
            "camera=(), microphone=(), geolocation=()",
        ),
    ];

    headers.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ))
    })
}
