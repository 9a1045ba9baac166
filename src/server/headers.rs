//! Security headers added to every page response

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Environment;

/// Allows own scripts and styles (inline included), any https image,
/// and SoundCloud player embeds
const CONTENT_SECURITY_POLICY: &str = concat!(
    "default-src 'self'; ",
    "script-src 'self' 'unsafe-eval' 'unsafe-inline'; ",
    "style-src 'self' 'unsafe-inline'; ",
    "img-src 'self' data: https:; ",
    "font-src 'self' data:; ",
    "frame-src https://w.soundcloud.com; ",
    "connect-src 'self'; ",
    "media-src 'self' https:"
);

const PERMISSIONS_POLICY: &str = "camera=(), microphone=(), geolocation=(), interest-cohort=()";
const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains; preload";

lazy_static! {
    static ref IMAGE_ASSET: Regex = Regex::new(r"\.(?:svg|png|jpg|jpeg|gif|webp)$").unwrap();
}

/// Whether a request path is a static asset that skips the security headers
pub fn is_static_asset(path: &str) -> bool {
    path.starts_with("/static/") || path == "/favicon.ico" || IMAGE_ASSET.is_match(path)
}

/// Middleware that sets CSP, framing, sniffing, referrer and permissions headers.
/// HSTS is only sent in production.
pub async fn security_headers(
    State(environment): State<Environment>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let skip = is_static_asset(request.uri().path());
    let mut response = next.run(request).await;
    if skip {
        return response;
    }

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    if environment.is_production() {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(STRICT_TRANSPORT_SECURITY),
        );
    }
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_asset_paths() {
        assert!(is_static_asset("/static/site.css"));
        assert!(is_static_asset("/favicon.ico"));
        assert!(is_static_asset("/images/rack.jpg"));
        assert!(is_static_asset("/logo.svg"));
        assert!(is_static_asset("/a/b/photo.webp"));
    }

    #[test]
    fn test_page_paths_get_headers() {
        assert!(!is_static_asset("/"));
        assert!(!is_static_asset("/blog"));
        assert!(!is_static_asset("/blog/png"));
        assert!(!is_static_asset("/blog/photo.PNG"));
        assert!(!is_static_asset("/staticfile"));
    }
}
