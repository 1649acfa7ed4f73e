//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the password login is limited: about ten attempts a minute per client.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers consulted for the client address, most specific first.
const CLIENT_IP_HEADERS: &[&str] = &["x-real-ip", "fly-client-ip", "cf-connecting-ip"];

/// Key extractor that reads the client IP from reverse-proxy headers.
///
/// `X-Forwarded-For` wins (its first entry is the original client), then the
/// single-address headers in [`CLIENT_IP_HEADERS`], then the peer address of
/// the connection.
#[derive(Clone, Copy)]
pub struct ForwardedIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ForwardedIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok());

        forwarded
            .or_else(|| {
                CLIENT_IP_HEADERS.iter().find_map(|name| {
                    headers
                        .get(*name)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<IpAddr>().ok())
                })
            })
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ForwardedIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for login: ~10 requests per minute per IP.
///
/// One token every 6 seconds, burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers, which are always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ForwardedIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/login");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let req = request(&[
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let ip = ForwardedIpKeyExtractor.extract(&req).ok();
        assert_eq!(ip, "203.0.113.9".parse().ok());
    }

    #[test]
    fn test_falls_back_to_single_address_headers() {
        let req = request(&[("fly-client-ip", "2001:db8::1")]);
        let ip = ForwardedIpKeyExtractor.extract(&req).ok();
        assert_eq!(ip, "2001:db8::1".parse().ok());
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = request(&[]);
        let peer: SocketAddr = "192.0.2.7:51000".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        let ip = ForwardedIpKeyExtractor.extract(&req).ok();
        assert_eq!(ip, Some(peer.ip()));
    }

    #[test]
    fn test_no_address_is_an_error() {
        assert!(ForwardedIpKeyExtractor.extract(&request(&[])).is_err());
    }
}
