use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_governor::{GovernorError, key_extractor::KeyExtractor};

/// Per-client key for the admin rate limiter.
///
/// Honours `X-Forwarded-For` (first hop) and `X-Real-IP` when the dashboard
/// runs behind a proxy, then the peer address. Requests with no identifiable
/// address share the localhost bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());

        Ok(client_ip(req.headers(), peer))
    }
}

/// Resolve the client address from proxy headers, then the peer address.
#[must_use]
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> IpAddr {
    forwarded_for(headers)
        .or_else(|| header_ip(headers, "x-real-ip"))
        .or(peer)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
