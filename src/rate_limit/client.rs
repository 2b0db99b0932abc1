//! Identifying the client behind a request.
//!
//! Proxies and CDNs put the original address in headers; the first trusted
//! one wins, falling back to the socket peer.

use std::net::SocketAddr;

use axum::http::HeaderMap;
use serde::Serialize;

/// Address used when nothing identifies the client.
pub const UNKNOWN_IP: &str = "0.0.0.0";

/// Where the chosen client IP came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IpSource {
    #[serde(rename = "cf-connecting-ip")]
    CfConnectingIp,
    #[serde(rename = "x-forwarded-for")]
    XForwardedFor,
    #[serde(rename = "x-real-ip")]
    XRealIp,
    #[serde(rename = "peer")]
    Peer,
}

impl IpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CfConnectingIp => "cf-connecting-ip",
            Self::XForwardedFor => "x-forwarded-for",
            Self::XRealIp => "x-real-ip",
            Self::Peer => "peer",
        }
    }
}

/// The chosen client IP plus the proxy headers that were considered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp {
    pub ip: String,
    pub source: IpSource,
    pub forwarded_for: Option<String>,
    pub real_ip: Option<String>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Pick the client IP: `cf-connecting-ip`, then the left-most
/// `x-forwarded-for` entry, then `x-real-ip`, then the socket peer.
pub fn pick_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientIp {
    let forwarded_for = header(headers, "x-forwarded-for").map(str::to_string);
    let real_ip = header(headers, "x-real-ip").map(str::to_string);
    let chosen = |ip: &str, source| ClientIp {
        ip: ip.to_string(),
        source,
        forwarded_for: forwarded_for.clone(),
        real_ip: real_ip.clone(),
    };

    if let Some(cf) = header(headers, "cf-connecting-ip") {
        return chosen(cf, IpSource::CfConnectingIp);
    }

    if let Some(first) = forwarded_for
        .as_deref()
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty() && !ip.contains(char::is_whitespace))
    {
        return chosen(first, IpSource::XForwardedFor);
    }

    if let Some(real) = real_ip.as_deref() {
        return chosen(real, IpSource::XRealIp);
    }

    let peer_ip = peer.map(|addr| addr.ip().to_string());
    chosen(peer_ip.as_deref().unwrap_or(UNKNOWN_IP), IpSource::Peer)
}

/// Rate limit key: the `x-api-key` header if present, else the client IP.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    match header(headers, "x-api-key") {
        Some(key) => key.to_string(),
        None => pick_client_ip(headers, peer).ip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.9:5555".parse().unwrap())
    }

    #[test]
    fn test_cloudflare_wins() {
        let h = headers(&[
            ("cf-connecting-ip", " 1.1.1.1 "),
            ("x-forwarded-for", "2.2.2.2, 3.3.3.3"),
            ("x-real-ip", "4.4.4.4"),
        ]);
        let ip = pick_client_ip(&h, peer());
        assert_eq!(ip.ip, "1.1.1.1");
        assert_eq!(ip.source, IpSource::CfConnectingIp);
        assert_eq!(ip.forwarded_for.as_deref(), Some("2.2.2.2, 3.3.3.3"));
        assert_eq!(ip.real_ip.as_deref(), Some("4.4.4.4"));
    }

    #[test]
    fn test_leftmost_forwarded_for() {
        let h = headers(&[("x-forwarded-for", "2.2.2.2, 3.3.3.3"), ("x-real-ip", "4.4.4.4")]);
        let ip = pick_client_ip(&h, peer());
        assert_eq!(ip.ip, "2.2.2.2");
        assert_eq!(ip.source, IpSource::XForwardedFor);
    }

    #[test]
    fn test_malformed_forwarded_for_falls_through() {
        let h = headers(&[("x-forwarded-for", ", 3.3.3.3"), ("x-real-ip", "4.4.4.4")]);
        let ip = pick_client_ip(&h, peer());
        assert_eq!(ip.ip, "4.4.4.4");
        assert_eq!(ip.source, IpSource::XRealIp);
    }

    #[test]
    fn test_peer_and_unknown() {
        let ip = pick_client_ip(&HeaderMap::new(), peer());
        assert_eq!(ip.ip, "10.0.0.9");
        assert_eq!(ip.source, IpSource::Peer);

        let ip = pick_client_ip(&HeaderMap::new(), None);
        assert_eq!(ip.ip, UNKNOWN_IP);
        assert_eq!(ip.source, IpSource::Peer);
    }

    #[test]
    fn test_client_key_prefers_api_key() {
        let h = headers(&[("x-api-key", " secret "), ("x-real-ip", "4.4.4.4")]);
        assert_eq!(client_key(&h, peer()), "secret");

        let h = headers(&[("x-api-key", "  "), ("x-real-ip", "4.4.4.4")]);
        assert_eq!(client_key(&h, peer()), "4.4.4.4");
    }
}
