//! Outbound address gate.
//!
//! Page URLs and `og:image` URLs both come from untrusted input, so before a
//! request leaves the process its host is resolved and every answer must be a
//! public unicast address.

use std::net::IpAddr;
use url::{Host, Url};

/// Error type for SSRF validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsrfError {
    #[error("blocked IP: {0} (private/reserved)")]
    BlockedIp(IpAddr),

    #[error("DNS resolution failed for {host}: {reason}")]
    DnsError { host: String, reason: String },

    #[error("no host in URL")]
    NoHost,
}

/// Whether `ip` is routable on the public internet.
///
/// Rejects loopback, RFC 1918, CGNAT (100.64/10), link-local, multicast,
/// broadcast, unspecified, `0/8`, IPv6 unique-local (`fc00::/7`), IPv6
/// link-local (`fe80::/10`), and IPv4-mapped forms of any of those.
pub fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_multicast()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || a == 0
                || (a == 100 && (64..128).contains(&b)))
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_public(IpAddr::V4(mapped));
            }
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
    }
}

/// Resolve the URL's host and reject it unless every address is public.
pub async fn check_host(url: &Url) -> Result<(), SsrfError> {
    let host = url.host().ok_or(SsrfError::NoHost)?;
    let port = url.port_or_known_default().unwrap_or(443);

    let addresses: Vec<IpAddr> = match &host {
        Host::Ipv4(ip) => vec![IpAddr::V4(*ip)],
        Host::Ipv6(ip) => vec![IpAddr::V6(*ip)],
        Host::Domain(domain) => tokio::net::lookup_host((*domain, port))
            .await
            .map_err(|e| SsrfError::DnsError { host: domain.to_string(), reason: e.to_string() })?
            .map(|addr| addr.ip())
            .collect(),
    };

    if addresses.is_empty() {
        return Err(SsrfError::DnsError { host: host.to_string(), reason: "no addresses".into() });
    }

    match addresses.into_iter().find(|ip| !is_public(*ip)) {
        Some(blocked) => Err(SsrfError::BlockedIp(blocked)),
        None => Ok(()),
    }
}
