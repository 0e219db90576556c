use std::net::IpAddr;

use thiserror::Error;
use url::Url;

/// Why a string was refused as a remote feed source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    /// `localhost`, a `.localhost` name or a loopback address.
    #[error("Localhost not allowed")]
    Localhost,

    #[error("Private IP address not allowed: {0}")]
    PrivateIp(IpAddr),
}

/// Parses `source` as a remote feed URL.
///
/// Only `http` and `https` URLs naming a public host are accepted; loopback,
/// private, link-local and unspecified addresses are refused so a feed
/// source cannot point the remote loader at internal services.
pub fn validate_remote_source(source: &str) -> Result<Url, SourceError> {
    let url = Url::parse(source)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SourceError::UnsupportedScheme(url.scheme().to_owned()));
    }

    let host = url.host_str().ok_or(SourceError::MissingHost)?;
    if host.eq_ignore_ascii_case("localhost") || host.to_ascii_lowercase().ends_with(".localhost") {
        return Err(SourceError::Localhost);
    }

    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        // ::ffff:a.b.c.d reaches the same host as a.b.c.d
        let ip = match ip {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
            IpAddr::V4(_) => ip,
        };
        if ip.is_loopback() {
            return Err(SourceError::Localhost);
        }
        if is_internal(ip) {
            return Err(SourceError::PrivateIp(ip));
        }
    }

    Ok(url)
}

fn is_internal(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link-local
            v6.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}
