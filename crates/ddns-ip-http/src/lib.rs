// # HTTP Address Resolver
//
// This crate provides the HTTP IP-echo lookup for the DDNS updater.
//
// ## Architecture
//
// Sends one GET to an IP-echo endpoint (e.g. api.ipify.org, icanhazip.com)
// and reads the first line of the plain-text answer.
//
// ## Family Pinning
//
// Each address family gets its own `reqwest::Client` whose connector is
// bound to the unspecified local address of that family (`0.0.0.0` / `::`).
// Bound that way the connector only dials remote addresses of the same
// family and never starts the Happy-Eyeballs race, so an IPv6 lookup on a
// host without IPv6 connectivity fails with a network error instead of
// quietly answering over IPv4. The answer is checked against the family
// again after parsing.
//
// Proxies are disabled: a proxy would make the endpoint see the proxy's
// address instead of ours.

use async_trait::async_trait;
use ddns_core::address::{MAX_LINE_LEN, parse_address};
use ddns_core::traits::{AddressFamily, AddressResolver};
use ddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default timeout for a lookup (connect + full response)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based address resolver
#[derive(Debug, Clone)]
pub struct HttpAddressResolver {
    /// Client for unpinned lookups
    any: reqwest::Client,

    /// Client dialing IPv4 only
    v4: reqwest::Client,

    /// Client dialing IPv6 only
    v6: reqwest::Client,
}

impl HttpAddressResolver {
    /// Create a resolver with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a resolver with a custom per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            any: build_client(AddressFamily::Any, timeout)?,
            v4: build_client(AddressFamily::V4, timeout)?,
            v6: build_client(AddressFamily::V6, timeout)?,
        })
    }

    fn client(&self, family: AddressFamily) -> &reqwest::Client {
        match family {
            AddressFamily::Any => &self.any,
            AddressFamily::V4 => &self.v4,
            AddressFamily::V6 => &self.v6,
        }
    }
}

/// Build a client whose connections are restricted to `family`
pub fn build_client(family: AddressFamily, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .local_address(family.local_bind())
        .no_proxy()
        .user_agent(concat!("ddns/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self, endpoint: &str, family: AddressFamily) -> Result<IpAddr> {
        tracing::debug!("Fetching current {} address from {}", family, endpoint);

        let mut response = self
            .client(family)
            .get(endpoint)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    Error::config(format!("Invalid IP endpoint {}: {}", endpoint, e))
                } else {
                    Error::network(format!("Current IP request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::protocol(format!(
                "IP provider returned HTTP {}",
                response.status()
            )));
        }

        // `response` is dropped on return, releasing the connection and
        // any unread part of the body
        let line = read_first_line(&mut response).await?;
        let ip = parse_address(&line, family)?;

        tracing::debug!("IP provider answered {}", ip);
        Ok(ip)
    }
}

/// Read the body up to and including the first `\n`, and no further
async fn read_first_line(response: &mut reqwest::Response) -> Result<Vec<u8>> {
    let mut line = Vec::new();

    while let Some(chunk) = response.chunk().await.map_err(|e| {
        if e.is_timeout() {
            Error::network(format!("Timed out reading IP provider response: {}", e))
        } else {
            Error::protocol(format!("Failed to read IP provider response: {}", e))
        }
    })? {
        let end = chunk.iter().position(|&b| b == b'\n');
        line.extend_from_slice(&chunk[..end.map_or(chunk.len(), |i| i + 1)]);
        check_line_len(&line)?;

        if end.is_some() {
            return Ok(line);
        }
    }

    Ok(line)
}

/// Reject a first line (newline excluded) longer than [`MAX_LINE_LEN`]
fn check_line_len(line: &[u8]) -> Result<()> {
    let content_len = line.strip_suffix(b"\n").unwrap_or(line).len();
    if content_len > MAX_LINE_LEN {
        return Err(Error::Parse {
            input: String::from_utf8_lossy(&line[..MAX_LINE_LEN]).into_owned(),
            reason: format!("first line longer than {} bytes", MAX_LINE_LEN),
        });
    }
    Ok(())
}
