//! Configuration types for the DDNS updater
//!
//! This module defines the configuration consumed by the daemon and by
//! embedders constructing a [`DdnsUpdater`](crate::DdnsUpdater) themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Main DDNS configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Zone (registered domain) the record lives in, e.g. "example.com"
    pub zone: String,

    /// Fully qualified record name, e.g. "home.example.com"
    pub domain: String,

    /// IP-echo endpoint for the A record; `None` skips IPv4
    #[serde(default)]
    pub ipv4_endpoint: Option<String>,

    /// IP-echo endpoint for the AAAA record; `None` skips IPv6
    #[serde(default)]
    pub ipv6_endpoint: Option<String>,

    /// Timeout for each IP-echo request (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Repeat passes at this interval (in seconds); `None` runs a single pass
    #[serde(default)]
    pub interval_secs: Option<u64>,

    /// DNS provider configuration
    pub provider: ProviderConfig,
}

impl DdnsConfig {
    /// Create a configuration with defaults for `zone` and `domain`
    pub fn new(zone: impl Into<String>, domain: impl Into<String>, provider: ProviderConfig) -> Self {
        Self {
            zone: zone.into(),
            domain: domain.into(),
            ipv4_endpoint: Some(DEFAULT_IPV4_ENDPOINT.to_string()),
            ipv6_endpoint: None,
            http_timeout_secs: default_http_timeout_secs(),
            interval_secs: None,
            provider,
        }
    }

    /// Timeout for IP-echo requests
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Interval between passes, if running periodically
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(&self.zone)?;
        validate_domain_name(&self.domain)?;

        if self.domain != self.zone && !self.domain.ends_with(&format!(".{}", self.zone)) {
            return Err(crate::Error::config(format!(
                "Domain {} is not inside zone {}",
                self.domain, self.zone
            )));
        }

        if self.ipv4_endpoint.is_none() && self.ipv6_endpoint.is_none() {
            return Err(crate::Error::config(
                "At least one of the IPv4 or IPv6 endpoints must be set",
            ));
        }
        for endpoint in self.ipv4_endpoint.iter().chain(self.ipv6_endpoint.iter()) {
            validate_endpoint(endpoint)?;
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            return Err(crate::Error::config(format!(
                "HTTP timeout must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            )));
        }

        if let Some(interval) = self.interval_secs
            && !(10..=86_400).contains(&interval)
        {
            return Err(crate::Error::config(format!(
                "Update interval must be between 10 and 86400 seconds. Got: {}",
                interval
            )));
        }

        self.provider.validate()
    }
}

impl fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("zone", &self.zone)
            .field("domain", &self.domain)
            .field("ipv4_endpoint", &self.ipv4_endpoint)
            .field("ipv6_endpoint", &self.ipv6_endpoint)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("interval_secs", &self.interval_secs)
            .field("provider", &self.provider)
            .finish()
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token (Zone:DNS:Edit)
        api_token: String,
        /// API base URL override
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { api_token, base_url } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                if let Some(url) = base_url {
                    validate_endpoint(url)?;
                }
                Ok(())
            }
        }
    }
}

// The API token never appears in Debug output
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Cloudflare { base_url, .. } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// IPv4 IP-echo endpoint used when none is configured
pub const DEFAULT_IPV4_ENDPOINT: &str = "https://api.ipify.org";

fn default_http_timeout_secs() -> u64 {
    10
}

fn validate_endpoint(url: &str) -> Result<(), crate::Error> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "Endpoint must use HTTP or HTTPS scheme. Got: {}",
            url
        )));
    }
    if url.starts_with("http://") {
        tracing::warn!("Endpoint {} uses HTTP (not HTTPS)", url);
    }
    Ok(())
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: total length, label length, LDH characters.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'. \
                 Valid: alphanumeric and hyphen only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}
