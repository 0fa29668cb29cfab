// # Address Resolver Trait
//
// Defines the interface for discovering the caller's public IP address.
//
// ## Implementations
//
// - HTTP IP-echo endpoint: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{AddressFamily, AddressResolver};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* AddressResolver implementation */;
//
//     let ip = resolver
//         .resolve("https://api.ipify.org", AddressFamily::V4)
//         .await?;
//     assert!(ip.is_ipv4());
//
//     Ok(())
// }
// ```

use super::dns_provider::RecordType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Which IP family a lookup must use, both for dialing and for the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// Whatever the network stack picks; no validation of the answer
    #[default]
    Any,
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
}

impl AddressFamily {
    /// Whether `ip` belongs to this family
    pub fn matches(self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::V4 => ip.is_ipv4(),
            AddressFamily::V6 => ip.is_ipv6(),
        }
    }

    /// Unspecified local address to bind outgoing connections to.
    ///
    /// Binding to `0.0.0.0` or `::` restricts the connector to remote
    /// addresses of the same family and turns off the Happy-Eyeballs race,
    /// so a host without a usable address in this family fails to connect
    /// instead of silently switching families. `None` for [`AddressFamily::Any`].
    pub fn local_bind(self) -> Option<IpAddr> {
        match self {
            AddressFamily::Any => None,
            AddressFamily::V4 => Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            AddressFamily::V6 => Some(IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
        }
    }

    /// DNS record type holding addresses of this family
    pub fn record_type(self) -> Option<RecordType> {
        match self {
            AddressFamily::Any => None,
            AddressFamily::V4 => Some(RecordType::A),
            AddressFamily::V6 => Some(RecordType::Aaaa),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressFamily::Any => "any",
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        })
    }
}

/// Trait for public-address lookups
///
/// Implementations perform exactly one request per call: no retries, no
/// caching, no fallback endpoint. Errors are returned to the caller
/// unchanged; cancellation is applied by the caller around the returned
/// future, so dropping it must abort any in-flight I/O.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Look up the current public address through `endpoint`
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: an address for which `family.matches()` holds
    /// - `Err(Error::Network)`: transport failure
    /// - `Err(Error::Protocol)`: empty or unreadable response
    /// - `Err(Error::Parse)`: first line is not an address literal
    /// - `Err(Error::FamilyMismatch)`: address of the wrong family
    async fn resolve(&self, endpoint: &str, family: AddressFamily)
    -> Result<IpAddr, crate::Error>;
}
