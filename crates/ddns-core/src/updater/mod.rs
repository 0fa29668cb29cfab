//! DDNS orchestration
//!
//! A pass is a fixed sequential chain:
//!
//! ```text
//! ┌──────────────────┐  IpAddr   ┌───────────────┐
//! │ AddressResolver  │─────────▶ │ update_record │───▶ DnsProvider
//! └──────────────────┘           └───────────────┘
//! ```
//!
//! 1. Resolve the public address with the family-pinned resolver
//! 2. Look up the single A/AAAA record for the domain
//! 3. Write the new address only if it differs
//!
//! Every call is stateless and independent. Repeating a pass with the same
//! address converges to [`UpdateOutcome::NoChange`]. Nothing is retried;
//! the caller decides whether to run another pass later.

mod record;

pub use record::{UpdateOutcome, update_record};

use crate::cancel::cancellable;
use crate::error::{Error, Result};
use crate::traits::{AddressFamily, AddressResolver, DnsProvider};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of one orchestrated pass for one address family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainUpdate {
    /// The address the resolver returned
    pub address: IpAddr,
    /// What happened to the DNS record
    pub outcome: UpdateOutcome,
}

/// Orchestrates address resolution and record updates
///
/// Holds no mutable state, so the IPv4 and IPv6 passes can run
/// concurrently on one instance.
pub struct DdnsUpdater {
    resolver: Box<dyn AddressResolver>,
    provider: Box<dyn DnsProvider>,
}

impl DdnsUpdater {
    /// Create an updater from a resolver and a provider
    pub fn new(resolver: Box<dyn AddressResolver>, provider: Box<dyn DnsProvider>) -> Self {
        Self { resolver, provider }
    }

    /// The provider records are written through
    pub fn provider(&self) -> &dyn DnsProvider {
        self.provider.as_ref()
    }

    /// Point the A record of `domain_name` in `zone` at the current IPv4 address
    pub async fn update_domain4(
        &self,
        cancel: &CancellationToken,
        zone: &str,
        domain_name: &str,
        ip_endpoint: &str,
    ) -> Result<DomainUpdate> {
        self.update_domain(cancel, AddressFamily::V4, zone, domain_name, ip_endpoint)
            .await
    }

    /// Point the AAAA record of `domain_name` in `zone` at the current IPv6 address
    pub async fn update_domain6(
        &self,
        cancel: &CancellationToken,
        zone: &str,
        domain_name: &str,
        ip_endpoint: &str,
    ) -> Result<DomainUpdate> {
        self.update_domain(cancel, AddressFamily::V6, zone, domain_name, ip_endpoint)
            .await
    }

    async fn update_domain(
        &self,
        cancel: &CancellationToken,
        family: AddressFamily,
        zone: &str,
        domain_name: &str,
        ip_endpoint: &str,
    ) -> Result<DomainUpdate> {
        let record_type = family.record_type().ok_or_else(|| {
            Error::config(format!("address family {family} has no DNS record type"))
        })?;

        let address = cancellable(cancel, self.resolver.resolve(ip_endpoint, family))
            .await
            .map_err(|e| e.context(format!("could not get the current {family} address")))?;
        debug!("Got current {} address: {}", family, address);

        let outcome = update_record(
            self.provider.as_ref(),
            cancel,
            zone,
            domain_name,
            record_type,
            &address.to_string(),
        )
        .await
        .map_err(|e| e.context(format!("failed to update {record_type} record")))?;

        Ok(DomainUpdate { address, outcome })
    }
}
