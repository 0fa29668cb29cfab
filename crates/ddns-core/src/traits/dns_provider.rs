// # DNS Provider Trait
//
// Defines the minimal capability the record updater needs from a DNS host.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
// - In-memory: `ddns_core::provider::MemoryDnsProvider` (tests, embedding)
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsProvider, RecordType};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zone_id = provider.zone_id_by_name("example.com").await?;
//     let records = provider
//         .list_records(&zone_id, "home.example.com", RecordType::A)
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record type managed by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[serde(rename = "A")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name of the type
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as the provider reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// The record ID (provider-specific, stable across calls)
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record type as reported by the provider
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content (the address literal for A/AAAA)
    pub content: String,
}

impl DnsRecord {
    /// Same record with new content; ID, name and type are kept
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}

/// Trait for DNS provider adapters
///
/// Three single-shot operations, each one API round-trip. Implementations
/// must not retry, cache, create or delete records; the updater decides
/// whether a write is needed.
///
/// # Thread Safety
///
/// Implementations must be thread-safe: the IPv4 and IPv6 passes may share
/// one provider concurrently.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name (e.g. "example.com") to the provider's zone ID
    async fn zone_id_by_name(&self, zone: &str) -> Result<String, crate::Error>;

    /// List records in a zone matching `name` and `record_type` exactly
    ///
    /// An empty list is not an error.
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Replace a record by ID and return the stored result
    ///
    /// Only `record.content` is expected to differ from the stored record.
    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_content_keeps_identity() {
        let record = DnsRecord {
            id: "rec-1".to_string(),
            name: "home.example.com".to_string(),
            record_type: "A".to_string(),
            content: "203.0.113.1".to_string(),
        };

        let updated = record.with_content("203.0.113.7");
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.name, record.name);
        assert_eq!(updated.record_type, record.record_type);
        assert_eq!(updated.content, "203.0.113.7");
    }

    #[test]
    fn record_type_wire_names() {
        assert_eq!(RecordType::A.to_string(), "A");
        assert_eq!(RecordType::Aaaa.to_string(), "AAAA");
        assert_eq!(serde_json::to_string(&RecordType::Aaaa).unwrap(), "\"AAAA\"");
    }
}
