// # Memory DNS Provider
//
// In-memory implementation of DnsProvider.
//
// ## Purpose
//
// Stands in for a hosted DNS provider: zones map to provider IDs and hold
// records with stable IDs. Useful for testing the updater, for embedding
// without network access, and for validating configuration.
//
// ## Behavior
//
// - Zone and record lookups are exact, case-sensitive string matches
// - Records are never created or deleted through the trait
// - Clones share the same storage and write counter

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::{DnsProvider, DnsRecord, RecordType};

#[derive(Debug, Default)]
struct Zones {
    /// zone name -> zone ID
    ids: HashMap<String, String>,
    /// zone ID -> records
    records: HashMap<String, Vec<DnsRecord>>,
}

/// In-memory DNS provider
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::provider::MemoryDnsProvider;
/// use ddns_core::traits::{DnsProvider, DnsRecord, RecordType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = MemoryDnsProvider::new();
///     provider.add_zone("example.com", "zone-1").await;
///     provider
///         .add_record(
///             "zone-1",
///             DnsRecord {
///                 id: "rec-1".into(),
///                 name: "home.example.com".into(),
///                 record_type: "A".into(),
///                 content: "203.0.113.1".into(),
///             },
///         )
///         .await;
///
///     let zone_id = provider.zone_id_by_name("example.com").await?;
///     let records = provider
///         .list_records(&zone_id, "home.example.com", RecordType::A)
///         .await?;
///     assert_eq!(records.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDnsProvider {
    zones: Arc<RwLock<Zones>>,
    writes: Arc<AtomicUsize>,
    reject_writes: Arc<AtomicBool>,
    reject_lists: Arc<AtomicBool>,
}

impl MemoryDnsProvider {
    /// Create a provider with no zones
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone under a provider ID
    pub async fn add_zone(&self, name: impl Into<String>, id: impl Into<String>) {
        let id = id.into();
        let mut zones = self.zones.write().await;
        zones.records.entry(id.clone()).or_default();
        zones.ids.insert(name.into(), id);
    }

    /// Seed a record into a zone (bypasses the write counter)
    pub async fn add_record(&self, zone_id: &str, record: DnsRecord) {
        self.zones
            .write()
            .await
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
    }

    /// Current state of a record by ID, in any zone
    pub async fn record(&self, id: &str) -> Option<DnsRecord> {
        self.zones
            .read()
            .await
            .records
            .values()
            .flatten()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Number of successful `update_record` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent `update_record` call fail
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Make every subsequent `list_records` call fail
    pub fn reject_lists(&self, reject: bool) {
        self.reject_lists.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl DnsProvider for MemoryDnsProvider {
    async fn zone_id_by_name(&self, zone: &str) -> Result<String, Error> {
        self.zones
            .read()
            .await
            .ids
            .get(zone)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {zone}")))
    }

    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>, Error> {
        if self.reject_lists.load(Ordering::SeqCst) {
            return Err(Error::provider("memory", "record listing is rejected"));
        }

        let zones = self.zones.read().await;
        let records = zones
            .records
            .get(zone_id)
            .ok_or_else(|| Error::not_found(format!("Zone ID not found: {zone_id}")))?;

        Ok(records
            .iter()
            .filter(|r| r.name == name && r.record_type == record_type.as_str())
            .cloned()
            .collect())
    }

    async fn update_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord, Error> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(Error::provider("memory", "writes are rejected"));
        }

        let mut zones = self.zones.write().await;
        let stored = zones
            .records
            .get_mut(zone_id)
            .ok_or_else(|| Error::not_found(format!("Zone ID not found: {zone_id}")))?
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::not_found(format!("DNS record not found: {}", record.id)))?;

        *stored = record.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored.clone())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
