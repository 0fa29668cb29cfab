//! Test doubles and common utilities for the updater contract tests

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressFamily, AddressResolver, DnsRecord};
use ddns_core::MemoryDnsProvider;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ZONE: &str = "example.com";
pub const ZONE_ID: &str = "zone-1";
pub const DOMAIN: &str = "home.example.com";
pub const ENDPOINT: &str = "https://ip.example.net";

/// A resolver that answers with a fixed body, parsed like a real endpoint
pub struct StaticResolver {
    body: &'static [u8],
    calls: Arc<Mutex<Vec<(String, AddressFamily)>>>,
}

impl StaticResolver {
    pub fn new(body: &'static str) -> Self {
        Self {
            body: body.as_bytes(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Endpoint and family of every call so far (shared with clones of the handle)
    pub fn calls(&self) -> Arc<Mutex<Vec<(String, AddressFamily)>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl AddressResolver for StaticResolver {
    async fn resolve(&self, endpoint: &str, family: AddressFamily) -> Result<IpAddr> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), family));
        ddns_core::parse_address(self.body, family)
    }
}

/// A resolver whose lookup never completes
pub struct PendingResolver;

#[async_trait::async_trait]
impl AddressResolver for PendingResolver {
    async fn resolve(&self, _endpoint: &str, _family: AddressFamily) -> Result<IpAddr> {
        std::future::pending().await
    }
}

/// A resolver that always fails at the transport level
pub struct UnreachableResolver {
    pub calls: AtomicUsize,
}

impl UnreachableResolver {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for UnreachableResolver {
    async fn resolve(&self, _endpoint: &str, _family: AddressFamily) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::network("connection refused"))
    }
}

pub fn record(id: &str, record_type: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        name: DOMAIN.to_string(),
        record_type: record_type.to_string(),
        content: content.to_string(),
    }
}

/// Provider with the test zone and the given records
pub async fn provider_with(records: Vec<DnsRecord>) -> MemoryDnsProvider {
    let provider = MemoryDnsProvider::new();
    provider.add_zone(ZONE, ZONE_ID).await;
    for r in records {
        provider.add_record(ZONE_ID, r).await;
    }
    provider
}
