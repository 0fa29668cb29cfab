//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressResolver`]: Discover the current public address
//! - [`DnsProvider`]: Look up and update DNS records via provider APIs

pub mod address_resolver;
pub mod dns_provider;

pub use address_resolver::{AddressFamily, AddressResolver};
pub use dns_provider::{DnsProvider, DnsRecord, RecordType};
