// # ddns-core
//
// Core library for the DDNS updater.
//
// ## Architecture Overview
//
// One pass is a sequential call chain: fetch IP → compare → update-or-noop.
//
// - **AddressResolver**: Trait for discovering the public address over a pinned IP family
// - **DnsProvider**: Trait for the three provider calls the updater needs
//   (zone by name, list records by name+type, update record by ID)
// - **update_record**: Conditional single-record update
// - **DdnsUpdater**: Per-family orchestration (A for IPv4, AAAA for IPv6)
// - **MemoryDnsProvider**: In-memory provider for tests and embedding
//
// ## Design Principles
//
// 1. **Provider-agnostic**: Concrete APIs live in adapter crates
// 2. **Single attempt**: Errors propagate with stage context, no retries
// 3. **Observations, not logging**: Outcomes are returned to the caller
// 4. **Cancellable**: Every network call honors a `CancellationToken`

pub mod address;
pub mod cancel;
pub mod config;
pub mod error;
pub mod provider;
pub mod traits;
pub mod updater;

// Re-export core types for convenience
pub use address::parse_address;
pub use cancel::cancellable;
pub use config::{DdnsConfig, ProviderConfig};
pub use error::{Error, Result};
pub use provider::MemoryDnsProvider;
pub use traits::{AddressFamily, AddressResolver, DnsProvider, DnsRecord, RecordType};
pub use updater::{DdnsUpdater, DomainUpdate, UpdateOutcome, update_record};

pub use tokio_util::sync::CancellationToken;
