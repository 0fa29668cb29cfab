//! Error types for the DDNS updater
//!
//! Every way a single update pass can fail maps to one variant here. Stage
//! information is layered on top with [`Error::Context`]; use
//! [`Error::root_cause`] to get back to the underlying kind.

use crate::traits::{AddressFamily, RecordType};
use std::net::IpAddr;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, TLS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Empty, unreadable or otherwise unusable response
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Response text is not an IP address literal
    #[error("Failed to parse IP address {input:?}: {reason}")]
    Parse {
        /// The offending text
        input: String,
        /// Parser message
        reason: String,
    },

    /// The resolved address is not of the requested family
    #[error("IP address family mismatch: expected {family}, got {address}")]
    FamilyMismatch {
        /// Requested family
        family: AddressFamily,
        /// Address actually returned by the endpoint
        address: IpAddr,
    },

    /// The zone could not be turned into a provider zone ID
    #[error("Could not find zone by name {zone}: {source}")]
    ZoneResolution {
        /// Zone name
        zone: String,
        /// Provider failure
        source: Box<Error>,
    },

    /// Listing records failed
    #[error("Error listing {record_type} records for {name}: {source}")]
    RecordLookup {
        /// Record name
        name: String,
        /// Record type
        record_type: RecordType,
        /// Provider failure
        source: Box<Error>,
    },

    /// Zero or several records match name and type
    #[error("Expected to find a single {record_type} record for {name}, got {count}")]
    RecordCount {
        /// Record name
        name: String,
        /// Record type
        record_type: RecordType,
        /// Number of matching records
        count: usize,
    },

    /// The provider rejected the write
    #[error("Could not update the {record_type} record for {name}: {source}")]
    Update {
        /// Record name
        name: String,
        /// Record type
        record_type: RecordType,
        /// Provider failure
        source: Box<Error>,
    },

    /// The caller's cancellation token fired
    #[error("Operation canceled")]
    Canceled,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record or zone not found at the provider
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// An error with one line of stage context
    #[error("{context}: {source}")]
    Context {
        /// What was being done
        context: String,
        /// The wrapped error
        source: Box<Error>,
    },
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap this error with a line of context
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error below any [`Error::Context`] layers
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Whether this error (below any context) is a cancellation
    pub fn is_canceled(&self) -> bool {
        matches!(self.root_cause(), Error::Canceled)
    }
}
