//! Record updater: compare one DNS record with the desired content and
//! write it only when it differs.

use crate::cancel::cancellable;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsRecord, RecordType};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What [`update_record`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Content differed and was replaced
    Updated {
        /// The record as stored by the provider after the write
        record: DnsRecord,
        /// Content before the write
        previous_content: String,
    },
    /// Content already matched; nothing was written
    NoChange {
        /// The existing record
        record: DnsRecord,
    },
}

impl UpdateOutcome {
    /// The record after this call
    pub fn record(&self) -> &DnsRecord {
        match self {
            UpdateOutcome::Updated { record, .. } | UpdateOutcome::NoChange { record } => record,
        }
    }

    /// Whether a write happened
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}

/// Make the single `name`/`record_type` record in `zone` hold `content`.
///
/// Exactly one matching record must exist; zero or several fail with
/// [`Error::RecordCount`] and nothing is written. Content is compared as
/// an exact string. Only content is changed; ID, name and type are sent
/// back as the provider reported them.
///
/// # Errors
///
/// - [`Error::ZoneResolution`]: zone lookup failed
/// - [`Error::RecordLookup`]: listing records failed
/// - [`Error::RecordCount`]: not exactly one match
/// - [`Error::Update`]: the provider rejected the write
/// - [`Error::Canceled`]: `cancel` fired during a provider call
pub async fn update_record<P>(
    provider: &P,
    cancel: &CancellationToken,
    zone: &str,
    name: &str,
    record_type: RecordType,
    content: &str,
) -> Result<UpdateOutcome>
where
    P: DnsProvider + ?Sized,
{
    let zone_id = cancellable(cancel, provider.zone_id_by_name(zone))
        .await
        .map_err(|e| {
            unless_canceled(e, |source| Error::ZoneResolution {
                zone: zone.to_string(),
                source,
            })
        })?;
    debug!("Resolved zone {} to {}", zone, zone_id);

    let mut records = cancellable(cancel, provider.list_records(&zone_id, name, record_type))
        .await
        .map_err(|e| {
            unless_canceled(e, |source| Error::RecordLookup {
                name: name.to_string(),
                record_type,
                source,
            })
        })?;

    if records.len() != 1 {
        return Err(Error::RecordCount {
            name: name.to_string(),
            record_type,
            count: records.len(),
        });
    }
    let record = records.remove(0);

    if record.content == content {
        debug!(
            "{} record {} already holds {}",
            record.record_type, record.name, record.content
        );
        return Ok(UpdateOutcome::NoChange { record });
    }

    debug!(
        "Updating {} record {}: {} -> {}",
        record.record_type, record.name, record.content, content
    );
    let desired = record.with_content(content);
    let stored = cancellable(cancel, provider.update_record(&zone_id, &desired))
        .await
        .map_err(|e| {
            unless_canceled(e, |source| Error::Update {
                name: name.to_string(),
                record_type,
                source,
            })
        })?;

    Ok(UpdateOutcome::Updated {
        record: stored,
        previous_content: record.content,
    })
}

/// Map a provider failure into a stage error, leaving cancellation visible
fn unless_canceled(err: Error, wrap: impl FnOnce(Box<Error>) -> Error) -> Error {
    if err.is_canceled() {
        err
    } else {
        wrap(Box::new(err))
    }
}
