//! Cooperative cancellation for network calls

use crate::error::{Error, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `fut` until it completes or `token` is cancelled.
///
/// On cancellation the future is dropped, which aborts any in-flight
/// request it owns, and [`Error::Canceled`] is returned. An already
/// cancelled token never polls `fut`.
pub async fn cancellable<F, T>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Canceled),
        res = fut => res,
    }
}
