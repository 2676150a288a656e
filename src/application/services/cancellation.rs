use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::AuditError;

/// Races `fut` against `cancel`; cancellation wins ties.
pub(crate) async fn until_cancelled<T>(
    cancel: &CancellationToken,
    phase: &'static str,
    fut: impl Future<Output = T>,
) -> Result<T, AuditError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AuditError::Cancelled(phase)),
        out = fut => Ok(out),
    }
}
