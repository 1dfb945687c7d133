use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use crate::errors::ScanGateError;
use super::clock::Clock;

/// Run `operation` unless the token fires first. A cancelled token always
/// wins, even when the operation is already complete.
pub async fn interruptible<F, T>(
    cancel: &CancellationToken,
    what: &str,
    operation: F,
) -> Result<T, ScanGateError>
where
    F: Future<Output = Result<T, ScanGateError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ScanGateError::Interrupted(format!("{} was interrupted", what))),
        result = operation => result,
    }
}

pub async fn interruptible_sleep(
    clock: &dyn Clock,
    cancel: &CancellationToken,
    duration: Duration,
) -> Result<(), ScanGateError> {
    interruptible(cancel, "waiting for prescan results", async {
        clock.sleep(duration).await;
        Ok(())
    })
    .await
}
