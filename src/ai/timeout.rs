//! Deadline and cancellation helpers for async operations

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::types::{BugsightError, Result};

/// Execute an async operation with a timeout
///
/// Returns `BugsightError::Timeout` if the operation doesn't complete within
/// the given duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(BugsightError::timeout(operation_name, timeout)),
    }
}

/// Apply an optional deadline and a cancellation token to an operation.
///
/// Cancellation wins over completion when both are ready.
pub async fn with_deadline<T, F>(
    deadline: Option<Duration>,
    cancel: &CancellationToken,
    future: F,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let bounded = async {
        match deadline {
            Some(limit) => with_timeout(limit, future, operation_name).await,
            None => future.await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BugsightError::Cancelled),
        result = bounded => result,
    }
}
