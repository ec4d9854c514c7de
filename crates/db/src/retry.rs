use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::DbError;

/// Total attempts for an operation failing with a transient error: the
/// first call plus three retries.
pub const MAX_ATTEMPTS: u32 = 4;
const BACKOFF_STEP_MS: u64 = 100;

/// Run `operation`, retrying transient connection errors with linear
/// backoff. Any other error is returned immediately.
pub async fn with_retry<T, F, Fut>(operation_name: &str, operation: F) -> Result<T, DbError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                let wait_ms = BACKOFF_STEP_MS * u64::from(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    wait_ms,
                    error = %err,
                    "Transient database error, retrying"
                );
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
