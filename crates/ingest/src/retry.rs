//! Bounded retry with exponential backoff.
//!
//! Wraps a single source-adapter call. `Success` and `Empty` are definitive
//! answers and return immediately; only retryable failures re-enter the loop.
//! The backoff doubles per attempt up to a cap, and a server-advised
//! `retry-after` widens the wait beyond the schedule when it asks for more.
//! One implementation serves both sources with per-source [`RetryConfig`]
//! records.

use std::future::Future;
use std::time::Duration;

use equity_snap_core::config::RetryConfig;
use equity_snap_core::error::FetchError;
use equity_snap_core::outcome::FetchOutcome;

/// Runs `operation` under the retry policy in `config`.
///
/// Exhausting the allowed attempts returns the last failure with its reason
/// intact. `label` only feeds the logs.
pub async fn retry_fetch<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
) -> FetchOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchOutcome<T>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            FetchOutcome::Failed(err) if err.is_retryable() && attempt < config.max_attempts => {
                let wait = backoff_delay(config, attempt, &err);
                tracing::warn!(
                    label,
                    attempt,
                    max_attempts = config.max_attempts,
                    wait_ms = wait.as_millis() as u64,
                    error = %err,
                    "Fetch failed, backing off before retry"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

/// Wait before attempt `attempt + 1`: exponential from the base, capped, then
/// widened to any server-advised minimum.
fn backoff_delay(config: &RetryConfig, attempt: u32, err: &FetchError) -> Duration {
    let exponential = config
        .base_delay()
        .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
    let capped = exponential.min(config.max_delay());
    match err.retry_after() {
        Some(advised) => capped.max(advised),
        None => capped,
    }
}
