use std::future::Future;

use tracing::debug;

use crate::config::RetryConfig;

/// Executes `operation`, retrying transient failures with backoff.
///
/// The first attempt runs immediately. On failure the config's predicate
/// decides: a non-retryable error is returned at once with zero delay and
/// no further attempts; a retryable one sleeps the computed delay (after
/// notifying the observer) and tries again, up to `max_retries` extra
/// attempts — `max_retries + 1` invocations in total. Exhaustion returns
/// the last observed error unchanged.
pub async fn retry_with_backoff<Op, Fut, T, E>(
    mut operation: Op,
    config: &RetryConfig<E>,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !config.is_retryable(&error) {
            debug!(attempt, "non-retryable failure, failing fast");
            return Err(error);
        }
        if attempt >= config.policy().max_retries {
            debug!(attempt, "retries exhausted");
            return Err(error);
        }

        let delay = config.policy().delay_for(attempt);
        config.notify_retry(attempt, &error, delay);
        debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "retrying after transient failure"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
