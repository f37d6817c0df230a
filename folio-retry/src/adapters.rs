//! Ways to apply one retry policy beyond a single call.
//!
//! A query layer wants `(failure_count, error)` callbacks, application
//! code wants a function that is "just retried" wherever it is called,
//! and batch prefetch wants every operation to settle independently.
//! All three reuse the same [`RetryConfig`] and executor semantics.

use std::future::Future;
use std::time::Duration;

use futures::future::{BoxFuture, join_all};

use crate::config::RetryConfig;
use crate::executor::retry_with_backoff;
use crate::policy::RetryPolicy;

/// Adapts the config into a query-library `(failure_count, error)`
/// predicate.
///
/// `failure_count` is the number of failed attempts so far, starting at 1
/// for the first failure. The closure allows a retry while the count has
/// not exceeded `max_retries` and the error classifies as retryable —
/// matching the executor's `max_retries + 1` total-invocation bound.
pub fn query_retry_fn<E>(config: &RetryConfig<E>) -> impl Fn(u32, &E) -> bool + Send + Sync {
    let max_retries = config.policy().max_retries;
    let predicate = config.predicate();
    move |failure_count, error| failure_count <= max_retries && predicate(error)
}

/// Adapts the policy into a query-library delay function.
///
/// `failure_count` is 1-based, as in [`query_retry_fn`]; the returned
/// delay is what the executor would sleep before the matching retry.
pub fn query_delay_fn(policy: RetryPolicy) -> impl Fn(u32) -> Duration + Send + Sync {
    move |failure_count| policy.delay_for(failure_count.saturating_sub(1))
}

/// Wraps an async function so every call through the wrapper is retried
/// under `config`.
///
/// The wrapped function and its argument are cloned per attempt, so the
/// retry sequence can re-invoke them.
pub fn with_retry<A, F, Fut, T, E>(
    f: F,
    config: RetryConfig<E>,
) -> impl Fn(A) -> BoxFuture<'static, Result<T, E>>
where
    A: Clone + Send + 'static,
    F: Fn(A) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: 'static,
    E: 'static + Send,
{
    move |arg: A| {
        let f = f.clone();
        let config = config.clone();
        Box::pin(async move { retry_with_backoff(move || f(arg.clone()), &config).await })
    }
}

/// Runs a batch of independent operations, each under its own retry
/// sequence, and reports every outcome.
///
/// Settle-all semantics: one operation exhausting its retries never
/// aborts the others; the result vector is in input order.
pub async fn retry_batch<Op, Fut, T, E>(
    operations: Vec<Op>,
    config: &RetryConfig<E>,
) -> Vec<Result<T, E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    join_all(
        operations
            .into_iter()
            .map(|operation| retry_with_backoff(operation, config)),
    )
    .await
}
