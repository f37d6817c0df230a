use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::classify::{ErrorStatus, default_is_retryable};
use crate::policy::RetryPolicy;

/// Decides whether an error is worth another attempt.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Observer invoked before each retry sleep with the zero-based index of
/// the attempt that just failed, the error, and the computed delay.
pub type RetryObserver<E> = Arc<dyn Fn(u32, &E, Duration) + Send + Sync>;

/// A retry policy bound to an error classification.
///
/// Immutable once constructed; cloning shares the predicate and observer.
pub struct RetryConfig<E> {
    policy: RetryPolicy,
    is_retryable: RetryPredicate<E>,
    on_retry: Option<RetryObserver<E>>,
}

impl<E> Clone for RetryConfig<E> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy,
            is_retryable: Arc::clone(&self.is_retryable),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("policy", &self.policy)
            .field("is_retryable", &"...")
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

impl<E> RetryConfig<E>
where
    E: ErrorStatus + fmt::Display + 'static,
{
    /// Creates a config using the default transient-error classification.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_predicate(policy, default_is_retryable)
    }
}

impl<E> RetryConfig<E> {
    /// Creates a config with an explicit retryability predicate.
    pub fn with_predicate(
        policy: RetryPolicy,
        predicate: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Self {
        policy.validate();
        RetryConfig {
            policy,
            is_retryable: Arc::new(predicate),
            on_retry: None,
        }
    }

    /// Attaches an observer invoked on each retry.
    pub fn on_retry(mut self, observer: impl Fn(u32, &E, Duration) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Arc::new(observer));
        self
    }

    /// Returns the numeric policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns a shared handle to the retryability predicate.
    pub fn predicate(&self) -> RetryPredicate<E> {
        Arc::clone(&self.is_retryable)
    }

    pub(crate) fn is_retryable(&self, error: &E) -> bool {
        (self.is_retryable)(error)
    }

    pub(crate) fn notify_retry(&self, attempt: u32, error: &E, delay: Duration) {
        if let Some(observer) = &self.on_retry {
            observer(attempt, error, delay);
        }
    }
}
