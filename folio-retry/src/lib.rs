#![warn(missing_docs)]
//! # folio-retry
//!
//! Backoff retry executor for the Folio e-book reader's fetch paths.
//!
//! Wraps an arbitrary async operation and retries it a bounded number of
//! times with exponentially increasing, optionally jittered delay. Errors
//! are classified as *retryable* (transient network/5xx-class trouble) or
//! *fatal* (everything else) by a pluggable predicate; fatal errors fail
//! fast on the first attempt, and an exhausted retry sequence surfaces the
//! last error unchanged.
//!
//! The executor knows nothing about what it retries — the chapter cache
//! and the fetch layer compose with it only through the caller.
//!
//! ```
//! use folio_retry::{RetryConfig, RetryPolicy, retry_with_backoff};
//!
//! # #[derive(Debug)] struct FetchError;
//! # impl std::fmt::Display for FetchError {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "boom") }
//! # }
//! # async fn example() -> Result<(), FetchError> {
//! let config = RetryConfig::with_predicate(RetryPolicy::interactive(), |_: &FetchError| true);
//! let chapter = retry_with_backoff(|| async { Ok::<_, FetchError>("chapter text") }, &config).await?;
//! # Ok(())
//! # }
//! ```

mod adapters;
mod classify;
mod config;
mod executor;
mod policy;

pub use adapters::{query_delay_fn, query_retry_fn, retry_batch, with_retry};
pub use classify::{ErrorStatus, default_is_retryable, is_transient_message, is_transient_status};
pub use config::{RetryConfig, RetryObserver, RetryPredicate};
pub use executor::retry_with_backoff;
pub use policy::RetryPolicy;
