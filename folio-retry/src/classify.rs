//! Default transient-error classification.
//!
//! The fetch layer's errors vary by platform, so the default predicate
//! looks at two things any of them can provide: an HTTP-like status code
//! (via [`ErrorStatus`]) and the rendered message. Anything not
//! recognizably transient is fatal — retrying a malformed request cannot
//! help.

use std::fmt;

/// Errors that can report an HTTP-like status code for retry
/// classification.
///
/// The default implementation reports none, which leaves only the
/// message-fragment check.
pub trait ErrorStatus {
    /// Status code carried by this error, if any.
    fn status(&self) -> Option<u16> {
        None
    }
}

/// Message fragments that mark an error as transient regardless of status.
const TRANSIENT_FRAGMENTS: &[&str] = &[
    "timeout",
    "timed out",
    "connection reset",
    "connection refused",
    "failed to fetch",
    "network error",
];

/// True for status codes worth retrying: request timeout (408), conflict
/// (409), rate limiting (429), and the whole 5xx family.
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 409 | 429) || (500..=599).contains(&status)
}

/// True if the message contains a known transient-network fragment.
pub fn is_transient_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    TRANSIENT_FRAGMENTS
        .iter()
        .any(|fragment| message.contains(fragment))
}

/// The default retryability predicate.
///
/// Retryable iff the error carries a transient status code or its message
/// matches a transient-network fragment. Everything else — including
/// application-level validation errors — is fatal.
pub fn default_is_retryable<E>(error: &E) -> bool
where
    E: ErrorStatus + fmt::Display,
{
    if let Some(status) = error.status()
        && is_transient_status(status)
    {
        return true;
    }
    is_transient_message(&error.to_string())
}
