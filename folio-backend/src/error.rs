//! Error types for backend operations.

use thiserror::Error;

/// Error type for backend operations.
///
/// This enum categorizes errors that can occur while talking to the
/// storage substrate into distinct groups for appropriate handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote substrates.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send>),

    /// Record serialization or deserialization error.
    #[error(transparent)]
    CodecError(#[from] serde_json::Error),
}
