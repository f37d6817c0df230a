use folio_backend::BackendError;
use thiserror::Error;

/// Error raised inside a cache operation.
///
/// Never escapes the public API: operations catch it at the boundary, log
/// it, and return their safe default instead.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The storage substrate failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A chapter record could not be encoded.
    #[error("chapter record encoding failed: {0}")]
    Codec(#[from] serde_json::Error),
}
