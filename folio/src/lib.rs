#![warn(missing_docs)]
//! # folio
//!
//! Offline chapter cache for an AI-illustrated e-book reader.
//!
//! [`ChapterCache`] keeps previously fetched chapter content — extracted
//! descriptions and their generated illustrations — in a persistent
//! per-user store so a reader can reopen a book without refetching. It
//! enforces a 7-day TTL, a per-book record ceiling with
//! least-recently-accessed eviction, and ships maintenance sweeps meant to
//! run once per session start.
//!
//! The cache is an optimization, never a dependency: every operation
//! catches storage trouble internally, logs it, and degrades to a safe
//! default (`false` / `None` / `0`). A miss always falls through to the
//! live fetch path.
//!
//! Construct one handle per session over any [`folio_backend::Backend`]
//! and pass it to callers — there is no global instance:
//!
//! ```
//! use folio::ChapterCache;
//! use folio_memory::MemoryBackend;
//!
//! let cache = ChapterCache::new(MemoryBackend::new());
//! # let _ = cache;
//! ```

/// Cache configuration: TTL and the per-book record ceiling.
pub mod config;

/// Error types for cache operations.
///
/// [`CacheError`] covers backend faults and record codec failures. It is
/// internal to the operation boundary: public cache methods log it and
/// degrade instead of returning it.
pub mod error;

/// Aggregate statistics over the physical record set.
pub mod stats;

mod cache;

pub use cache::{ChapterCache, MaintenanceReport};
pub use config::{CacheConfig, DEFAULT_MAX_RECORDS_PER_BOOK, DEFAULT_TTL};
pub use error::CacheError;
pub use stats::CacheStats;

pub use folio_core::{
    BookKey, ChapterKey, ChapterPayload, ChapterRecord, Description, DescriptionCategory,
    GeneratedImage, ImageStatus, KeyScope, Raw, is_expired, merge_images,
};
