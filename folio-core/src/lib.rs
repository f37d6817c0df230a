#![warn(missing_docs)]
//! # folio-core
//!
//! Core types for the Folio offline chapter cache.
//!
//! This crate provides the foundational types shared by the backend seam
//! and the cache facade:
//!
//! - **Address** a chapter ([`ChapterKey`], [`BookKey`], [`KeyScope`])
//! - **Model** its content ([`Description`], [`GeneratedImage`],
//!   [`ChapterRecord`], [`ChapterPayload`])
//! - **Decide** liveness ([`is_expired`])
//!
//! Keys order by `(user, book, chapter)` so an ordered substrate can scan a
//! whole per-book collection as one contiguous range.

pub mod chapter;
pub mod expire;
pub mod key;

pub use chapter::{
    ChapterPayload, ChapterRecord, Description, DescriptionCategory, GeneratedImage, ImageStatus,
    merge_images,
};
pub use expire::is_expired;
pub use key::{BookKey, ChapterKey, KeyScope};

/// Raw byte data type used for serialized chapter records.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
