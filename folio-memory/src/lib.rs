#![warn(missing_docs)]
//! # folio-memory
//!
//! In-process backend for the Folio chapter cache, backed by an ordered
//! map. This is the default substrate for a reader session and the one
//! every test runs against.

mod backend;

pub use backend::MemoryBackend;
