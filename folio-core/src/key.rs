//! Chapter key types and scan scopes.
//!
//! A cached chapter is addressed by the composite key
//! `(user, book, chapter)`. The key derives `Ord` over its fields in that
//! order, so every record of one `(user, book)` collection is a contiguous
//! range in an ordered store — collection-scoped eviction and clearing are
//! range scans, not substring tricks over flat string keys.
//!
//! When a flat string form is needed (log lines, string-keyed substrates),
//! `Display` renders the single opaque key `user:book:chN`:
//!
//! ```
//! use folio_core::ChapterKey;
//!
//! let key = ChapterKey::new("u1", "moby-dick", 7);
//! assert_eq!(format!("{}", key), "u1:moby-dick:ch7");
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Composite key identifying one cached chapter.
///
/// Both identifier components use [`SmolStr`] — typical user and book ids
/// are short enough to be stored inline without heap allocation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChapterKey {
    user: SmolStr,
    book: SmolStr,
    chapter: u32,
}

impl ChapterKey {
    /// Creates a key for the given user, book, and chapter number.
    pub fn new(user: impl Into<SmolStr>, book: impl Into<SmolStr>, chapter: u32) -> Self {
        ChapterKey {
            user: user.into(),
            book: book.into(),
            chapter,
        }
    }

    /// Returns the owning user's identifier.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the book identifier.
    pub fn book(&self) -> &str {
        &self.book
    }

    /// Returns the chapter number.
    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    /// Returns the `(user, book)` collection this key belongs to.
    pub fn book_key(&self) -> BookKey {
        BookKey {
            user: self.user.clone(),
            book: self.book.clone(),
        }
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:ch{}", self.user, self.book, self.chapter)
    }
}

/// A `(user, book)` collection prefix.
///
/// The per-book record ceiling and the `clear_book` operation are scoped to
/// one `BookKey`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookKey {
    user: SmolStr,
    book: SmolStr,
}

impl BookKey {
    /// Creates a collection prefix for the given user and book.
    pub fn new(user: impl Into<SmolStr>, book: impl Into<SmolStr>) -> Self {
        BookKey {
            user: user.into(),
            book: book.into(),
        }
    }

    /// Returns the owning user's identifier.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the book identifier.
    pub fn book(&self) -> &str {
        &self.book
    }

    /// Returns the chapter key for `chapter` within this collection.
    pub fn chapter(&self, chapter: u32) -> ChapterKey {
        ChapterKey {
            user: self.user.clone(),
            book: self.book.clone(),
            chapter,
        }
    }
}

impl fmt::Display for BookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user, self.book)
    }
}

/// Granularity of a backend scan or bulk clear.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyScope {
    /// Every record in the store.
    All,
    /// Every record owned by one user, across all books.
    User(SmolStr),
    /// Every record of one `(user, book)` collection.
    Book(BookKey),
}

impl KeyScope {
    /// Scope covering all records of `user`.
    pub fn user(user: impl Into<SmolStr>) -> Self {
        KeyScope::User(user.into())
    }

    /// Scope covering one `(user, book)` collection.
    pub fn book(user: impl Into<SmolStr>, book: impl Into<SmolStr>) -> Self {
        KeyScope::Book(BookKey::new(user, book))
    }

    /// Returns true if `key` falls inside this scope.
    ///
    /// This is the single membership predicate used by every scoped
    /// operation, so scans and clears cannot disagree on ownership.
    pub fn matches(&self, key: &ChapterKey) -> bool {
        match self {
            KeyScope::All => true,
            KeyScope::User(user) => key.user() == user,
            KeyScope::Book(book) => key.user() == book.user() && key.book() == book.book(),
        }
    }
}

impl From<BookKey> for KeyScope {
    fn from(book: BookKey) -> Self {
        KeyScope::Book(book)
    }
}
