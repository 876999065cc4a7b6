//! Error types for store mutation and path pattern compilation.
//!
//! Lookups never error: a query on an unknown sentence, paragraph, or term
//! returns an empty collection, an ambiguous root query returns `None`,
//! and an unconnected path query returns `None`. The enums here cover the
//! cases that are genuinely malformed input.

use thiserror::Error;

/// Errors raised when inserting annotations into the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A span referenced a word form handle that does not resolve.
    #[error("unknown word form handle {0}")]
    UnknownWordForm(u32),

    /// An edge or span referenced a term handle that does not resolve.
    #[error("unknown term handle {0}")]
    UnknownTerm(u32),

    /// A term or entity was constructed over an empty span.
    #[error("annotation span must not be empty")]
    EmptySpan,
}

/// Errors raised by the path pattern engine.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern text did not compile into a matcher.
    ///
    /// Raised at compile time, never at match time; the failed pattern is
    /// not cached, so retrying the same text fails identically.
    #[error("invalid path pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// More distinct relation labels than the one-letter symbol space
    /// holds. This is a process-level configuration fault, not a per-call
    /// condition: encoding must abort rather than collide two labels.
    #[error("label alphabet exhausted while assigning a symbol for {label:?}")]
    AlphabetOverflow { label: String },

    /// An edge handle in the path no longer resolves in the store,
    /// meaning the path was computed before a removal.
    #[error("path references a removed dependency edge")]
    StaleEdge,
}

/// Result alias for store mutation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result alias for pattern engine operations.
pub type PatternResult<T> = Result<T, PatternError>;
