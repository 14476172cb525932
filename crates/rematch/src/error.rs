//! Error types for pattern operations.
//!
//! Every fallible [`Pattern`](crate::Pattern) operation separates "cannot
//! run" conditions, carried by [`PatternError`], from the normal "ran and
//! found nothing" outcome, which is reported as a -1 position, a 0 length,
//! or an absent substring and is never an error.

use thiserror::Error;

/// Error conditions raised by pattern operations.
#[derive(Error, Debug)]
pub enum PatternError {
    /// The engine rejected the pattern text at construction. Surfaces on
    /// the first use of the instance, not at construction time.
    #[error("invalid pattern: {pattern:?}")]
    InvalidPattern {
        /// The rejected pattern text, retained for diagnostics.
        pattern: String,
    },

    /// The instance was disposed; apart from repeated disposal it stays
    /// inert.
    #[error("pattern has been disposed")]
    Disposed,

    /// A capture accessor ran before any search installed a region.
    #[error("no search has been run")]
    NoSearch,
}

/// Result type alias for pattern operations.
pub type Result<T> = std::result::Result<T, PatternError>;
