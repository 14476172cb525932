//! Rematch - character-addressed facade over a byte-oriented regex engine
//!
//! A compiled [`Pattern`] is built once and searched many times. The
//! engine underneath addresses text in a fixed-width two-byte encoding,
//! so every offset and length crossing that boundary is doubled on the way
//! in and halved on the way out; this crate keeps the arithmetic in one
//! internal module and exposes plain character offsets.
//!
//! # Quick Start
//!
//! ```rust
//! use rematch::Pattern;
//!
//! let pattern = Pattern::new(r"(\w+)@(\w+)");
//!
//! // One-shot batch search, safe to share across threads.
//! let groups = pattern.search_captures("mail bob@example today", 0)?;
//! assert_eq!((groups[1].position, groups[1].length), (5, 3));
//!
//! // Stateful protocol: search, then read the capture groups.
//! pattern.search("mail bob@example today", 0)?;
//! assert_eq!(pattern.captured(2)?.as_deref(), Some("example"));
//! # Ok::<(), rematch::PatternError>(())
//! ```
//!
//! # Lifecycle
//!
//! Construction never fails: a pattern the engine rejects produces an
//! instance that reports [`PatternError::InvalidPattern`] on first use,
//! carrying the rejected text. Every pattern owns at most one match
//! region, replaced on each search and torn down by
//! [`Pattern::dispose`]; disposal is idempotent and also runs on drop, so
//! engine resources are reclaimed on either path.
//!
//! # Known limitation
//!
//! The two-units-per-character rule is exact only for text whose scalar
//! values fit one fixed-width unit each. Supplementary-plane scalars
//! still count as a single character here, so offsets exchanged with
//! systems that split them into surrogate pairs will disagree on such
//! text.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types for pattern operations
pub mod error;
/// The compiled pattern facade
pub mod pattern;
mod units;

/// Engine crate re-export for callers that need direct handle access
pub use rematch_engine as engine;

/// The engine behind every pattern, plus its resource counters
pub use rematch_engine::{Engine, EngineStats, EngineStatsSnapshot};

/// Error and result types for pattern operations
pub use crate::error::{PatternError, Result};

/// The compiled pattern facade and its value types
pub use crate::pattern::{CaptureResult, Pattern, PatternOptions};

// Version information
/// Library version string
pub const REMATCH_VERSION: &str = env!("CARGO_PKG_VERSION");
