//! The [`Pattern`] facade: compiled-pattern ownership, the single match
//! region, and character-unit translation at the engine boundary.
//!
//! # Design
//!
//! A `Pattern` owns up to two engine resources: the compiled pattern
//! handle, held for the whole life of the instance, and at most one match
//! region, the result of the latest search, replaced on each write. Both
//! are released exactly once, by [`Pattern::dispose`] or by the drop
//! fallback, whichever runs first.
//!
//! One mutex guards the region slot and doubles as the per-instance lock.
//! Every engine call runs under it, so a racing `dispose` can never free
//! a handle out from under an operation already past its guard checks.
//! [`Pattern::search_captures`] holds the lock across its whole
//! search-drain-release protocol and is the entry point meant for shared
//! instances; the stateful search-then-accessors protocol stays coherent
//! only when one thread at a time drives it.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rematch_engine::{Engine, PatternHandle, RegionHandle};

use crate::error::{PatternError, Result};
use crate::units;

/// Matching flags captured at construction.
///
/// Matching is case-insensitive unless turned off; `multiline`, which
/// lets `.` match line terminators, is off by default.
///
/// # Examples
///
/// ```
/// use rematch::{Pattern, PatternOptions};
///
/// let options = PatternOptions::new().ignore_case(false).multiline(true);
/// let pattern = Pattern::with_options("a.c", options);
/// assert!(!pattern.ignore_case());
/// assert!(pattern.multiline());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PatternOptions {
    pub(crate) ignore_case: bool,
    pub(crate) multiline: bool,
}

impl Default for PatternOptions {
    fn default() -> PatternOptions {
        PatternOptions {
            ignore_case: true,
            multiline: false,
        }
    }
}

impl PatternOptions {
    /// Options with the defaults: case-insensitive, `.` stops at line
    /// terminators.
    pub fn new() -> PatternOptions {
        PatternOptions::default()
    }

    /// Set case-insensitive matching.
    pub fn ignore_case(mut self, ignore_case: bool) -> PatternOptions {
        self.ignore_case = ignore_case;
        self
    }

    /// Let `.` match line terminators.
    pub fn multiline(mut self, multiline: bool) -> PatternOptions {
        self.multiline = multiline;
        self
    }
}

/// Position and length of one capture group, in characters.
///
/// `position` is -1 and `length` is 0 when the group did not participate
/// in the match. In a drained sequence, index 0 is always the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureResult {
    /// Character offset of the group's match, -1 if it did not participate
    pub position: i32,
    /// Character length of the group's match
    pub length: i32,
}

#[derive(Debug)]
enum Compilation {
    Handle(PatternHandle),
    Failed { pattern: String },
}

// "No region" vs "region present" is an explicit state, not a nullable
// handle. Present keeps the searched buffer alive; accessors slice it by
// character range.
#[derive(Debug)]
enum RegionSlot {
    Absent,
    Present { handle: RegionHandle, text: Arc<str> },
}

/// A compiled pattern plus the result of its most recent search.
///
/// Construction never fails: a pattern the engine rejects produces an
/// *invalid* instance whose operations report
/// [`PatternError::InvalidPattern`] with the rejected text. A valid
/// instance is searched repeatedly; each search replaces the previous
/// match region, and the accessors read group positions, lengths, and
/// substrings out of the current one. [`Pattern::dispose`] releases the
/// engine resources exactly once, with drop as the fallback.
///
/// All offsets and lengths in the public API are character counts; the
/// doubling the engine expects stays internal.
///
/// # Examples
///
/// ```
/// use rematch::Pattern;
///
/// let pattern = Pattern::new("(st)rong");
/// pattern.search("a strong word", 0)?;
/// assert_eq!(pattern.match_position(0)?, 2);
/// assert_eq!(pattern.captured(1)?.as_deref(), Some("st"));
/// # Ok::<(), rematch::PatternError>(())
/// ```
#[derive(Debug)]
pub struct Pattern {
    engine: Arc<Engine>,
    compiled: Compilation,
    options: PatternOptions,
    region: Mutex<RegionSlot>,
    disposed: AtomicBool,
}

impl Pattern {
    /// Compile `pattern` against the shared engine with default options.
    pub fn new(pattern: &str) -> Pattern {
        Pattern::with_engine(Engine::global(), pattern, PatternOptions::default())
    }

    /// Compile `pattern` against the shared engine with explicit options.
    pub fn with_options(pattern: &str, options: PatternOptions) -> Pattern {
        Pattern::with_engine(Engine::global(), pattern, options)
    }

    /// Compile against a caller-supplied engine.
    ///
    /// Useful when resource accounting must stay isolated, e.g. a private
    /// [`Engine`] whose counters a test inspects afterwards.
    pub fn with_engine(engine: Arc<Engine>, pattern: &str, options: PatternOptions) -> Pattern {
        let length_units = units::to_units(units::char_len(pattern));
        let compiled =
            match engine.compile(pattern, length_units, options.ignore_case, options.multiline) {
                Some(handle) => Compilation::Handle(handle),
                None => Compilation::Failed {
                    pattern: pattern.to_string(),
                },
            };
        Pattern {
            engine,
            compiled,
            options,
            region: Mutex::new(RegionSlot::Absent),
            disposed: AtomicBool::new(false),
        }
    }

    /// Whether the engine accepted the pattern at construction.
    pub fn is_valid(&self) -> bool {
        matches!(self.compiled, Compilation::Handle(_))
    }

    /// Whether [`Pattern::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Whether a search has installed a region since construction or the
    /// last release.
    pub fn has_region(&self) -> bool {
        matches!(*self.region.lock().unwrap(), RegionSlot::Present { .. })
    }

    /// The case-insensitivity flag this pattern was compiled with.
    pub fn ignore_case(&self) -> bool {
        self.options.ignore_case
    }

    /// The multiline flag this pattern was compiled with.
    pub fn multiline(&self) -> bool {
        self.options.multiline
    }

    /// Character position of the first match at or after `offset`, or -1.
    ///
    /// A lightweight probe: no region is created or disturbed, so calls
    /// can be interleaved with the stateful protocol freely.
    pub fn find_index(&self, text: &str, offset: usize) -> Result<i32> {
        let _slot = self.region.lock().unwrap();
        let handle = self.usable_handle()?;
        let found = self.engine.find_first_index(
            handle,
            text,
            units::to_units(offset),
            units::to_units(units::char_len(text)),
        );
        Ok(units::from_units(found))
    }

    /// Search `text` from `offset` and install the result as the current
    /// region, replacing any prior one.
    ///
    /// A search that matches nothing still installs a region, so the
    /// accessors afterwards answer "no match" rather than
    /// [`PatternError::NoSearch`]. The searched text is retained until the
    /// region is replaced or released; [`Pattern::captured`] slices it.
    pub fn search(&self, text: &str, offset: usize) -> Result<()> {
        let mut slot = self.region.lock().unwrap();
        let handle = self.usable_handle()?;
        let region = self.engine.search(
            handle,
            text,
            units::to_units(offset),
            units::to_units(units::char_len(text)),
        );
        self.install_region(&mut slot, region, Arc::from(text));
        Ok(())
    }

    /// Character position of group `nth` in the current region: -1 when
    /// the group did not participate or lies beyond the pattern's groups.
    pub fn match_position(&self, nth: usize) -> Result<i32> {
        let slot = self.region.lock().unwrap();
        self.usable_handle()?;
        let handle = region_handle(&slot)?;
        Ok(units::from_units(
            self.engine.group_position(handle, group_index(nth)),
        ))
    }

    /// Character length of group `nth` in the current region: -1 when the
    /// group did not participate or lies beyond the pattern's groups.
    pub fn match_length(&self, nth: usize) -> Result<i32> {
        let slot = self.region.lock().unwrap();
        self.usable_handle()?;
        let handle = region_handle(&slot)?;
        let nth = group_index(nth);
        if self.engine.group_position(handle, nth) < 0 {
            return Ok(-1);
        }
        Ok(units::from_units(self.engine.group_length(handle, nth)))
    }

    /// Substring captured by group `nth` in the current region.
    ///
    /// `None` when the group did not participate or lies beyond the
    /// pattern's groups; otherwise the `[position, position + length)`
    /// character slice of the retained search text.
    pub fn captured(&self, nth: usize) -> Result<Option<String>> {
        let slot = self.region.lock().unwrap();
        self.usable_handle()?;
        let (handle, text) = match &*slot {
            RegionSlot::Present { handle, text } => (*handle, Arc::clone(text)),
            RegionSlot::Absent => return Err(PatternError::NoSearch),
        };
        let nth = group_index(nth);
        let position = units::from_units(self.engine.group_position(handle, nth));
        let length = units::from_units(self.engine.group_length(handle, nth));
        drop(slot);

        if position < 0 || length < 0 {
            return Ok(None);
        }
        Ok(Some(units::char_substring(
            &text,
            position as usize,
            length as usize,
        )))
    }

    /// Search and drain every capture group under the instance lock.
    ///
    /// The whole protocol (search, drain groups 0 through the last,
    /// release the region, drop the retained text) runs while the lock is
    /// held, so concurrent callers sharing an instance each observe a
    /// region-absent pattern before and after their call. A non-match
    /// yields an empty sequence; a match yields one entry per group, with
    /// `(-1, 0)` for groups that did not participate.
    ///
    /// This is the one operation that is safe to call from several threads
    /// on the same instance without external synchronization.
    ///
    /// # Examples
    ///
    /// ```
    /// use rematch::Pattern;
    ///
    /// let pattern = Pattern::new("((A)|(B))(.*)");
    /// let groups = pattern.search_captures("---A---", 0)?;
    /// assert_eq!(groups.len(), 5);
    /// assert_eq!((groups[3].position, groups[3].length), (-1, 0));
    /// assert_eq!((groups[4].position, groups[4].length), (4, 3));
    /// # Ok::<(), rematch::PatternError>(())
    /// ```
    pub fn search_captures(&self, text: &str, offset: usize) -> Result<Vec<CaptureResult>> {
        let mut slot = self.region.lock().unwrap();
        let handle = self.usable_handle()?;
        let region = self.engine.search(
            handle,
            text,
            units::to_units(offset),
            units::to_units(units::char_len(text)),
        );
        self.install_region(&mut slot, region, Arc::from(text));

        let count = self.engine.group_count(region);
        let mut drained = Vec::with_capacity(count as usize);
        for nth in 0..count {
            let position = self.engine.group_position(region, nth);
            if nth == 0 && position < 0 {
                break;
            }
            drained.push(CaptureResult {
                position: units::from_units(position),
                length: units::from_units(self.engine.group_length(region, nth)),
            });
        }

        self.clear_region(&mut slot);
        Ok(drained)
    }

    /// Release the current region, if any, and drop the retained text.
    ///
    /// Accessors afterwards report [`PatternError::NoSearch`] until a new
    /// search runs. Releasing with no region present is a no-op.
    pub fn release_region(&self) -> Result<()> {
        let mut slot = self.region.lock().unwrap();
        self.usable_handle()?;
        self.clear_region(&mut slot);
        Ok(())
    }

    /// Release the engine resources exactly once.
    ///
    /// Idempotent: later calls, including the drop fallback, do nothing.
    /// The region is released before the compiled pattern. Never fails and
    /// never panics, even if a poisoned lock is left behind by a panicked
    /// holder; afterwards every other operation reports
    /// [`PatternError::Disposed`].
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut slot = match self.region.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.clear_region(&mut slot);
        if let Compilation::Handle(handle) = &self.compiled {
            self.engine.release_pattern(*handle);
        }
    }

    // Disposed wins over invalid, so a disposed instance never reports
    // its construction-time failure.
    fn usable_handle(&self) -> Result<PatternHandle> {
        if self.is_disposed() {
            return Err(PatternError::Disposed);
        }
        match &self.compiled {
            Compilation::Handle(handle) => Ok(*handle),
            Compilation::Failed { pattern } => Err(PatternError::InvalidPattern {
                pattern: pattern.clone(),
            }),
        }
    }

    fn install_region(&self, slot: &mut RegionSlot, handle: RegionHandle, text: Arc<str>) {
        let previous = mem::replace(slot, RegionSlot::Present { handle, text });
        if let RegionSlot::Present { handle, .. } = previous {
            self.engine.release_region(handle);
        }
    }

    fn clear_region(&self, slot: &mut RegionSlot) {
        if let RegionSlot::Present { handle, .. } = mem::replace(slot, RegionSlot::Absent) {
            self.engine.release_region(handle);
        }
    }
}

impl Drop for Pattern {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn region_handle(slot: &RegionSlot) -> Result<RegionHandle> {
    match slot {
        RegionSlot::Present { handle, .. } => Ok(*handle),
        RegionSlot::Absent => Err(PatternError::NoSearch),
    }
}

// Indexes past i32 territory are far beyond any group count; clamp them
// into the engine's out-of-range sentinel path.
fn group_index(nth: usize) -> i32 {
    i32::try_from(nth).unwrap_or(i32::MAX)
}
