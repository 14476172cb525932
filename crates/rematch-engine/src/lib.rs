//! Byte-oriented matching engine behind the `rematch` facade.
//!
//! This crate plays the role a native matching library plays: callers
//! compile a pattern into an opaque [`PatternHandle`], run searches that
//! produce opaque [`RegionHandle`]s, read capture-group spans out of a
//! region, and release both kinds of handle exactly once. All offsets and
//! lengths cross this boundary in *doubled units*: the engine assumes a
//! fixed-width two-byte text encoding, so one character is two units. The
//! engine never divides results back down; that translation belongs to the
//! caller.
//!
//! # Design
//!
//! Compiled patterns and live regions sit in internally synchronized
//! registry tables keyed by monotonically increasing ids, so handles are
//! plain `Copy` tokens with no lifetime attached. Matching is delegated to
//! the [`regex`] crate. A region stores one span per capture group (group 0
//! first), with `(-1, -1)` marking a group that did not participate in the
//! match; a search that matches nothing still produces a fully populated
//! region of absent spans.
//!
//! Releasing a handle twice, or using it after release, is a caller bug
//! and panics rather than silently touching another caller's state.
//!
//! # Examples
//!
//! ```
//! use rematch_engine::Engine;
//!
//! let engine = Engine::new();
//! let pattern = engine.compile("b.d", 6, false, false).unwrap();
//!
//! let region = engine.search(pattern, "abcde", 0, 10);
//! assert_eq!(engine.group_position(region, 0), 2);
//! assert_eq!(engine.group_length(region, 0), 6);
//!
//! engine.release_region(region);
//! engine.release_pattern(pattern);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use regex::{Regex, RegexBuilder};

/// Opaque token for a compiled pattern held by an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternHandle(u64);

/// Opaque token for the capture table produced by one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionHandle(u64);

/// Resource counters for an [`Engine`].
///
/// Uses atomic counters for thread-safe access across all threads.
#[derive(Debug, Default)]
pub struct EngineStats {
    /// Patterns compiled successfully
    pub patterns_compiled: AtomicU64,
    /// Pattern compilations rejected by the matcher
    pub patterns_failed: AtomicU64,
    /// Patterns released
    pub patterns_released: AtomicU64,
    /// Regions produced by searches
    pub regions_created: AtomicU64,
    /// Regions released
    pub regions_released: AtomicU64,
}

/// Snapshot of engine counters at a point in time
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStatsSnapshot {
    /// Patterns compiled successfully
    pub patterns_compiled: u64,
    /// Pattern compilations rejected by the matcher
    pub patterns_failed: u64,
    /// Patterns released
    pub patterns_released: u64,
    /// Regions produced by searches
    pub regions_created: u64,
    /// Regions released
    pub regions_released: u64,
}

impl EngineStats {
    /// Take a snapshot of current counters
    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            patterns_compiled: self.patterns_compiled.load(Ordering::Relaxed),
            patterns_failed: self.patterns_failed.load(Ordering::Relaxed),
            patterns_released: self.patterns_released.load(Ordering::Relaxed),
            regions_created: self.regions_created.load(Ordering::Relaxed),
            regions_released: self.regions_released.load(Ordering::Relaxed),
        }
    }
}

impl EngineStatsSnapshot {
    /// Compiled patterns callers still hold
    pub fn live_patterns(&self) -> u64 {
        self.patterns_compiled.saturating_sub(self.patterns_released)
    }

    /// Regions callers still hold
    pub fn live_regions(&self) -> u64 {
        self.regions_created.saturating_sub(self.regions_released)
    }
}

#[derive(Debug, Clone, Copy)]
struct GroupSpan {
    begin: i32,
    end: i32,
}

impl GroupSpan {
    const ABSENT: GroupSpan = GroupSpan { begin: -1, end: -1 };
}

// One span slot per capture group, group 0 first. Absent spans keep the
// (-1, -1) sentinel, so length comes out 0 and position -1.
#[derive(Debug)]
struct MatchRegion {
    spans: Vec<GroupSpan>,
}

impl MatchRegion {
    fn count(&self) -> i32 {
        self.spans.len() as i32
    }

    fn span(&self, nth: i32) -> Option<GroupSpan> {
        usize::try_from(nth).ok().and_then(|i| self.spans.get(i).copied())
    }

    fn position(&self, nth: i32) -> i32 {
        self.span(nth).map_or(-1, |span| span.begin)
    }

    fn length(&self, nth: i32) -> i32 {
        self.span(nth).map_or(-1, |span| span.end - span.begin)
    }
}

/// Pattern-matching engine addressed through opaque handles.
///
/// The engine is internally synchronized: handles may be used from any
/// thread, and one engine is normally shared process-wide through
/// [`Engine::global`]. Private instances from [`Engine::new`] keep their
/// own resource accounting, which tests use to verify that every compiled
/// pattern and region is released exactly once.
#[derive(Debug, Default)]
pub struct Engine {
    patterns: Mutex<HashMap<u64, Arc<Regex>>>,
    regions: Mutex<HashMap<u64, MatchRegion>>,
    next_id: AtomicU64,
    stats: EngineStats,
}

impl Engine {
    /// Create a private engine instance.
    pub fn new() -> Engine {
        Engine::default()
    }

    /// The process-wide shared engine.
    pub fn global() -> Arc<Engine> {
        static GLOBAL: OnceLock<Arc<Engine>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Engine::new())))
    }

    /// Compile the first `length_units / 2` characters of `pattern`.
    ///
    /// `ignore_case` selects case-insensitive matching; `multiline` lets
    /// `.` match line terminators, the meaning byte-oriented engines
    /// attach to their multiline option. Returns `None` when the matcher
    /// rejects the pattern or `length_units` is negative.
    pub fn compile(
        &self,
        pattern: &str,
        length_units: i32,
        ignore_case: bool,
        multiline: bool,
    ) -> Option<PatternHandle> {
        let compiled = usize::try_from(length_units).ok().and_then(|units| {
            let source: String = pattern.chars().take(units / 2).collect();
            RegexBuilder::new(&source)
                .case_insensitive(ignore_case)
                .dot_matches_new_line(multiline)
                .build()
                .ok()
        });
        match compiled {
            Some(regex) => {
                let id = self.allocate_id();
                self.patterns.lock().unwrap().insert(id, Arc::new(regex));
                self.stats.patterns_compiled.fetch_add(1, Ordering::Relaxed);
                Some(PatternHandle(id))
            }
            None => {
                self.stats.patterns_failed.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Doubled-unit position of the first match at or after `offset_units`,
    /// or -1.
    ///
    /// `length_units` is the end of the search window, so a window shorter
    /// than the text truncates it; a window that misses the text entirely
    /// reports -1. No region is created.
    ///
    /// # Panics
    /// Panics if `handle` was already released.
    pub fn find_first_index(
        &self,
        handle: PatternHandle,
        text: &str,
        offset_units: i32,
        length_units: i32,
    ) -> i32 {
        let regex = self.pattern(handle);
        search_window(text, offset_units, length_units)
            .and_then(|(start, end)| regex.find_at(&text[..end], start))
            .map_or(-1, |found| units_at(text, found.start()))
    }

    /// Run a search and store its capture table as a new region.
    ///
    /// Every search produces a region with one span slot per capture group
    /// in the pattern; when nothing matches (including when the window
    /// misses the text entirely) every slot holds the absent sentinel.
    ///
    /// # Panics
    /// Panics if `handle` was already released.
    pub fn search(
        &self,
        handle: PatternHandle,
        text: &str,
        offset_units: i32,
        length_units: i32,
    ) -> RegionHandle {
        let regex = self.pattern(handle);
        let mut spans = vec![GroupSpan::ABSENT; regex.captures_len()];
        if let Some((start, end)) = search_window(text, offset_units, length_units) {
            if let Some(caps) = regex.captures_at(&text[..end], start) {
                for (group, slot) in spans.iter_mut().enumerate() {
                    if let Some(found) = caps.get(group) {
                        *slot = GroupSpan {
                            begin: units_at(text, found.start()),
                            end: units_at(text, found.end()),
                        };
                    }
                }
            }
        }

        let id = self.allocate_id();
        self.regions.lock().unwrap().insert(id, MatchRegion { spans });
        self.stats.regions_created.fetch_add(1, Ordering::Relaxed);
        RegionHandle(id)
    }

    /// Number of span slots in a region: group 0 plus the nested groups.
    ///
    /// # Panics
    /// Panics if `handle` was already released.
    pub fn group_count(&self, handle: RegionHandle) -> i32 {
        self.with_region(handle, |region| region.count())
    }

    /// Doubled-unit begin of a group's span: -1 when the group did not
    /// participate or `nth` is out of range.
    ///
    /// # Panics
    /// Panics if `handle` was already released.
    pub fn group_position(&self, handle: RegionHandle, nth: i32) -> i32 {
        self.with_region(handle, |region| region.position(nth))
    }

    /// Doubled-unit length of a group's span: 0 when the group did not
    /// participate, -1 when `nth` is out of range.
    ///
    /// # Panics
    /// Panics if `handle` was already released.
    pub fn group_length(&self, handle: RegionHandle, nth: i32) -> i32 {
        self.with_region(handle, |region| region.length(nth))
    }

    /// Release a compiled pattern. Each handle may be released once.
    ///
    /// # Panics
    /// Panics if `handle` was already released or never issued.
    pub fn release_pattern(&self, handle: PatternHandle) {
        let removed = self.patterns.lock().unwrap().remove(&handle.0);
        assert!(removed.is_some(), "pattern handle released twice: {}", handle.0);
        self.stats.patterns_released.fetch_add(1, Ordering::Relaxed);
    }

    /// Release a region. Each handle may be released once.
    ///
    /// # Panics
    /// Panics if `handle` was already released or never issued.
    pub fn release_region(&self, handle: RegionHandle) {
        let removed = self.regions.lock().unwrap().remove(&handle.0);
        assert!(removed.is_some(), "match region released twice: {}", handle.0);
        self.stats.regions_released.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the engine's resource counters.
    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn pattern(&self, handle: PatternHandle) -> Arc<Regex> {
        let regex = self.patterns.lock().unwrap().get(&handle.0).cloned();
        regex.unwrap_or_else(|| panic!("pattern handle used after release: {}", handle.0))
    }

    fn with_region<T>(&self, handle: RegionHandle, read: impl FnOnce(&MatchRegion) -> T) -> T {
        let result = self.regions.lock().unwrap().get(&handle.0).map(read);
        result.unwrap_or_else(|| panic!("match region used after release: {}", handle.0))
    }
}

/// Byte range of the doubled-unit window `[offset_units, length_units)`,
/// or `None` when the window misses the text.
fn search_window(text: &str, offset_units: i32, length_units: i32) -> Option<(usize, usize)> {
    let start_char = usize::try_from(offset_units).ok()? / 2;
    let end_char = usize::try_from(length_units).ok()? / 2;
    let start = byte_of_char(text, start_char)?;
    let end = byte_of_char(text, end_char).unwrap_or(text.len());
    (start <= end).then_some((start, end))
}

/// Byte index of the `chars`-th character; `text.len()` for the
/// one-past-end position, `None` beyond that.
fn byte_of_char(text: &str, chars: usize) -> Option<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .nth(chars)
}

/// Doubled-unit position of a byte boundary.
fn units_at(text: &str, byte: usize) -> i32 {
    text[..byte].chars().count() as i32 * 2
}
