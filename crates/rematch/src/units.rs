//! Character-unit translation at the engine boundary.
//!
//! The engine addresses text in a fixed-width two-byte encoding: one
//! character is two units. Every offset or length crossing the boundary
//! converts here and nowhere else, so the encoding assumption stays
//! auditable in one place. Negative values are sentinel results (-1 for
//! "no match") and pass through unchanged.

/// Characters to doubled engine units.
pub(crate) fn to_units(chars: usize) -> i32 {
    i32::try_from(chars).map_or(i32::MAX, |chars| chars.saturating_mul(2))
}

/// Doubled engine units back to characters; negative sentinels unchanged.
pub(crate) fn from_units(units: i32) -> i32 {
    if units < 0 { units } else { units / 2 }
}

/// Character count of `text`, the facade's public length unit.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The `[start, start + len)` character slice of `text`.
pub(crate) fn char_substring(text: &str, start: usize, len: usize) -> String {
    text.chars().skip(start).take(len).collect()
}
