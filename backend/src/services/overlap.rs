//! Half-open interval intersection for wall-clock ranges.

use crate::models::ClockTime;

/// Whether `[a.0, a.1)` and `[b.0, b.1)` share at least one minute.
///
/// Degenerate ranges (`start >= end`) never overlap anything, themselves
/// included. Touching ranges such as `08:00-09:00` and `09:00-10:00` do not
/// overlap.
pub fn intervals_overlap(a: (ClockTime, ClockTime), b: (ClockTime, ClockTime)) -> bool {
    let (a_start, a_end) = a;
    let (b_start, b_end) = b;
    a_start < a_end && b_start < b_end && a_start < b_end && b_start < a_end
}
