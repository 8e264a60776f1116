//! The canonical timestamp layout shared by the codec and the resolver.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDateTime};

use crate::error::{IntervalError, Result};

/// `YYYY-MM-DD HH:mm:ss`, 24-hour clock, no zone suffix.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Length in bytes of a canonical string.
pub const CANONICAL_LEN: usize = 19;

/// Smallest step between two distinct canonical strings, in seconds.
///
/// Period ends are "start of the next period minus one tick".
pub const TICK_SECONDS: i64 = 1;

/// Years that fit the four-digit, unsigned year field.
pub const CANONICAL_YEARS: RangeInclusive<i32> = 0..=9999;

/// Render a wall-clock reading in the canonical layout.
///
/// Fails with [`IntervalError::OutOfRange`] for years outside
/// [`CANONICAL_YEARS`], which chrono would print with a sign or extra digits.
pub(crate) fn format_canonical(naive: &NaiveDateTime) -> Result<String> {
    if !CANONICAL_YEARS.contains(&naive.year()) {
        return Err(IntervalError::OutOfRange(format!(
            "year {} does not fit YYYY-MM-DD HH:mm:ss",
            naive.year()
        )));
    }
    Ok(naive.format(CANONICAL_FORMAT).to_string())
}

/// Check that `s` has exactly the canonical shape: `dddd-dd-dd dd:dd:dd`.
///
/// Field ranges are left to chrono; this only rejects strings chrono would
/// leniently accept (single-digit fields, signs, surrounding whitespace).
pub(crate) fn has_canonical_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != CANONICAL_LEN {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b' ',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn test_format_canonical_at_year_edges() {
        assert_eq!(
            format_canonical(&reading(9999, 12, 31, 23, 59, 59)).unwrap(),
            "9999-12-31 23:59:59"
        );
        assert_eq!(
            format_canonical(&reading(0, 1, 1, 0, 0, 0)).unwrap(),
            "0000-01-01 00:00:00"
        );
    }

    #[test]
    fn test_format_canonical_rejects_five_digit_and_negative_years() {
        for naive in [reading(10000, 1, 1, 0, 0, 0), reading(-1, 12, 31, 23, 59, 59)] {
            let err = format_canonical(&naive).unwrap_err();
            assert!(matches!(err, IntervalError::OutOfRange(_)), "got: {err}");
        }
    }

    #[test]
    fn test_shape_accepts_canonical() {
        assert!(has_canonical_shape("2024-03-10 08:00:00"));
    }

    #[test]
    fn test_shape_rejects_variants() {
        assert!(!has_canonical_shape("2024-3-10 08:00:00"));
        assert!(!has_canonical_shape("2024-03-10T08:00:00"));
        assert!(!has_canonical_shape(" 2024-03-10 08:00:00"));
        assert!(!has_canonical_shape("2024-03-10 08:00:00Z"));
        assert!(!has_canonical_shape("not-a-date"));
        assert!(!has_canonical_shape("+024-03-10 08:00:00"));
    }
}
