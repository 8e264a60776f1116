//! Conversion between instants and canonical timestamp strings.
//!
//! Every function here is pure: the output depends only on the arguments and
//! the IANA rule set compiled into `chrono-tz`. A canonical string never
//! carries its zone; the zone is always supplied by the caller.
//!
//! # DST policy
//!
//! Local wall-clock times do not always map to exactly one instant:
//!
//! - **Ambiguous** (fall back, e.g. `01:30` on 2024-11-03 in New York): the
//!   earlier of the two instants is used.
//! - **Nonexistent** (spring forward, e.g. `02:30` on 2024-03-10 in New York):
//!   the first valid instant after the gap is used (`03:00` EDT).
//!
//! The same policy applies to period boundaries computed by
//! [`crate::calendar::ZonedCalendar`].

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{IntervalError, Result};
use crate::format::{format_canonical, has_canonical_shape, CANONICAL_FORMAT};

/// An absolute moment with the zone used for local-calendar computations.
///
/// Equality and ordering compare the absolute moment only.
pub type Instant = DateTime<Tz>;

/// Widest distance between a wall-clock reading and UTC across the zone
/// database (UTC-12 .. UTC+14), rounded up.
const MAX_OFFSET_SECONDS: i64 = 15 * 3600;

/// Parse an IANA timezone name into a [`Tz`].
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| IntervalError::UnknownTimeZone(format!("'{name}'")))
}

/// Format an instant's absolute moment as a canonical UTC string.
///
/// The layout only holds for years in [`crate::format::CANONICAL_YEARS`];
/// use [`try_to_utc_string`] where an instant may fall outside them.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use interval_engine::codec::to_utc_string;
///
/// let dt = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
/// assert_eq!(to_utc_string(&dt), "2024-03-10 08:00:00");
/// ```
pub fn to_utc_string<Z: TimeZone>(instant: &DateTime<Z>) -> String {
    instant
        .naive_utc()
        .format(CANONICAL_FORMAT)
        .to_string()
}

/// Like [`to_utc_string`], failing with [`IntervalError::OutOfRange`] when the
/// UTC year has no four-digit form.
pub fn try_to_utc_string<Z: TimeZone>(instant: &DateTime<Z>) -> Result<String> {
    format_canonical(&instant.naive_utc())
}

/// Format an instant's absolute moment as a canonical string in `zone`.
///
/// # Errors
///
/// [`IntervalError::UnknownTimeZone`] for a bad zone name, and
/// [`IntervalError::OutOfRange`] when the local year has no four-digit form.
pub fn to_zoned_string<Z: TimeZone>(instant: &DateTime<Z>, zone: &str) -> Result<String> {
    let tz = parse_timezone(zone)?;
    format_in(instant, tz)
}

/// Format an instant in the zone it is already attached to.
pub fn format_local(instant: &Instant) -> String {
    instant.naive_local().format(CANONICAL_FORMAT).to_string()
}

/// Interpret a canonical string as local time in `zone`.
///
/// # Errors
///
/// Returns [`IntervalError::InvalidFormat`] if `s` is not exactly
/// `YYYY-MM-DD HH:mm:ss` (or names an impossible date such as February 30),
/// or [`IntervalError::UnknownTimeZone`] if `zone` is not an IANA name.
///
/// ```
/// use interval_engine::codec::{parse, to_utc_string};
///
/// let instant = parse("2024-03-10 02:30:00", "America/New_York").unwrap();
/// // 02:30 does not exist that night; the clock jumps to 03:00 EDT.
/// assert_eq!(to_utc_string(&instant), "2024-03-10 07:00:00");
/// ```
pub fn parse(s: &str, zone: &str) -> Result<Instant> {
    let tz = parse_timezone(zone)?;
    parse_in(s, tz)
}

/// Like [`parse`], with an already resolved zone.
pub fn parse_in(s: &str, tz: Tz) -> Result<Instant> {
    if !has_canonical_shape(s) {
        return Err(IntervalError::InvalidFormat(format!(
            "'{s}' does not match YYYY-MM-DD HH:mm:ss"
        )));
    }
    let naive = NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT)
        .map_err(|e| IntervalError::InvalidFormat(format!("'{s}': {e}")))?;
    local_to_instant(&tz, naive)
}

/// Interpret `s` with a caller-supplied chrono layout as local time in `zone`.
///
/// The layout must determine a full date and time. The DST policy is the
/// same as for [`parse`].
pub fn parse_with_format(s: &str, format: &str, zone: &str) -> Result<Instant> {
    let tz = parse_timezone(zone)?;
    let naive = NaiveDateTime::parse_from_str(s, format)
        .map_err(|e| IntervalError::InvalidFormat(format!("'{s}' with layout '{format}': {e}")))?;
    local_to_instant(&tz, naive)
}

/// Attach a different zone to the same absolute moment.
pub fn rezone<Z: TimeZone>(instant: &DateTime<Z>, to: Tz) -> Instant {
    instant.with_timezone(&to)
}

/// Seconds since the Unix epoch, truncating any sub-second part.
pub fn to_epoch_seconds<Z: TimeZone>(instant: &DateTime<Z>) -> i64 {
    instant.timestamp()
}

/// Build an instant from Unix seconds, attached to `zone`.
pub fn from_epoch_seconds(seconds: i64, zone: &str) -> Result<Instant> {
    let tz = parse_timezone(zone)?;
    let utc = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        IntervalError::OutOfRange(format!("epoch seconds {seconds} outside supported range"))
    })?;
    Ok(utc.with_timezone(&tz))
}

/// Re-express a canonical string from one zone in another.
///
/// ```
/// use interval_engine::codec::convert_string;
///
/// let local = convert_string("2024-07-04 16:00:00", "UTC", "America/New_York").unwrap();
/// assert_eq!(local, "2024-07-04 12:00:00");
/// ```
pub fn convert_string(s: &str, from_zone: &str, to_zone: &str) -> Result<String> {
    let to = parse_timezone(to_zone)?;
    let instant = parse(s, from_zone)?;
    format_in(&instant, to)
}

/// Unix seconds to a canonical UTC string.
pub fn epoch_seconds_to_utc_string(seconds: i64) -> Result<String> {
    let instant = from_epoch_seconds(seconds, "UTC")?;
    try_to_utc_string(&instant)
}

/// Canonical UTC string to Unix seconds.
pub fn utc_string_to_epoch_seconds(s: &str) -> Result<i64> {
    parse_in(s, Tz::UTC).map(|instant| to_epoch_seconds(&instant))
}

/// Map a local wall-clock reading in `tz` to an instant using the DST policy
/// described in the module docs.
pub fn local_to_instant(tz: &Tz, naive: NaiveDateTime) -> Result<Instant> {
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => Ok(dt),
        None => first_instant_after_gap(tz, naive),
    }
}

fn format_in<Z: TimeZone>(instant: &DateTime<Z>, tz: Tz) -> Result<String> {
    format_canonical(&instant.with_timezone(&tz).naive_local())
}

/// Find the transition instant that ends the gap `naive` falls in.
///
/// Searches whole UTC seconds for the first instant whose local reading is at
/// or past `naive`.
fn first_instant_after_gap(tz: &Tz, naive: NaiveDateTime) -> Result<Instant> {
    let guess = naive.and_utc().timestamp();
    let mut lo = guess - MAX_OFFSET_SECONDS;
    let mut hi = guess + MAX_OFFSET_SECONDS;

    // Invariant: local(lo) < naive <= local(hi)
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if local_reading(tz, mid)? < naive {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let shifted = Utc
        .timestamp_opt(hi, 0)
        .single()
        .ok_or_else(|| IntervalError::OutOfRange(format!("'{naive}' in {tz}")))?
        .with_timezone(tz);

    debug!(
        timezone = %tz,
        local = %naive,
        shifted_to = %shifted.naive_local(),
        "local time falls in a DST gap, shifted forward"
    );

    Ok(shifted)
}

fn local_reading(tz: &Tz, seconds: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(tz).naive_local())
        .ok_or_else(|| IntervalError::OutOfRange(format!("epoch seconds {seconds}")))
}
