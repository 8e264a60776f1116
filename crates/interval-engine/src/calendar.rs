//! Local-calendar arithmetic over the IANA zone database.
//!
//! [`LocalCalendar`] is the boundary between the interval resolver and the
//! date library: "start of unit", "end of unit" and "shift in local units" for
//! an instant already attached to its zone. [`ZonedCalendar`] implements it
//! with `chrono` and `chrono-tz`.
//!
//! Day and larger units are computed on the wall-clock date and mapped back to
//! an instant with the codec's DST policy, so a day can be 23 or 25 hours
//! long. Minutes and hours are truncated on the instant's own offset, so the
//! repeated hour of a "fall back" night is still two distinct hours. An offset
//! change inside a minute or hour (Lord Howe moves by 30 minutes) also opens a
//! new unit, so units never overlap.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::codec::{local_to_instant, Instant};
use crate::error::{IntervalError, Result};
use crate::format::TICK_SECONDS;
use crate::week::WeekConvention;

/// A period of the local calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// A move of the reference instant before truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarShift {
    None,
    /// Elapsed hours; crossing a transition lands on the neighbouring clock hour.
    Hours(i64),
    /// Calendar days at the same wall-clock time. A backward shift onto a
    /// date the zone skipped lands on the last moment before the skip.
    Days(i64),
}

/// Start/end of unit and local-unit shifts for zoned instants.
pub trait LocalCalendar: Send + Sync {
    /// Earliest instant of the `unit` containing `local`.
    fn start_of(&self, unit: CalendarUnit, local: &Instant) -> Result<Instant>;

    /// Latest instant (one tick before the next unit) of the `unit` containing `local`.
    fn end_of(&self, unit: CalendarUnit, local: &Instant) -> Result<Instant>;

    /// Move `local` by `shift`, keeping its zone.
    fn shift(&self, local: &Instant, shift: CalendarShift) -> Result<Instant>;

    /// The week convention used for [`CalendarUnit::Week`].
    fn week_convention(&self) -> WeekConvention;
}

/// [`LocalCalendar`] backed by chrono-tz.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZonedCalendar {
    week: WeekConvention,
}

impl ZonedCalendar {
    pub fn new(week: WeekConvention) -> Self {
        Self { week }
    }

    /// First local date of the unit containing `date`.
    fn first_date(&self, unit: CalendarUnit, date: NaiveDate) -> Option<NaiveDate> {
        match unit {
            CalendarUnit::Minute | CalendarUnit::Hour | CalendarUnit::Day => Some(date),
            CalendarUnit::Week => self.week.week_start(date),
            CalendarUnit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
            CalendarUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
    }

    /// First local date of the unit following the one containing `date`.
    fn next_first_date(&self, unit: CalendarUnit, date: NaiveDate) -> Option<NaiveDate> {
        match unit {
            CalendarUnit::Minute | CalendarUnit::Hour => Some(date),
            CalendarUnit::Day => date.succ_opt(),
            CalendarUnit::Week => self
                .week
                .week_start(date)?
                .checked_add_signed(chrono::Duration::days(7)),
            CalendarUnit::Month => {
                let (y, m) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(y, m, 1)
            }
            CalendarUnit::Year => NaiveDate::from_ymd_opt(date.year() + 1, 1, 1),
        }
    }

    fn midnight(local: &Instant, date: Option<NaiveDate>) -> Result<Instant> {
        let naive = date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| out_of_range(local))?;
        local_to_instant(&local.timezone(), naive)
    }
}

impl LocalCalendar for ZonedCalendar {
    fn start_of(&self, unit: CalendarUnit, local: &Instant) -> Result<Instant> {
        match unit {
            CalendarUnit::Minute | CalendarUnit::Hour => clock_unit_start(unit, local),
            _ => Self::midnight(local, self.first_date(unit, local.date_naive())),
        }
    }

    fn end_of(&self, unit: CalendarUnit, local: &Instant) -> Result<Instant> {
        let next_start = match unit {
            CalendarUnit::Minute | CalendarUnit::Hour => {
                let start = clock_unit_start(unit, local)?;
                Some(next_clock_unit_start(unit, &start)?)
            }
            _ => Some(Self::midnight(
                local,
                self.next_first_date(unit, local.date_naive()),
            )?),
        };

        next_start
            .and_then(|next| next.checked_sub_signed(chrono::Duration::seconds(TICK_SECONDS)))
            .ok_or_else(|| out_of_range(local))
    }

    fn shift(&self, local: &Instant, shift: CalendarShift) -> Result<Instant> {
        match shift {
            CalendarShift::None => Ok(*local),
            CalendarShift::Hours(n) => local
                .checked_add_signed(chrono::Duration::hours(n))
                .ok_or_else(|| out_of_range(local)),
            CalendarShift::Days(n) => {
                let target = local
                    .naive_local()
                    .checked_add_signed(chrono::Duration::days(n))
                    .ok_or_else(|| out_of_range(local))?;
                let landed = local_to_instant(&local.timezone(), target)?;
                if n < 0 && landed.date_naive() > target.date() {
                    // The gap swallowed the rest of the target date.
                    return landed
                        .checked_sub_signed(chrono::Duration::seconds(TICK_SECONDS))
                        .ok_or_else(|| out_of_range(local));
                }
                Ok(landed)
            }
        }
    }

    fn week_convention(&self) -> WeekConvention {
        self.week
    }
}

/// Start of the minute or hour containing `local`.
///
/// Elapsed wall-clock time is subtracted on `local`'s own offset. If the zone
/// changed offset in between, the unit starts at that change instead.
fn clock_unit_start(unit: CalendarUnit, local: &Instant) -> Result<Instant> {
    let candidate = local
        .checked_sub_signed(elapsed_in_unit(unit, local))
        .ok_or_else(|| out_of_range(local))?;
    let tz = local.timezone();
    let (lo, hi) = (candidate.timestamp(), local.timestamp());
    if offset_at(&tz, lo)? == offset_at(&tz, hi)? {
        return Ok(candidate);
    }
    first_offset_change(&tz, lo, hi)
}

/// Start of the minute or hour following the one that begins at `start`.
fn next_clock_unit_start(unit: CalendarUnit, start: &Instant) -> Result<Instant> {
    let length = match unit {
        CalendarUnit::Hour => chrono::Duration::hours(1),
        _ => chrono::Duration::minutes(1),
    };
    // `start` sits past the wall-clock boundary after a gap (02:30 for hour 02).
    let candidate = start
        .checked_add_signed(length - elapsed_in_unit(unit, start))
        .ok_or_else(|| out_of_range(start))?;
    let tz = start.timezone();
    let (lo, last) = (start.timestamp(), candidate.timestamp() - TICK_SECONDS);
    if offset_at(&tz, lo)? == offset_at(&tz, last)? {
        return Ok(candidate);
    }
    first_offset_change(&tz, lo, last)
}

/// First whole UTC second in `(lo, hi]` whose offset differs from the offset
/// at `lo`. At most one change is expected inside a minute or hour.
fn first_offset_change(tz: &Tz, mut lo: i64, mut hi: i64) -> Result<Instant> {
    let before = offset_at(tz, lo)?;
    // Invariant: offset(lo) == before != offset(hi)
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if offset_at(tz, mid)? == before {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    DateTime::from_timestamp(hi, 0)
        .map(|utc| utc.with_timezone(tz))
        .ok_or_else(|| IntervalError::OutOfRange(format!("epoch seconds {hi}")))
}

fn offset_at(tz: &Tz, seconds: i64) -> Result<FixedOffset> {
    DateTime::from_timestamp(seconds, 0)
        .map(|utc| tz.offset_from_utc_datetime(&utc.naive_utc()).fix())
        .ok_or_else(|| IntervalError::OutOfRange(format!("epoch seconds {seconds}")))
}

/// Time already elapsed since the start of the current minute or hour.
fn elapsed_in_unit(unit: CalendarUnit, local: &Instant) -> chrono::Duration {
    let seconds = match unit {
        CalendarUnit::Hour => i64::from(local.minute()) * 60 + i64::from(local.second()),
        _ => i64::from(local.second()),
    };
    chrono::Duration::seconds(seconds)
        + chrono::Duration::nanoseconds(i64::from(local.nanosecond()))
}

fn out_of_range(local: &Instant) -> IntervalError {
    IntervalError::OutOfRange(format!(
        "calendar arithmetic on {} in {}",
        local.naive_local(),
        local.timezone()
    ))
}
