//! Named reporting intervals resolved to UTC boundaries.
//!
//! A keyword such as `"daily"` or `"last-week"` names a unit of the local
//! calendar and an optional step back. [`IntervalResolver`] takes a keyword, an
//! IANA zone and an optional reference instant and returns the inclusive
//! first and last instants of that unit, expressed in UTC:
//!
//! 1. The reference (or the clock's "now") is attached to the target zone.
//! 2. The keyword's shift is applied in local units (−1 hour, −1 day, −7 days).
//! 3. Start and end of the unit containing the shifted reference are computed
//!    on the local calendar.
//! 4. Both are rezoned to UTC and formatted as canonical strings.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::calendar::{CalendarShift, CalendarUnit, LocalCalendar, ZonedCalendar};
use crate::clock::{Clock, SystemClock};
use crate::codec::{self, Instant};
use crate::config::ResolverConfig;
use crate::error::{IntervalError, Result};
use crate::report::{ReportOptions, ReportSink, Reporter};
use crate::week::{WeekConvention, WeekNumber};

const COMPONENT: &str = "intervalResolver";

// ── IntervalKeyword ─────────────────────────────────────────────────────────

/// The closed set of interval names accepted by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalKeyword {
    Minutely,
    Hourly,
    LastHour,
    Daily,
    Yesterday,
    Weekly,
    LastWeek,
    Monthly,
    Yearly,
}

impl IntervalKeyword {
    pub const ALL: [IntervalKeyword; 9] = [
        IntervalKeyword::Minutely,
        IntervalKeyword::Hourly,
        IntervalKeyword::LastHour,
        IntervalKeyword::Daily,
        IntervalKeyword::Yesterday,
        IntervalKeyword::Weekly,
        IntervalKeyword::LastWeek,
        IntervalKeyword::Monthly,
        IntervalKeyword::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalKeyword::Minutely => "minutely",
            IntervalKeyword::Hourly => "hourly",
            IntervalKeyword::LastHour => "last-hour",
            IntervalKeyword::Daily => "daily",
            IntervalKeyword::Yesterday => "yesterday",
            IntervalKeyword::Weekly => "weekly",
            IntervalKeyword::LastWeek => "last-week",
            IntervalKeyword::Monthly => "monthly",
            IntervalKeyword::Yearly => "yearly",
        }
    }

    /// The calendar unit the interval spans.
    pub fn unit(&self) -> CalendarUnit {
        match self {
            IntervalKeyword::Minutely => CalendarUnit::Minute,
            IntervalKeyword::Hourly | IntervalKeyword::LastHour => CalendarUnit::Hour,
            IntervalKeyword::Daily | IntervalKeyword::Yesterday => CalendarUnit::Day,
            IntervalKeyword::Weekly | IntervalKeyword::LastWeek => CalendarUnit::Week,
            IntervalKeyword::Monthly => CalendarUnit::Month,
            IntervalKeyword::Yearly => CalendarUnit::Year,
        }
    }

    /// How the reference moves before the unit is located.
    pub fn shift(&self) -> CalendarShift {
        match self {
            IntervalKeyword::LastHour => CalendarShift::Hours(-1),
            IntervalKeyword::Yesterday => CalendarShift::Days(-1),
            IntervalKeyword::LastWeek => CalendarShift::Days(-7),
            _ => CalendarShift::None,
        }
    }
}

impl fmt::Display for IntervalKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalKeyword {
    type Err = IntervalError;

    /// Exact, case-sensitive match against the nine keywords.
    fn from_str(s: &str) -> Result<Self> {
        IntervalKeyword::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| IntervalError::InvalidInterval(s.to_string()))
    }
}

// ── IntervalResult ──────────────────────────────────────────────────────────

/// Inclusive UTC boundaries of a resolved interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalResult {
    /// The keyword that was resolved.
    pub interval: IntervalKeyword,
    /// The IANA zone whose calendar defined the period.
    pub timezone: String,
    /// First instant of the period, attached to UTC.
    pub start: Instant,
    /// `start` as a canonical UTC string.
    pub start_string: String,
    /// Last instant of the period (one tick before the next period), attached to UTC.
    pub end: Instant,
    /// `end` as a canonical UTC string.
    pub end_string: String,
}

// ── IntervalResolver ────────────────────────────────────────────────────────

/// Resolves interval keywords against a fixed week convention and clock.
///
/// Collaborators are shared behind `Arc` and never mutated, so one resolver
/// can serve many threads.
///
/// ```
/// use chrono::TimeZone;
/// use chrono_tz::Tz;
/// use interval_engine::IntervalResolver;
///
/// let resolver = IntervalResolver::default();
/// let reference = Tz::UTC.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
/// let daily = resolver
///     .resolve("daily", "America/New_York", Some(&reference))
///     .unwrap();
/// assert_eq!(daily.start_string, "2024-03-10 05:00:00");
/// assert_eq!(daily.end_string, "2024-03-11 03:59:59");
/// ```
#[derive(Clone)]
pub struct IntervalResolver {
    calendar: Arc<dyn LocalCalendar>,
    clock: Arc<dyn Clock>,
    reporter: Reporter,
}

impl fmt::Debug for IntervalResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalResolver")
            .field("week", &self.calendar.week_convention())
            .field("reporter", &self.reporter)
            .finish()
    }
}

impl Default for IntervalResolver {
    fn default() -> Self {
        Self::new(WeekConvention::default())
    }
}

impl IntervalResolver {
    /// A resolver on the system clock, using `week` for week boundaries.
    pub fn new(week: WeekConvention) -> Self {
        Self {
            calendar: Arc::new(ZonedCalendar::new(week)),
            clock: Arc::new(SystemClock),
            reporter: Reporter::silent(COMPONENT),
        }
    }

    /// Bind the week convention of `config`. The `log` section is installed
    /// separately through [`ResolverConfig::init_logging`].
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.week))
    }

    /// Replace the source of "now".
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the calendar arithmetic backend.
    pub fn with_calendar(mut self, calendar: impl LocalCalendar + 'static) -> Self {
        self.calendar = Arc::new(calendar);
        self
    }

    /// Report resolutions and failures to `sink`.
    pub fn with_reporter(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.reporter = Reporter::new(COMPONENT, sink);
        self
    }

    pub fn week_convention(&self) -> WeekConvention {
        self.calendar.week_convention()
    }

    /// Resolve `interval` in `timezone`.
    ///
    /// `reference` defaults to the clock's current instant; a supplied
    /// reference is reinterpreted in `timezone` whatever zone it carries.
    ///
    /// # Errors
    ///
    /// [`IntervalError::InvalidInterval`] naming `interval` if it is not one of
    /// the nine keywords, [`IntervalError::UnknownTimeZone`] if `timezone` is
    /// not an IANA name, [`IntervalError::OutOfRange`] if a boundary has no
    /// canonical UTC string (years past 9999).
    pub fn resolve(
        &self,
        interval: &str,
        timezone: &str,
        reference: Option<&Instant>,
    ) -> Result<IntervalResult> {
        let outcome = interval.parse::<IntervalKeyword>().and_then(|keyword| {
            let tz = codec::parse_timezone(timezone)?;
            self.resolve_keyword(keyword, tz, reference)
        });

        match &outcome {
            Ok(result) => {
                let data = json!({
                    "timezone": result.timezone,
                    "start": result.start_string,
                    "end": result.end_string,
                });
                self.reporter.debug(
                    "resolve",
                    ReportOptions::message(interval).with_data(data.clone()),
                );
                self.reporter.emit(
                    "resolved",
                    "resolve",
                    ReportOptions::message(interval).with_data(data),
                );
            }
            Err(err) => {
                self.reporter.warn(
                    "resolve",
                    ReportOptions::message(interval)
                        .with_data(json!({ "timezone": timezone }))
                        .with_err(err),
                );
            }
        }

        outcome
    }

    /// Resolve an already parsed keyword in an already resolved zone.
    pub fn resolve_keyword(
        &self,
        keyword: IntervalKeyword,
        tz: Tz,
        reference: Option<&Instant>,
    ) -> Result<IntervalResult> {
        let local = self.local_reference(tz, reference);
        let shifted = self.calendar.shift(&local, keyword.shift())?;

        let unit = keyword.unit();
        let start_local = self.calendar.start_of(unit, &shifted)?;
        let end_local = self.calendar.end_of(unit, &shifted)?;

        let start = codec::rezone(&start_local, Tz::UTC);
        let end = codec::rezone(&end_local, Tz::UTC);

        debug!(
            interval = %keyword,
            timezone = %tz,
            reference = %codec::format_local(&local),
            start_local = %codec::format_local(&start_local),
            end_local = %codec::format_local(&end_local),
            "resolved interval"
        );

        Ok(IntervalResult {
            interval: keyword,
            timezone: tz.to_string(),
            start_string: codec::try_to_utc_string(&start)?,
            start,
            end_string: codec::try_to_utc_string(&end)?,
            end,
        })
    }

    /// Week number of the reference instant under this resolver's convention.
    pub fn week_number(&self, timezone: &str, reference: Option<&Instant>) -> Result<WeekNumber> {
        let tz = codec::parse_timezone(timezone)?;
        let local = self.local_reference(tz, reference);
        self.week_convention().week_of_year(local.date_naive())
    }

    fn local_reference(&self, tz: Tz, reference: Option<&Instant>) -> Instant {
        match reference {
            Some(instant) => codec::rezone(instant, tz),
            None => codec::rezone(&self.clock.now(), tz),
        }
    }
}

/// Resolve `interval` with the ISO week convention and the system clock.
pub fn resolve_utc_interval(
    interval: &str,
    timezone: &str,
    reference: Option<&Instant>,
) -> Result<IntervalResult> {
    IntervalResolver::default().resolve(interval, timezone, reference)
}

// ── Tests ───────────────────────────────────────────────────────────────────
