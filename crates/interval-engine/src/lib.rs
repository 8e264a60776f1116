//! # interval-engine
//!
//! Timezone-aware reporting intervals.
//!
//! Converts instants to and from a fixed `YYYY-MM-DD HH:mm:ss` string layout
//! under an explicit IANA zone, and resolves named intervals ("daily",
//! "last-week", ...) to inclusive UTC boundaries computed on the zone's local
//! calendar, DST transitions included.
//!
//! ## Modules
//!
//! - [`codec`] — canonical strings ↔ instants, zone conversion, epoch bridges
//! - [`interval`] — interval keywords and the [`IntervalResolver`]
//! - [`calendar`] — start/end of local calendar units, local-unit shifts
//! - [`week`] — first day of week and week numbering
//! - [`clock`] — injectable source of "now"
//! - [`report`] — optional reporting sink for records and events
//! - [`logging`] — `tracing-subscriber` setup for embedding processes
//! - [`config`] — resolver configuration loaded from JSON
//! - [`format`] — the canonical layout constants
//! - [`error`] — error types

pub mod calendar;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod interval;
pub mod logging;
pub mod report;
pub mod week;

pub use calendar::{CalendarShift, CalendarUnit, LocalCalendar, ZonedCalendar};
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{
    convert_string, epoch_seconds_to_utc_string, format_local, from_epoch_seconds, parse,
    parse_timezone, parse_with_format, rezone, to_epoch_seconds, to_utc_string, to_zoned_string,
    try_to_utc_string, utc_string_to_epoch_seconds, Instant,
};
pub use config::ResolverConfig;
pub use error::{IntervalError, Result};
pub use format::CANONICAL_FORMAT;
pub use interval::{resolve_utc_interval, IntervalKeyword, IntervalResolver, IntervalResult};
pub use report::{EventBody, ReportLevel, ReportOptions, ReportSink, Reporter, TracingSink};
pub use week::{WeekConvention, WeekNumber, WeekStartDay};
