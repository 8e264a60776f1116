use chrono::{DateTime, Datelike, TimeZone, Weekday};
use chrono_tz::Tz;
use interval_engine::{
    from_epoch_seconds, parse, to_zoned_string, IntervalKeyword, IntervalResolver,
};
use proptest::prelude::*;

const ZONES: &[&str] = &[
    "UTC",
    "America/New_York",
    "America/Sao_Paulo",
    "Europe/Berlin",
    "Asia/Kolkata",
    "Australia/Lord_Howe",
    "Pacific/Chatham",
];

// 1990-01-01 .. 2037-12-31
const EPOCH_RANGE: std::ops::Range<i64> = 631_152_000..2_145_830_400;

fn zone() -> impl Strategy<Value = &'static str> {
    prop::sample::select(ZONES)
}

fn keyword() -> impl Strategy<Value = IntervalKeyword> {
    prop::sample::select(IntervalKeyword::ALL.to_vec())
}

fn nominal_length(keyword: IntervalKeyword) -> Option<i64> {
    match keyword {
        IntervalKeyword::Minutely => Some(60),
        IntervalKeyword::Hourly | IntervalKeyword::LastHour => Some(3600),
        IntervalKeyword::Daily | IntervalKeyword::Yesterday => Some(86_400),
        IntervalKeyword::Weekly | IntervalKeyword::LastWeek => Some(7 * 86_400),
        _ => None,
    }
}

proptest! {
    #[test]
    fn prop_parse_inverts_zoned_format(secs in EPOCH_RANGE, zone in zone()) {
        let instant = from_epoch_seconds(secs, "UTC").unwrap();
        let text = to_zoned_string(&instant, zone).unwrap();
        let parsed = parse(&text, zone).unwrap();

        let tz: Tz = zone.parse().unwrap();
        let naive = instant.with_timezone(&tz).naive_local();
        if tz.from_local_datetime(&naive).single().is_some() {
            prop_assert_eq!(parsed, instant);
        } else {
            // Repeated wall-clock time: the earlier candidate wins.
            prop_assert!(parsed <= instant);
            prop_assert_eq!(to_zoned_string(&parsed, zone).unwrap(), text);
        }
    }

    #[test]
    fn prop_resolution_is_ordered_and_deterministic(
        secs in EPOCH_RANGE,
        zone in zone(),
        keyword in keyword(),
    ) {
        let resolver = IntervalResolver::default();
        let at = from_epoch_seconds(secs, "UTC").unwrap();
        let a = resolver.resolve(keyword.as_str(), zone, Some(&at)).unwrap();
        let b = resolver.resolve(keyword.as_str(), zone, Some(&at)).unwrap();
        prop_assert!(a.start <= a.end);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_utc_periods_have_nominal_length(secs in EPOCH_RANGE, keyword in keyword()) {
        let resolver = IntervalResolver::default();
        let at = from_epoch_seconds(secs, "UTC").unwrap();
        let r = resolver.resolve(keyword.as_str(), "UTC", Some(&at)).unwrap();
        if let Some(len) = nominal_length(keyword) {
            prop_assert_eq!((r.end - r.start).num_seconds(), len - 1);
        }
    }

    #[test]
    fn prop_weekly_starts_on_local_monday(secs in EPOCH_RANGE, zone in zone()) {
        let resolver = IntervalResolver::default();
        let at = from_epoch_seconds(secs, "UTC").unwrap();
        let r = resolver.resolve("weekly", zone, Some(&at)).unwrap();
        let tz: Tz = zone.parse().unwrap();
        let local: DateTime<Tz> = r.start.with_timezone(&tz);
        prop_assert_eq!(local.weekday(), Weekday::Mon);
    }
}
