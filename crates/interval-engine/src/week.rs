//! Week convention: which day starts a week and how week 1 of a year is chosen.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{IntervalError, Result};

/// Which day begins a week for period computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
}

/// First day of the week plus the week-numbering rule.
///
/// Week 1 of a year is the first week that contains at least
/// `min_days_in_first_week` days of that year. `Monday` with `4` is ISO 8601.
///
/// Every value is validated: construct one with [`WeekConvention::new`] or
/// deserialize it, which applies the same check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WeekConventionFields")]
pub struct WeekConvention {
    first_day: WeekStartDay,
    min_days_in_first_week: u8,
}

/// Unchecked serde shape of [`WeekConvention`].
#[derive(Deserialize)]
#[serde(default)]
struct WeekConventionFields {
    first_day: WeekStartDay,
    min_days_in_first_week: u8,
}

impl Default for WeekConventionFields {
    fn default() -> Self {
        let WeekConvention {
            first_day,
            min_days_in_first_week,
        } = WeekConvention::default();
        Self {
            first_day,
            min_days_in_first_week,
        }
    }
}

impl TryFrom<WeekConventionFields> for WeekConvention {
    type Error = IntervalError;

    fn try_from(fields: WeekConventionFields) -> Result<Self> {
        Self::new(fields.first_day, fields.min_days_in_first_week)
    }
}

impl Default for WeekConvention {
    fn default() -> Self {
        Self {
            first_day: WeekStartDay::Monday,
            min_days_in_first_week: 4,
        }
    }
}

/// A week-numbering year and the week within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct WeekNumber {
    pub year: i32,
    pub week: u32,
}

impl fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl WeekConvention {
    /// Build a convention, rejecting a minimum outside `1..=7`.
    pub fn new(first_day: WeekStartDay, min_days_in_first_week: u8) -> Result<Self> {
        let convention = Self {
            first_day,
            min_days_in_first_week,
        };
        convention.validate()?;
        Ok(convention)
    }

    /// Weeks start on Sunday; week 1 is the week containing January 1st.
    pub fn sunday_start() -> Self {
        Self {
            first_day: WeekStartDay::Sunday,
            min_days_in_first_week: 1,
        }
    }

    pub fn first_day(&self) -> WeekStartDay {
        self.first_day
    }

    pub fn min_days_in_first_week(&self) -> u8 {
        self.min_days_in_first_week
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=7).contains(&self.min_days_in_first_week) {
            return Err(IntervalError::InvalidConfig(format!(
                "min_days_in_first_week must be between 1 and 7, got {}",
                self.min_days_in_first_week
            )));
        }
        Ok(())
    }

    /// How many days `weekday` is from the week-start day.
    pub fn days_from_week_start(&self, weekday: Weekday) -> i64 {
        match self.first_day {
            WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
            WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
        }
    }

    /// The first day of the week containing `date`.
    pub fn week_start(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_sub_signed(chrono::Duration::days(
            self.days_from_week_start(date.weekday()),
        ))
    }

    /// Week-numbering year and week of `date`.
    pub fn week_of_year(&self, date: NaiveDate) -> Result<WeekNumber> {
        let mut year = date.year();
        let mut first = self.first_week_start(year)?;

        if date < first {
            year -= 1;
            first = self.first_week_start(year)?;
        } else {
            let next = self.first_week_start(year + 1)?;
            if date >= next {
                year += 1;
                first = next;
            }
        }

        let week = (date - first).num_days() / 7 + 1;
        Ok(WeekNumber {
            year,
            week: week as u32,
        })
    }

    /// Start of week 1: the week containing January `min_days_in_first_week`.
    fn first_week_start(&self, year: i32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(year, 1, u32::from(self.min_days_in_first_week))
            .and_then(|anchor| self.week_start(anchor))
            .ok_or_else(|| IntervalError::OutOfRange(format!("week 1 of year {year}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_is_iso() {
        let wc = WeekConvention::default();
        assert_eq!(wc.first_day(), WeekStartDay::Monday);
        assert_eq!(wc.min_days_in_first_week(), 4);
    }

    #[test]
    fn test_deserialize_validates_minimum() {
        let err = serde_json::from_str::<WeekConvention>(r#"{ "min_days_in_first_week": 0 }"#)
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 7"), "got: {err}");

        let wc: WeekConvention = serde_json::from_str(r#"{ "first_day": "sunday" }"#).unwrap();
        assert_eq!(wc.first_day(), WeekStartDay::Sunday);
        assert_eq!(wc.min_days_in_first_week(), 4);
    }

    #[test]
    fn test_serialize_keeps_field_names() {
        let json = serde_json::to_value(WeekConvention::sunday_start()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "first_day": "sunday", "min_days_in_first_week": 1 })
        );
    }

    #[test]
    fn test_new_rejects_out_of_range_minimum() {
        assert!(WeekConvention::new(WeekStartDay::Monday, 0).is_err());
        assert!(WeekConvention::new(WeekStartDay::Monday, 8).is_err());
        assert!(WeekConvention::new(WeekStartDay::Sunday, 7).is_ok());
    }

    #[test]
    fn test_week_start_monday() {
        let wc = WeekConvention::default();
        // 2024-03-13 is a Wednesday
        assert_eq!(wc.week_start(date(2024, 3, 13)), Some(date(2024, 3, 11)));
        // Sunday belongs to the week that started six days earlier
        assert_eq!(wc.week_start(date(2024, 3, 17)), Some(date(2024, 3, 11)));
    }

    #[test]
    fn test_week_start_sunday() {
        let wc = WeekConvention::sunday_start();
        assert_eq!(wc.week_start(date(2024, 3, 13)), Some(date(2024, 3, 10)));
        assert_eq!(wc.week_start(date(2024, 3, 10)), Some(date(2024, 3, 10)));
    }

    #[test]
    fn test_iso_week_numbers() {
        let wc = WeekConvention::default();
        assert_eq!(
            wc.week_of_year(date(2024, 3, 10)).unwrap(),
            WeekNumber { year: 2024, week: 10 }
        );
        // 2021-01-03 (Sunday) still belongs to 2020-W53
        assert_eq!(
            wc.week_of_year(date(2021, 1, 3)).unwrap(),
            WeekNumber { year: 2020, week: 53 }
        );
        // 2024-12-30 (Monday) is 2025-W01
        assert_eq!(
            wc.week_of_year(date(2024, 12, 30)).unwrap(),
            WeekNumber { year: 2025, week: 1 }
        );
    }

    #[test]
    fn test_sunday_start_week_numbers() {
        let wc = WeekConvention::sunday_start();
        // Week 1 always contains January 1st
        assert_eq!(wc.week_of_year(date(2022, 1, 1)).unwrap().week, 1);
        assert_eq!(
            wc.week_of_year(date(2021, 12, 26)).unwrap(),
            WeekNumber { year: 2022, week: 1 }
        );
    }

    #[test]
    fn test_week_number_display() {
        let wn = WeekNumber { year: 2024, week: 3 };
        assert_eq!(wn.to_string(), "2024-W03");
    }
}
