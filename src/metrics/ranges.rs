// ABOUTME: Named lower-bound time ranges for dashboard statistics
// ABOUTME: Today, this week, this month, this year and overall, anchored at local midnights
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

/// Label of the range starting at local midnight
pub const TODAY: &str = "Today";
/// Label of the range starting Monday 00:00
pub const THIS_WEEK: &str = "This week";
/// Label of the range starting on the 1st of the month
pub const THIS_MONTH: &str = "This month";
/// Label of the range starting January 1st
pub const THIS_YEAR: &str = "This year";
/// Label of the unbounded range
pub const OVERALL: &str = "Overall";

/// A named lower bound; the upper bound is always "now"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Display label
    pub label: String,
    /// Lower bound in epoch seconds, `0` for unbounded
    pub since: i64,
}

impl TimeRange {
    /// Range with an explicit lower bound
    pub fn new(label: impl Into<String>, since: i64) -> Self {
        Self {
            label: label.into(),
            since,
        }
    }

    /// All-time range
    #[must_use]
    pub fn overall() -> Self {
        Self::new(OVERALL, 0)
    }

    /// Whether this range has no lower bound
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.since == 0
    }

    /// The five dashboard ranges relative to `now`, in display order
    ///
    /// Bounds are midnights in `now`'s timezone. Weeks start on Monday.
    #[must_use]
    pub fn standard<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<Self> {
        let tz = now.timezone();
        let today = now.date_naive();
        let week_start = today
            .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
            .unwrap_or(today);
        let month_start = today.with_day(1).unwrap_or(today);
        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);

        vec![
            Self::new(TODAY, midnight(&tz, today)),
            Self::new(THIS_WEEK, midnight(&tz, week_start)),
            Self::new(THIS_MONTH, midnight(&tz, month_start)),
            Self::new(THIS_YEAR, midnight(&tz, year_start)),
            Self::overall(),
        ]
    }

    /// [`TimeRange::standard`] for the current local time
    #[must_use]
    pub fn standard_local() -> Vec<Self> {
        Self::standard(&Local::now())
    }
}

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Epoch seconds of the first instant of `date` in `tz`
///
/// When midnight falls in a DST gap the day starts at the first local minute
/// after the gap.
fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let naive = date.and_time(NaiveTime::default());
    (0..MINUTES_PER_DAY)
        .filter_map(|minute| naive.checked_add_signed(TimeDelta::minutes(minute)))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map_or_else(|| naive.and_utc().timestamp(), |start| start.timestamp())
}
