//! Daily and weekly completion statistics.

use std::fmt::Write;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::{Timestamp, DAY_MS};

/// Work sessions per day that count as 100%.
pub const DAILY_GOAL: u32 = 4;

/// Number of buckets in the weekly breakdown.
pub const WEEK_DAYS: u64 = 7;

pub const DEFAULT_DAY_LABEL_FORMAT: &str = "%m/%d";

/// Completions so far today.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub count: u32,
    /// Share of [`DAILY_GOAL`], not capped at 100.
    pub percent: f64,
}

/// One day of the weekly breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub day_label: String,
    pub date: NaiveDate,
    /// Inclusive start; the bucket ends `DAY_MS` later, exclusive.
    pub day_start: Timestamp,
    pub count: u32,
    pub percent: f64,
}

/// `count / DAILY_GOAL * 100`
pub fn percent_of_goal(count: u32) -> f64 {
    f64::from(count) / f64::from(DAILY_GOAL) * 100.0
}

/// Whether chrono can render a calendar date with `fmt`.
///
/// Parsing alone is not enough: time specifiers such as `%H` parse fine but
/// fail when applied to a date.
pub fn is_valid_label_format(fmt: &str) -> bool {
    let sample = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap_or_default();
    render_date(sample, fmt).is_some()
}

fn render_date(date: NaiveDate, fmt: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(fmt)).ok()?;
    Some(out)
}

#[derive(Debug, Clone)]
pub struct HistoryAggregator {
    label_format: String,
}

impl Default for HistoryAggregator {
    fn default() -> Self {
        Self {
            label_format: DEFAULT_DAY_LABEL_FORMAT.to_string(),
        }
    }
}

impl HistoryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom chrono format for day labels. Invalid formats fall back
    /// to the default.
    pub fn with_label_format(fmt: &str) -> Self {
        if is_valid_label_format(fmt) {
            Self {
                label_format: fmt.to_string(),
            }
        } else {
            tracing::warn!(format = fmt, "invalid day label format, using default");
            Self::default()
        }
    }

    /// Entries at or after the start of `reference`'s local day.
    pub fn count_today(&self, collection: &[Timestamp], reference: Timestamp) -> DailyProgress {
        let start_of_today = reference.start_of_day();
        let count = count_where(collection, |t| t >= start_of_today);
        DailyProgress {
            count,
            percent: percent_of_goal(count),
        }
    }

    /// Seven day buckets ending just before today, oldest first.
    ///
    /// Bucket `i` covers `[seven_days_ago + i * DAY_MS, seven_days_ago + (i + 1) * DAY_MS)`.
    pub fn weekly_breakdown(&self, collection: &[Timestamp], reference: Timestamp) -> Vec<DayBucket> {
        let seven_days_ago = reference.start_of_day_days_ago(WEEK_DAYS);
        let first_date = seven_days_ago.local_date();

        (0..WEEK_DAYS)
            .map(|i| {
                let offset = i64::try_from(i).unwrap_or_default() * DAY_MS;
                let lower = seven_days_ago.add_millis(offset);
                let upper = lower.add_millis(DAY_MS);
                let count = count_where(collection, |t| t >= lower && t < upper);
                let date = first_date
                    .checked_add_days(Days::new(i))
                    .unwrap_or(first_date);
                DayBucket {
                    day_label: self.label_for(date),
                    date,
                    day_start: lower,
                    count,
                    percent: percent_of_goal(count),
                }
            })
            .collect()
    }
}

impl HistoryAggregator {
    fn label_for(&self, date: NaiveDate) -> String {
        render_date(date, &self.label_format)
            .or_else(|| render_date(date, DEFAULT_DAY_LABEL_FORMAT))
            .unwrap_or_else(|| date.to_string())
    }
}

fn count_where(collection: &[Timestamp], pred: impl Fn(Timestamp) -> bool) -> u32 {
    let n = collection.iter().filter(|t| pred(**t)).count();
    u32::try_from(n).unwrap_or(u32::MAX)
}
