//! Time source and millisecond timestamps.
//!
//! Every time-dependent operation in the crate takes its "now" from a
//! [`Clock`] handed in by the caller, so tests can pin time with
//! [`FixedClock`] while production code uses [`SystemClock`].
//!
//! Day boundaries are computed in local device time.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const SECOND_MS: i64 = 1_000;
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
pub const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

/// Milliseconds since the Unix epoch.
///
/// Serialized as a bare JSON integer, which is also the persisted history
/// entry format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    pub fn add_millis(self, ms: i64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Signed distance `self - earlier` in milliseconds.
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn to_local(self) -> DateTime<Local> {
        DateTime::<Utc>::from_timestamp_millis(self.0)
            .unwrap_or_default()
            .with_timezone(&Local)
    }

    /// Calendar date of this instant in local time.
    pub fn local_date(self) -> NaiveDate {
        self.to_local().date_naive()
    }

    /// First instant of the local calendar day containing `self`.
    pub fn start_of_day(self) -> Timestamp {
        local_midnight(self.local_date())
    }

    /// Start of the local day `days` calendar days before the day of `self`.
    ///
    /// Calendar arithmetic, so a week spanning a DST switch is not exactly
    /// `7 * DAY_MS` long.
    pub fn start_of_day_days_ago(self, days: u64) -> Timestamp {
        let date = self.local_date();
        let shifted = date.checked_sub_days(Days::new(days)).unwrap_or(date);
        local_midnight(shifted)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Self(dt.timestamp_millis())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_local().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Midnight of `date` in local time.
///
/// Where DST skips midnight the day starts at the first valid local
/// instant, which is an hour later in every zone that does this.
pub fn local_midnight(date: NaiveDate) -> Timestamp {
    let naive = date.and_time(NaiveTime::MIN);
    if let Some(dt) = Local.from_local_datetime(&naive).earliest() {
        return dt.into();
    }
    let shifted = naive + chrono::Duration::hours(1);
    match Local.from_local_datetime(&shifted).earliest() {
        Some(dt) => dt.into(),
        None => Timestamp(naive.and_utc().timestamp_millis()),
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().into()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: AtomicI64,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now_ms: AtomicI64::new(now.as_millis()),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now_ms.store(now.as_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.load(Ordering::SeqCst))
    }
}
