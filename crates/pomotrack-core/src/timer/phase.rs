use serde::{Deserialize, Serialize};

use crate::clock::MINUTE_MS;

pub const WORK_MINUTES: i64 = 25;
pub const SHORT_BREAK_MINUTES: i64 = 5;
pub const LONG_BREAK_MINUTES: i64 = 15;

/// Completed work sessions that earn a long break.
pub const CYCLES_BEFORE_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn duration_min(self) -> i64 {
        match self {
            Phase::Work => WORK_MINUTES,
            Phase::ShortBreak => SHORT_BREAK_MINUTES,
            Phase::LongBreak => LONG_BREAK_MINUTES,
        }
    }

    pub fn duration_ms(self) -> i64 {
        self.duration_min() * MINUTE_MS
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    /// Phase that follows `self`, given the work sessions completed since the
    /// last long break (including the one just finished).
    pub fn next(self, cycles_since_long_break: u32) -> Phase {
        match self {
            Phase::Work if cycles_since_long_break >= CYCLES_BEFORE_LONG_BREAK => Phase::LongBreak,
            Phase::Work => Phase::ShortBreak,
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(Phase::Work.duration_ms(), 25 * 60 * 1000);
        assert_eq!(Phase::ShortBreak.duration_ms(), 5 * 60 * 1000);
        assert_eq!(Phase::LongBreak.duration_ms(), 15 * 60 * 1000);
    }

    #[test]
    fn work_leads_to_short_break_until_fourth_cycle() {
        for cycles in 1..CYCLES_BEFORE_LONG_BREAK {
            assert_eq!(Phase::Work.next(cycles), Phase::ShortBreak);
        }
        assert_eq!(Phase::Work.next(4), Phase::LongBreak);
    }

    #[test]
    fn breaks_lead_to_work() {
        assert_eq!(Phase::ShortBreak.next(2), Phase::Work);
        assert_eq!(Phase::LongBreak.next(0), Phase::Work);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::LongBreak).unwrap(), "\"long_break\"");
    }
}
