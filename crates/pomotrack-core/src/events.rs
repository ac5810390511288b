use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::timer::{Phase, TimerStatus};

/// Every state change of the timer produces an Event.
/// The View renders them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        duration_ms: i64,
        end_at: Timestamp,
        at: Timestamp,
    },
    /// Resumed from pause; `end_at` already includes the paused time.
    TimerResumed {
        phase: Phase,
        remaining_ms: i64,
        end_at: Timestamp,
        at: Timestamp,
    },
    TimerPaused {
        phase: Phase,
        remaining_ms: i64,
        at: Timestamp,
    },
    TimerStopped {
        at: Timestamp,
    },
    /// A phase ran out and the next one began at `at`.
    PhaseCompleted {
        finished: Phase,
        next: Phase,
        /// Counter after the rollover, 0 right after a long break starts.
        cycles_since_long_break: u32,
        /// Whether a work session was written to history.
        recorded: bool,
        at: Timestamp,
    },
    StateSnapshot {
        status: TimerStatus,
        phase: Phase,
        remaining_ms: i64,
        display: String,
        cycles_since_long_break: u32,
        end_at: Option<Timestamp>,
        at: Timestamp,
    },
}
