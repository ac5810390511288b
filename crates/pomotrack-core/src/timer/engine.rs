//! Timer engine implementation.
//!
//! The engine is a wall-clock state machine over absolute timestamps: a
//! running phase is just `start_at..end_at`, and pausing shifts `end_at` by
//! the paused duration on resume. It owns no threads; a [`Ticker`] decides
//! when `tick` runs.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running(Work) -> Paused -> Running(Work) -> ...
//! Running(Work) --tick--> Running(ShortBreak | LongBreak) --tick--> Running(Work)
//! any --stop--> Stopped
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(clock, history, ticker);
//! engine.start();
//! // On every scheduled tick:
//! if let Some(outcome) = engine.on_scheduled_tick(handle) {
//!     render(outcome.display);
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::phase::{Phase, CYCLES_BEFORE_LONG_BREAK};
use super::ticker::{TickHandle, Ticker};
use crate::clock::{Clock, Timestamp, MINUTE_MS, SECOND_MS};
use crate::events::Event;
use crate::history::HistoryStore;

/// Default refresh cadence while running.
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Stopped,
    Running,
    Paused,
}

/// Everything the engine knows about the current session.
///
/// Serializable so short-lived hosts can persist it between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub paused_at: Option<Timestamp>,
    pub running: bool,
    /// Work sessions completed since the last long break (0..=3 between ticks).
    pub cycles_since_long_break: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            phase: Phase::Work,
            start_at: None,
            end_at: None,
            paused_at: None,
            running: false,
            cycles_since_long_break: 0,
        }
    }
}

impl TimerState {
    pub fn status(&self) -> TimerStatus {
        if self.running {
            TimerStatus::Running
        } else if self.paused_at.is_some() {
            TimerStatus::Paused
        } else {
            TimerStatus::Stopped
        }
    }
}

/// Countdown value for display, `M:SS` when formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingDisplay {
    pub minutes: i64,
    pub seconds: i64,
}

impl RemainingDisplay {
    /// Clamped at zero; an overdue phase reads `0:00` until the next tick
    /// rolls it over.
    pub fn from_millis(diff_ms: i64) -> Self {
        let diff_ms = diff_ms.max(0);
        Self {
            minutes: diff_ms.div_euclid(MINUTE_MS),
            seconds: diff_ms.rem_euclid(MINUTE_MS) / SECOND_MS,
        }
    }
}

impl fmt::Display for RemainingDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Result of one `tick`.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub display: RemainingDisplay,
    /// `Some(Event::PhaseCompleted)` when this tick rolled the phase over.
    pub completed: Option<Event>,
}

/// Core timer engine.
///
/// Owned by its host; construct as many as needed. All time reads go
/// through the injected [`Clock`], and every command has an `_at` form
/// taking an explicit timestamp.
pub struct TimerEngine {
    state: TimerState,
    clock: Arc<dyn Clock>,
    history: HistoryStore,
    ticker: Box<dyn Ticker>,
    active_tick: Option<TickHandle>,
    tick_interval: Duration,
}

impl TimerEngine {
    /// Create a stopped engine in the Work phase.
    pub fn new(clock: Arc<dyn Clock>, history: HistoryStore, ticker: impl Ticker + 'static) -> Self {
        Self::restore(TimerState::default(), clock, history, ticker)
    }

    /// Rebuild an engine from persisted state. A running state gets a fresh
    /// tick scheduled.
    ///
    /// A cycle counter at or above [`CYCLES_BEFORE_LONG_BREAK`] is clamped so
    /// the next completed work session earns the long break.
    pub fn restore(
        mut state: TimerState,
        clock: Arc<dyn Clock>,
        history: HistoryStore,
        ticker: impl Ticker + 'static,
    ) -> Self {
        if state.cycles_since_long_break >= CYCLES_BEFORE_LONG_BREAK {
            tracing::warn!(
                cycles = state.cycles_since_long_break,
                "restored cycle counter out of range, clamping"
            );
            state.cycles_since_long_break = CYCLES_BEFORE_LONG_BREAK - 1;
        }
        let mut engine = Self {
            state,
            clock,
            history,
            ticker: Box::new(ticker),
            active_tick: None,
            tick_interval: TICK_INTERVAL,
        };
        if engine.state.running {
            engine.schedule_tick();
        }
        engine
    }

    /// Change the refresh cadence. Takes effect on the next schedule.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        if self.active_tick.is_some() {
            self.schedule_tick();
        }
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn cycles_since_long_break(&self) -> u32 {
        self.state.cycles_since_long_break
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Handle of the scheduled tick, `None` unless running.
    pub fn active_tick(&self) -> Option<TickHandle> {
        self.active_tick
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Milliseconds left in the current phase as of `time`.
    ///
    /// While paused the countdown is frozen at the pause instant.
    pub fn remaining_ms_at(&self, time: Timestamp) -> i64 {
        match (self.state.status(), self.state.end_at) {
            (TimerStatus::Stopped, _) | (_, None) => self.state.phase.duration_ms(),
            (TimerStatus::Paused, Some(end_at)) => {
                end_at.millis_since(self.state.paused_at.unwrap_or(time))
            }
            (TimerStatus::Running, Some(end_at)) => end_at.millis_since(time),
        }
    }

    pub fn remaining_display(&self) -> RemainingDisplay {
        self.remaining_display_at(self.clock.now())
    }

    /// `(25, 0)` when stopped, otherwise the countdown to `end_at`.
    pub fn remaining_display_at(&self, time: Timestamp) -> RemainingDisplay {
        RemainingDisplay::from_millis(self.remaining_ms_at(time))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let at = self.clock.now();
        let remaining_ms = self.remaining_ms_at(at);
        Event::StateSnapshot {
            status: self.state.status(),
            phase: self.state.phase,
            remaining_ms: remaining_ms.max(0),
            display: RemainingDisplay::from_millis(remaining_ms).to_string(),
            cycles_since_long_break: self.state.cycles_since_long_break,
            end_at: self.state.end_at,
            at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(self.clock.now())
    }

    /// Stopped or Paused -> Running. No-op while running.
    pub fn start_at(&mut self, time: Timestamp) -> Option<Event> {
        match self.state.status() {
            TimerStatus::Running => None,
            TimerStatus::Paused => {
                let paused_at = self.state.paused_at.take()?;
                let paused_for = time.millis_since(paused_at).max(0);
                let end_at = self
                    .state
                    .end_at
                    .unwrap_or_else(|| paused_at.add_millis(self.state.phase.duration_ms()))
                    .add_millis(paused_for);
                self.state.end_at = Some(end_at);
                self.state.running = true;
                self.schedule_tick();
                tracing::debug!(phase = ?self.state.phase, paused_for_ms = paused_for, "timer resumed");
                Some(Event::TimerResumed {
                    phase: self.state.phase,
                    remaining_ms: end_at.millis_since(time),
                    end_at,
                    at: time,
                })
            }
            TimerStatus::Stopped => {
                let duration_ms = self.state.phase.duration_ms();
                let end_at = time.add_millis(duration_ms);
                self.state.start_at = Some(time);
                self.state.end_at = Some(end_at);
                self.state.paused_at = None;
                self.state.running = true;
                self.schedule_tick();
                tracing::debug!(phase = ?self.state.phase, "timer started");
                Some(Event::TimerStarted {
                    phase: self.state.phase,
                    duration_ms,
                    end_at,
                    at: time,
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(self.clock.now())
    }

    /// Running -> Paused. No-op otherwise.
    pub fn pause_at(&mut self, time: Timestamp) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.cancel_tick();
        self.state.running = false;
        self.state.paused_at = Some(time);
        let remaining_ms = self.remaining_ms_at(time);
        tracing::debug!(phase = ?self.state.phase, remaining_ms, "timer paused");
        Some(Event::TimerPaused {
            phase: self.state.phase,
            remaining_ms,
            at: time,
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        self.stop_at(self.clock.now())
    }

    /// Any state -> Stopped with phase, timestamps and cycle count reset.
    /// Returns `None` if the engine was already in its initial state.
    pub fn stop_at(&mut self, time: Timestamp) -> Option<Event> {
        self.cancel_tick();
        if self.state == TimerState::default() {
            return None;
        }
        self.state = TimerState::default();
        tracing::debug!("timer stopped");
        Some(Event::TimerStopped { at: time })
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(self.clock.now())
    }

    /// Advance the phase if it has run out at `time`.
    ///
    /// When a Work phase ends, `time` is appended to history and the cycle
    /// counter grows; the fourth completion starts a long break and resets
    /// the counter. A tick while not running only reports the display.
    pub fn tick_at(&mut self, time: Timestamp) -> TickOutcome {
        let completed = if self.state.running {
            self.roll_over_if_due(time)
        } else {
            None
        };
        TickOutcome {
            display: self.remaining_display_at(time),
            completed,
        }
    }

    pub fn catch_up(&mut self) -> Vec<Event> {
        self.catch_up_at(self.clock.now())
    }

    /// Roll over every phase whose end passed before `time`, each at its
    /// own end instant.
    ///
    /// For hosts that were not ticking while the timer ran, such as the CLI
    /// between invocations. Work sessions land in history at the moment
    /// they ended.
    pub fn catch_up_at(&mut self, time: Timestamp) -> Vec<Event> {
        let mut events = Vec::new();
        while self.state.running {
            let due = match self.state.end_at {
                Some(end_at) if end_at <= time => end_at,
                _ => break,
            };
            match self.tick_at(due).completed {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    /// Entry point for ticks delivered by the [`Ticker`].
    ///
    /// Returns `None` without touching state when `handle` is not the
    /// active tick, which covers ticks still in flight after pause or stop.
    pub fn on_scheduled_tick(&mut self, handle: TickHandle) -> Option<TickOutcome> {
        if self.active_tick != Some(handle) {
            tracing::trace!(handle = handle.id(), "ignoring stale tick");
            return None;
        }
        Some(self.tick())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn roll_over_if_due(&mut self, time: Timestamp) -> Option<Event> {
        let end_at = self.state.end_at?;
        if end_at.millis_since(time) > 0 {
            return None;
        }

        let finished = self.state.phase;
        let mut recorded = false;
        if finished == Phase::Work {
            match self.history.append(time) {
                Ok(()) => recorded = true,
                Err(e) => tracing::error!(error = %e, at = %time, "failed to record work session"),
            }
            let cycles = &mut self.state.cycles_since_long_break;
            *cycles = cycles.saturating_add(1);
        }

        let next = finished.next(self.state.cycles_since_long_break);
        if next == Phase::LongBreak {
            self.state.cycles_since_long_break = 0;
        }
        self.state.phase = next;
        self.state.start_at = Some(time);
        self.state.end_at = Some(time.add_millis(next.duration_ms()));

        tracing::debug!(
            finished = ?finished,
            next = ?next,
            cycles = self.state.cycles_since_long_break,
            "phase completed"
        );
        Some(Event::PhaseCompleted {
            finished,
            next,
            cycles_since_long_break: self.state.cycles_since_long_break,
            recorded,
            at: time,
        })
    }

    fn schedule_tick(&mut self) {
        self.cancel_tick();
        self.active_tick = Some(self.ticker.schedule_repeating(self.tick_interval));
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.active_tick.take() {
            self.ticker.cancel(handle);
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.cancel_tick();
    }
}
