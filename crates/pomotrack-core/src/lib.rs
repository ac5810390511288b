//! # pomotrack Core Library
//!
//! Business logic for the pomotrack Pomodoro timer. The CLI binary is a
//! thin view over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock state machine cycling Work, Short Break
//!   and Long Break; the host drives it through a cancellable [`Ticker`]
//! - **History**: completed work sessions stored as a JSON array of
//!   millisecond timestamps in a [`KeyValueStore`]
//! - **Statistics**: today's progress towards the daily goal and a 7-day
//!   breakdown
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`HistoryStore`]: Session history persistence
//! - [`HistoryAggregator`]: Daily and weekly statistics
//! - [`Clock`]: Injected time source
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod history;
pub mod storage;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock, Timestamp};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use history::{DailyProgress, DayBucket, HistoryAggregator, HistoryStore};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore};
pub use timer::{
    ManualTicker, Phase, RemainingDisplay, TickHandle, TickOutcome, Ticker, TimerEngine,
    TimerState, TimerStatus, TokioTicker,
};
