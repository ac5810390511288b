mod engine;
mod phase;
mod ticker;

pub use engine::{RemainingDisplay, TickOutcome, TimerEngine, TimerState, TimerStatus, TICK_INTERVAL};
pub use phase::{
    Phase, CYCLES_BEFORE_LONG_BREAK, LONG_BREAK_MINUTES, SHORT_BREAK_MINUTES, WORK_MINUTES,
};
pub use ticker::{ManualTicker, TickHandle, Ticker, TokioTicker};
