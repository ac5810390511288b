//! Per-invocation wiring: config, the SQLite store, the clock and the
//! persisted timer state.

use std::sync::Arc;
use std::time::Duration;

use pomotrack_core::history::startup_prune_cutoff;
use pomotrack_core::{
    Clock, Config, FixedClock, HistoryAggregator, HistoryStore, KeyValueStore, SqliteStore,
    SystemClock, Ticker, TimerEngine, TimerState, Timestamp,
};

/// Key holding the serialized [`TimerState`] between invocations.
pub const TIMER_STATE_KEY: &str = "timerState";

pub struct AppContext {
    pub config: Config,
    store: Arc<SqliteStore>,
    clock: Arc<dyn Clock>,
    pinned: bool,
}

impl AppContext {
    /// Open the configured database. `at` pins the clock to a fixed instant.
    pub fn open(config: Config, at: Option<i64>) -> Result<Self, Box<dyn std::error::Error>> {
        let store = SqliteStore::open(&config.storage.database)?;
        let clock: Arc<dyn Clock> = match at {
            Some(ms) => Arc::new(FixedClock::new(Timestamp::from_millis(ms))),
            None => Arc::new(SystemClock),
        };
        Ok(Self {
            config,
            store: Arc::new(store),
            clock,
            pinned: at.is_some(),
        })
    }

    /// Whether `--at` froze the clock for this invocation.
    pub fn clock_is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn history(&self) -> HistoryStore {
        HistoryStore::new(Arc::clone(&self.store))
    }

    pub fn aggregator(&self) -> HistoryAggregator {
        HistoryAggregator::with_label_format(&self.config.display.day_label_format)
    }

    /// Drop entries older than the retention window. Failures are logged
    /// and never stop the command.
    pub fn prune_on_startup(&self) {
        let cutoff = startup_prune_cutoff(self.now());
        if let Err(e) = self.history().prune_older_than(cutoff) {
            tracing::warn!(error = %e, "startup prune failed");
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.display.tick_interval_ms)
    }

    /// Rebuild the engine from the last saved state, or a fresh one.
    pub fn load_engine(&self, ticker: impl Ticker + 'static) -> TimerEngine {
        let state = match self.store.get_item(TIMER_STATE_KEY) {
            Ok(Some(json)) => serde_json::from_str::<TimerState>(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable timer state");
                TimerState::default()
            }),
            Ok(None) => TimerState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read timer state");
                TimerState::default()
            }
        };
        TimerEngine::restore(state, Arc::clone(&self.clock), self.history(), ticker)
            .with_tick_interval(self.tick_interval())
    }

    pub fn save_engine(&self, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(engine.state())?;
        self.store.set_item(TIMER_STATE_KEY, &json)?;
        Ok(())
    }
}
