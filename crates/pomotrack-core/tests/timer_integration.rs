//! Integration tests for the timer engine.
//!
//! Drives full work/break cycles against a SQLite-backed history and checks
//! tick cancellation with a real Tokio ticker.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use pomotrack_core::clock::MINUTE_MS;
use pomotrack_core::{
    Clock, Event, FixedClock, HistoryAggregator, HistoryStore, ManualTicker, Phase, SqliteStore,
    TimerEngine, TimerStatus, Timestamp, TokioTicker,
};

const T0: i64 = 1_700_000_000_000;

fn ts(ms: i64) -> Timestamp {
    Timestamp::from_millis(ms)
}

#[test]
fn test_four_cycles_end_in_long_break() {
    let clock = Arc::new(FixedClock::new(ts(T0)));
    let history = HistoryStore::new(SqliteStore::open_memory().unwrap());
    let mut engine = TimerEngine::new(clock.clone(), history, ManualTicker::new());

    engine.start();
    let mut recorded = Vec::new();
    let mut phases = Vec::new();

    for _ in 0..4 {
        // Work phase runs out.
        clock.advance(Phase::Work.duration_ms() + 100);
        let outcome = engine.tick();
        recorded.push(clock.now());
        assert!(matches!(
            outcome.completed,
            Some(Event::PhaseCompleted { finished: Phase::Work, recorded: true, .. })
        ));
        phases.push(engine.phase());

        if engine.phase() == Phase::ShortBreak {
            clock.advance(Phase::ShortBreak.duration_ms() + 100);
            engine.tick();
            assert_eq!(engine.phase(), Phase::Work);
        }
    }

    assert_eq!(
        phases,
        vec![Phase::ShortBreak, Phase::ShortBreak, Phase::ShortBreak, Phase::LongBreak]
    );
    assert_eq!(engine.cycles_since_long_break(), 0);
    assert_eq!(engine.remaining_display().to_string(), "15:00");
    assert_eq!(engine.history().load(), recorded);

    // Long break hands back to work, and the counter starts over.
    clock.advance(Phase::LongBreak.duration_ms());
    engine.tick();
    assert_eq!(engine.phase(), Phase::Work);
    clock.advance(Phase::Work.duration_ms());
    engine.tick();
    assert_eq!(engine.phase(), Phase::ShortBreak);
    assert_eq!(engine.cycles_since_long_break(), 1);
}

#[test]
fn test_pause_resume_shifts_completion() {
    let clock = Arc::new(FixedClock::new(ts(T0)));
    let history = HistoryStore::new(SqliteStore::open_memory().unwrap());
    let mut engine = TimerEngine::new(clock.clone(), history, ManualTicker::new());

    engine.start();
    clock.advance(15 * MINUTE_MS);
    engine.pause();
    clock.advance(5 * MINUTE_MS);
    engine.start();

    // 25 minutes of work have not elapsed yet at 00:29.
    clock.set(ts(T0 + 29 * MINUTE_MS));
    assert!(engine.tick().completed.is_none());
    assert_eq!(engine.remaining_display().to_string(), "1:00");

    clock.set(ts(T0 + 30 * MINUTE_MS));
    assert!(engine.tick().completed.is_some());
    assert_eq!(engine.history().load(), vec![ts(T0 + 30 * MINUTE_MS)]);
}

#[test]
fn test_completed_sessions_feed_daily_count() {
    let start_of_today = Timestamp::from(Local.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).earliest().unwrap());
    let clock = Arc::new(FixedClock::new(start_of_today.add_millis(9 * 60 * MINUTE_MS)));
    let history = HistoryStore::new(SqliteStore::open_memory().unwrap());
    let mut engine = TimerEngine::new(clock.clone(), history, ManualTicker::new());

    engine.start();
    clock.advance(Phase::Work.duration_ms());
    engine.tick();
    clock.advance(Phase::ShortBreak.duration_ms());
    engine.tick();
    clock.advance(Phase::Work.duration_ms());
    engine.tick();

    let progress = HistoryAggregator::new().count_today(&engine.history().load(), clock.now());
    assert_eq!(progress.count, 2);
    assert_eq!(progress.percent, 50.0);
}

#[test]
fn test_independent_engines_do_not_share_state() {
    let clock = Arc::new(FixedClock::new(ts(T0)));
    let mut a = TimerEngine::new(
        clock.clone(),
        HistoryStore::new(SqliteStore::open_memory().unwrap()),
        ManualTicker::new(),
    );
    let b = TimerEngine::new(
        clock.clone(),
        HistoryStore::new(SqliteStore::open_memory().unwrap()),
        ManualTicker::new(),
    );
    a.start();
    assert_eq!(a.status(), TimerStatus::Running);
    assert_eq!(b.status(), TimerStatus::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_no_ticks_apply_after_pause() {
    let (ticker, mut rx) = TokioTicker::new();
    let clock = Arc::new(FixedClock::new(ts(T0)));
    let history = HistoryStore::new(SqliteStore::open_memory().unwrap());
    let mut engine = TimerEngine::new(clock.clone(), history, ticker);

    engine.start();
    for _ in 0..2 {
        let handle = rx.recv().await.unwrap();
        clock.advance(500);
        assert!(engine.on_scheduled_tick(handle).is_some());
    }

    // Let another tick reach the channel before pausing.
    tokio::time::sleep(Duration::from_millis(600)).await;
    engine.pause();
    let frozen = engine.state().clone();

    clock.advance(60 * MINUTE_MS);
    while let Ok(handle) = rx.try_recv() {
        assert!(engine.on_scheduled_tick(handle).is_none());
    }
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(engine.state(), &frozen);
    assert!(engine.history().load().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_tokio_ticks() {
    let (ticker, mut rx) = TokioTicker::new();
    let clock = Arc::new(FixedClock::new(ts(T0)));
    let mut engine = TimerEngine::new(
        clock.clone(),
        HistoryStore::new(SqliteStore::open_memory().unwrap()),
        ticker,
    );

    engine.start();
    let handle = rx.recv().await.unwrap();
    engine.stop();

    assert!(engine.on_scheduled_tick(handle).is_none());
    tokio::time::sleep(Duration::from_secs(3)).await;
    while let Ok(stale) = rx.try_recv() {
        assert_eq!(stale, handle);
        assert!(engine.on_scheduled_tick(stale).is_none());
    }
    assert_eq!(engine.status(), TimerStatus::Stopped);
}
