//! Cancellable repeating tick.
//!
//! The engine asks a [`Ticker`] for a repeating tick when it starts running
//! and cancels it on pause and stop. Every tick carries the [`TickHandle`]
//! it was scheduled under; the engine drops ticks whose handle is no longer
//! active, so a tick that was already in flight when `cancel` ran cannot
//! touch state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one scheduled repeating tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait Ticker {
    /// Start delivering ticks every `period`.
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle;

    /// Stop delivering ticks for `handle`. Unknown handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

#[derive(Debug, Default)]
struct ManualTickerState {
    next_id: u64,
    active: HashMap<TickHandle, Duration>,
    cancelled: Vec<TickHandle>,
}

/// Ticker that only hands out handles; the host decides when to tick.
///
/// Used by one-shot hosts such as the CLI, and by tests to observe
/// scheduling. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    state: Arc<Mutex<ManualTickerState>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ManualTickerState) -> R) -> R {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    pub fn is_active(&self, handle: TickHandle) -> bool {
        self.with_state(|s| s.active.contains_key(&handle))
    }

    pub fn active_count(&self) -> usize {
        self.with_state(|s| s.active.len())
    }

    pub fn period_of(&self, handle: TickHandle) -> Option<Duration> {
        self.with_state(|s| s.active.get(&handle).copied())
    }

    pub fn cancelled(&self) -> Vec<TickHandle> {
        self.with_state(|s| s.cancelled.clone())
    }
}

impl Ticker for ManualTicker {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle {
        self.with_state(|s| {
            s.next_id += 1;
            let handle = TickHandle(s.next_id);
            s.active.insert(handle, period);
            handle
        })
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.with_state(|s| {
            if s.active.remove(&handle).is_some() {
                s.cancelled.push(handle);
            }
        });
    }
}

/// Ticker backed by Tokio interval tasks.
///
/// Each schedule spawns a task that sends its handle on the channel
/// returned by [`TokioTicker::new`] every period. `cancel` aborts the task.
/// Must be used from within a Tokio runtime.
pub struct TokioTicker {
    tx: mpsc::UnboundedSender<TickHandle>,
    tasks: HashMap<TickHandle, JoinHandle<()>>,
    next_id: u64,
}

impl TokioTicker {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickHandle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = Self {
            tx,
            tasks: HashMap::new(),
            next_id: 0,
        };
        (ticker, rx)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Ticker for TokioTicker {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick of a Tokio interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(handle).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(handle, task);
        tracing::debug!(handle = handle.id(), period_ms = period.as_millis() as u64, "tick scheduled");
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            tracing::debug!(handle = handle.id(), "tick cancelled");
        }
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_ticker_tracks_active_handles() {
        let mut ticker = ManualTicker::new();
        let observer = ticker.clone();
        let a = ticker.schedule_repeating(Duration::from_millis(500));
        let b = ticker.schedule_repeating(Duration::from_millis(250));
        assert_ne!(a, b);
        assert_eq!(observer.active_count(), 2);
        assert_eq!(observer.period_of(b), Some(Duration::from_millis(250)));

        ticker.cancel(a);
        ticker.cancel(a);
        assert!(!observer.is_active(a));
        assert!(observer.is_active(b));
        assert_eq!(observer.cancelled(), vec![a]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_delivers_until_cancelled() {
        let (mut ticker, mut rx) = TokioTicker::new();
        let handle = ticker.schedule_repeating(Duration::from_millis(500));

        tokio::time::sleep(Duration::from_millis(1_600)).await;
        let mut delivered = 0;
        while let Ok(h) = rx.try_recv() {
            assert_eq!(h, handle);
            delivered += 1;
        }
        assert_eq!(delivered, 3);

        ticker.cancel(handle);
        assert_eq!(ticker.active_count(), 0);
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert!(rx.try_recv().is_err());
    }
}
