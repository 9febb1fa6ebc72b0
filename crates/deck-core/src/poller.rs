//! Fixed-interval poller
//!
//! Runs a fetch on a tokio interval and delivers each outcome over a
//! bounded channel. A failed cycle is reported and the loop carries on.
//! Missed ticks are delayed, never replayed as a burst.
//!
//! Stopping (explicitly or by dropping the [`PollHandle`]) ends the loop.
//! A fetch still in flight at that point is abandoned and its result is
//! never delivered.

use crate::error::{DeckError, Result};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Outcome of one poll cycle
#[derive(Debug)]
pub enum PollEvent<T> {
    /// Fresh data
    Snapshot(T),
    /// The cycle failed; polling continues
    Failed(DeckError),
}

/// Handle to a running poll loop
#[derive(Debug)]
pub struct PollHandle {
    stop_tx: watch::Sender<bool>,
    stopped: Arc<AtomicBool>,
    cycles: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling; idempotent
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            tracing::debug!(cycles = self.cycles(), "poller stopping");
        }
        let _ = self.stop_tx.send(true);
    }

    /// Whether [`Self::stop`] has been called
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Completed cycles so far
    #[inline]
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Stop and wait for the loop to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Shortest period the poller accepts; shorter ones are raised to it
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Poll loop builder
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    period: Duration,
    buffer: usize,
}

impl Poller {
    /// Poller with the given period and a small event buffer
    ///
    /// Periods below [`MIN_PERIOD`] (including zero) are clamped to it.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            buffer: 4,
        }
    }

    /// With event channel capacity
    #[must_use]
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    /// Spawn with default settings
    pub fn spawn<T, F, Fut>(period: Duration, fetch: F) -> (PollHandle, mpsc::Receiver<PollEvent<T>>)
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send,
    {
        Self::new(period).start(fetch)
    }

    /// Start the loop on the current tokio runtime
    ///
    /// The first fetch runs immediately.
    pub fn start<T, F, Fut>(self, mut fetch: F) -> (PollHandle, mpsc::Receiver<PollEvent<T>>)
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send,
    {
        let (events_tx, events_rx) = mpsc::channel(self.buffer);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let stopped = Arc::new(AtomicBool::new(false));
        let cycles = Arc::new(AtomicU64::new(0));

        let period = self.period;
        let loop_stopped = Arc::clone(&stopped);
        let loop_cycles = Arc::clone(&cycles);

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                let outcome = tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    outcome = fetch() => outcome,
                };

                if loop_stopped.load(Ordering::SeqCst) {
                    break;
                }
                let cycle = loop_cycles.fetch_add(1, Ordering::SeqCst) + 1;

                let event = match outcome {
                    Ok(value) => PollEvent::Snapshot(value),
                    Err(err) => {
                        tracing::warn!(cycle, error = %err, "poll cycle failed");
                        PollEvent::Failed(err)
                    }
                };

                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    sent = events_tx.send(event) => {
                        if sent.is_err() {
                            tracing::debug!("poll receiver dropped");
                            break;
                        }
                    }
                }
            }
        });

        let handle = PollHandle {
            stop_tx,
            stopped,
            cycles,
            task: Some(task),
        };
        (handle, events_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use tokio::time::{sleep, Instant};

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn emits_on_each_tick() {
        let calls = counter();
        let c = Arc::clone(&calls);
        let started = Instant::now();

        let (handle, mut rx) = Poller::spawn(Duration::from_secs(5), move || {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, DeckError>(n) }
        });

        for expected in 1..=3 {
            match rx.recv().await.unwrap() {
                PollEvent::Snapshot(n) => assert_eq!(n, expected),
                PollEvent::Failed(e) => panic!("unexpected failure: {e}"),
            }
        }
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_loop() {
        let calls = counter();
        let c = Arc::clone(&calls);

        let (handle, mut rx) = Poller::spawn(Duration::from_secs(1), move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n % 2 == 0 {
                    Err(DeckError::Transport("connection refused".into()))
                } else {
                    Ok::<_, DeckError>(n)
                }
            }
        });

        assert!(matches!(rx.recv().await, Some(PollEvent::Failed(_))));
        assert!(matches!(rx.recv().await, Some(PollEvent::Snapshot(1))));
        assert!(matches!(rx.recv().await, Some(PollEvent::Failed(_))));
        assert!(matches!(rx.recv().await, Some(PollEvent::Snapshot(3))));
        assert_eq!(handle.cycles(), 4);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_result_after_stop_is_discarded() {
        let (handle, mut rx) = Poller::spawn(Duration::from_secs(5), || async {
            sleep(Duration::from_secs(3)).await;
            Ok::<_, DeckError>(())
        });

        sleep(Duration::from_secs(1)).await;
        handle.stop();
        assert!(handle.is_stopped());

        assert!(rx.recv().await.is_none());
        assert_eq!(handle.cycles(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_polling() {
        let calls = counter();
        let c = Arc::clone(&calls);
        let (handle, mut rx) = Poller::spawn(Duration::from_secs(5), move || {
            c.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, DeckError>(()) }
        });

        assert!(rx.recv().await.is_some());
        drop(handle);

        while rx.recv().await.is_some() {}
        let seen = calls.load(Ordering::SeqCst);
        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_delays_next_tick() {
        let started = Instant::now();
        let (handle, mut rx) = Poller::new(Duration::from_secs(2))
            .with_buffer(1)
            .start(move || async {
                sleep(Duration::from_secs(7)).await;
                Ok::<_, DeckError>(Instant::now())
            });

        let first = match rx.recv().await {
            Some(PollEvent::Snapshot(at)) => at,
            other => panic!("expected snapshot, got {other:?}"),
        };
        let second = match rx.recv().await {
            Some(PollEvent::Snapshot(at)) => at,
            other => panic!("expected snapshot, got {other:?}"),
        };

        assert_eq!(first - started, Duration::from_secs(7));
        assert_eq!(second - first, Duration::from_secs(7));
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_clamped() {
        let started = Instant::now();
        let (handle, mut rx) = Poller::spawn(Duration::ZERO, || async { Ok::<_, DeckError>(()) });

        for _ in 0..3 {
            assert!(matches!(rx.recv().await, Some(PollEvent::Snapshot(()))));
        }
        assert_eq!(started.elapsed(), MIN_PERIOD * 2);
        handle.shutdown().await;
    }
}
