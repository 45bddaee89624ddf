//! Time source for the timing assertions.
//!
//! [`TokioClock`] follows tokio's clock, so `#[tokio::test(start_paused = true)]` makes it
//! deterministic. [`FakeClock`] is a virtual clock driven by the test itself.
use async_trait::async_trait;
use futures::channel::oneshot;
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

#[async_trait]
pub trait Clock: Send + Sync {
    /// Resolves once `duration` has passed on this clock.
    async fn delay(&self, duration: Duration);

    fn start_timer(&self) -> Box<dyn Timer>;
}

/// Measures the time passed since it was started.
pub trait Timer: Send {
    fn elapsed(&self) -> Duration;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

struct TokioTimer(tokio::time::Instant);

impl Timer for TokioTimer {
    fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

#[async_trait]
impl Clock for TokioClock {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn start_timer(&self) -> Box<dyn Timer> {
        Box::new(TokioTimer(tokio::time::Instant::now()))
    }
}

#[derive(Default)]
struct FakeClockState {
    now: Duration,
    waiters: Vec<(Duration, oneshot::Sender<()>)>,
}

impl FakeClockState {
    fn wake(&mut self, until: Duration) {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waiters).into_iter().partition(|(deadline, _)| *deadline <= until);
        self.waiters = pending;

        for (_, waiter) in due {
            let _ = waiter.send(());
        }
    }
}

/// A clock whose time only moves when the test says so.
///
/// ```
/// use fluent_assertions::*;
/// use std::time::Duration;
///
/// let clock = FakeClock::new();
/// let timer = clock.start_timer();
///
/// clock.advance(Duration::from_secs(3));
/// timer.elapsed().should().be(Duration::from_secs(3));
/// ```
#[derive(Clone, Default)]
pub struct FakeClock {
    state: Arc<Mutex<FakeClockState>>,
}

impl FakeClock {
    pub fn new() -> Self {
        FakeClock::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn now(&self) -> Duration {
        self.state().now
    }

    /// Moves time forward, completing the delays that are due.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state();
        state.now += duration;
        let now = state.now;
        state.wake(now);

        tracing::trace!(?now, pending = state.waiters.len(), "[FakeClock::advance()] time advanced");
    }

    /// Completes every pending delay, moving time to the latest deadline.
    pub fn complete(&self) {
        let mut state = self.state();
        if let Some(latest) = state.waiters.iter().map(|(deadline, _)| *deadline).max() {
            state.now = state.now.max(latest);
        }
        state.wake(Duration::MAX);
    }

    pub fn pending_delays(&self) -> usize {
        self.state().waiters.len()
    }
}

struct FakeTimer {
    clock: FakeClock,
    started: Duration,
}

impl Timer for FakeTimer {
    fn elapsed(&self) -> Duration {
        self.clock.now() - self.started
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn delay(&self, duration: Duration) {
        let receiver = {
            let mut state = self.state();
            if duration.is_zero() {
                return;
            }

            let deadline = state.now.checked_add(duration);
            deadline.map(|deadline| {
                let (sender, receiver) = oneshot::channel();
                state.waiters.push((deadline, sender));
                receiver
            })
        };

        // A deadline past the end of time is never reached, and a dropped clock never completes the delay.
        let completed = match receiver {
            Some(receiver) => receiver.await.is_ok(),
            None => false,
        };
        if !completed {
            futures::future::pending::<()>().await;
        }
    }

    fn start_timer(&self) -> Box<dyn Timer> {
        Box::new(FakeTimer {
            clock: self.clone(),
            started: self.now(),
        })
    }
}
