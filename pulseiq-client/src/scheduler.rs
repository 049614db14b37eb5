//! Periodic task ownership
//!
//! Every recurring poller in the client is a [`PollingTask`]. The handle is the
//! only way to keep a timer alive: dropping it aborts the task, cancels any
//! request in flight and removes it from the [`TimerRegistry`] count.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Shortest period a timer runs with
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Counts live polling timers for the whole client
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    active: Arc<AtomicUsize>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers started and not yet stopped
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Run `tick` every `period` until the returned handle is dropped
    ///
    /// With `immediate` the first tick runs right away, otherwise one full
    /// period passes first. Ticks never overlap: a slow tick delays the next.
    /// A period below [`MIN_PERIOD`] is raised to it.
    pub fn spawn_every<F, Fut>(
        &self,
        name: &'static str,
        period: Duration,
        immediate: bool,
        mut tick: F,
    ) -> PollingTask
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = if period < MIN_PERIOD {
            tracing::warn!(timer = name, ?period, "polling period too short, using minimum");
            MIN_PERIOD
        } else {
            period
        };
        let start = if immediate { Instant::now() } else { Instant::now() + period };
        self.active.fetch_add(1, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick().await;
            }
        });

        tracing::debug!(timer = name, ?period, "polling timer started");
        PollingTask { name, handle, active: Arc::clone(&self.active) }
    }
}

/// Owned handle of one running timer
#[must_use = "dropping a PollingTask stops it"]
pub struct PollingTask {
    name: &'static str,
    handle: JoinHandle<()>,
    active: Arc<AtomicUsize>,
}

impl PollingTask {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.handle.abort();
        self.active.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(timer = self.name, "polling timer stopped");
    }
}

impl std::fmt::Debug for PollingTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingTask").field("name", &self.name).finish()
    }
}
