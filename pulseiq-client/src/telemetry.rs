//! Live telemetry simulator shared by every mounted view
//!
//! The hub runs at most one random-walk timer for the whole process. Views
//! hold a [`TelemetryLease`] while mounted; the first lease resets the
//! snapshot to its defaults and starts the timer, the last one dropped stops
//! it. Everyone reads the same snapshot through a watch channel.
//!
//! Publishing runs beside the timer, so a slow collector never holds up the
//! walk. Publishes still in flight are aborted when the simulator stops.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::backend::BackendApi;
use crate::scheduler::{PollingTask, TimerRegistry};
use crate::vitals::VitalsSnapshot;

#[derive(Default)]
struct HubState {
    leases: usize,
    task: Option<PollingTask>,
}

pub struct TelemetryHub {
    backend: Arc<dyn BackendApi>,
    timers: TimerRegistry,
    period: Duration,
    latest: Arc<watch::Sender<VitalsSnapshot>>,
    publishes: Arc<Mutex<JoinSet<()>>>,
    state: Mutex<HubState>,
}

impl TelemetryHub {
    pub fn new(backend: Arc<dyn BackendApi>, timers: TimerRegistry, period: Duration) -> Arc<Self> {
        let (latest, _) = watch::channel(VitalsSnapshot::default());
        Arc::new(Self {
            backend,
            timers,
            period,
            latest: Arc::new(latest),
            publishes: Arc::new(Mutex::new(JoinSet::new())),
            state: Mutex::new(HubState::default()),
        })
    }

    /// Register a mounted view; starts the simulator if it was stopped
    pub fn acquire(self: &Arc<Self>) -> TelemetryLease {
        let mut state = self.state.lock();
        state.leases += 1;
        if state.task.is_none() {
            self.latest.send_replace(VitalsSnapshot::default());
            state.task = Some(self.start());
            tracing::debug!(leases = state.leases, "telemetry simulator running");
        }
        TelemetryLease { hub: Arc::clone(self) }
    }

    fn release(&self) {
        let stopped = {
            let mut state = self.state.lock();
            state.leases = state.leases.saturating_sub(1);
            if state.leases == 0 {
                state.task.take()
            } else {
                None
            }
        };
        if let Some(task) = stopped {
            let timer = task.name();
            task.stop();
            self.publishes.lock().abort_all();
            tracing::debug!(timer, "telemetry simulator stopped");
        }
    }

    fn start(&self) -> PollingTask {
        let latest = Arc::clone(&self.latest);
        let backend = Arc::clone(&self.backend);
        let publishes = Arc::clone(&self.publishes);
        let mut rng = StdRng::from_entropy();

        self.timers.spawn_every("telemetry", self.period, false, move || {
            let next = latest.borrow().perturbed(&mut rng);
            latest.send_replace(next);

            let backend = Arc::clone(&backend);
            let mut in_flight = publishes.lock();
            // reap finished publishes
            while in_flight.try_join_next().is_some() {}
            in_flight.spawn(async move {
                if let Err(e) = backend.publish_vitals(next).await {
                    tracing::warn!(error = %e, error_code = e.code(), "failed to publish vitals");
                }
            });
            std::future::ready(())
        })
    }

    pub fn latest(&self) -> VitalsSnapshot {
        *self.latest.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<VitalsSnapshot> {
        self.latest.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().task.is_some()
    }

    pub fn leases(&self) -> usize {
        self.state.lock().leases
    }
}

/// Keeps the simulator alive while held
#[must_use = "dropping a TelemetryLease releases the simulator"]
pub struct TelemetryLease {
    hub: Arc<TelemetryHub>,
}

impl TelemetryLease {
    pub fn latest(&self) -> VitalsSnapshot {
        self.hub.latest()
    }

    pub fn subscribe(&self) -> watch::Receiver<VitalsSnapshot> {
        self.hub.subscribe()
    }
}

impl Drop for TelemetryLease {
    fn drop(&mut self) {
        self.hub.release();
    }
}
