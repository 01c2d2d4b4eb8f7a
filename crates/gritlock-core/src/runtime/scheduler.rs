//! Tokio-backed tick scheduler.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

use crate::session::{CountdownId, TickScheduler};

/// Spawns one interval task per countdown. Each tick sends the countdown id
/// to the session actor, which drops ids that are no longer active.
///
/// Must be used from within a tokio runtime.
pub struct IntervalScheduler {
    ticks: mpsc::UnboundedSender<CountdownId>,
    active: Option<(CountdownId, JoinHandle<()>)>,
    period_override: Option<Duration>,
}

impl IntervalScheduler {
    pub fn new(ticks: mpsc::UnboundedSender<CountdownId>) -> Self {
        Self {
            ticks,
            active: None,
            period_override: None,
        }
    }

    /// Tick every `period` regardless of what the controller asks for.
    /// Used for demos and dry runs with a faster clock.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period_override = Some(period);
        self
    }

    pub fn active(&self) -> Option<CountdownId> {
        self.active.as_ref().map(|(id, _)| *id)
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule(&mut self, id: CountdownId, period: Duration) {
        if let Some((previous, task)) = self.active.take() {
            trace!(%previous, "aborting countdown task replaced by a new schedule");
            task.abort();
        }

        let period = self.period_override.unwrap_or(period);
        let ticks = self.ticks.clone();
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            // A suspended process does not catch up on missed seconds.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(id).is_err() {
                    break;
                }
            }
        });
        self.active = Some((id, task));
    }

    fn cancel(&mut self, id: CountdownId) {
        if self.active() == Some(id) {
            if let Some((_, task)) = self.active.take() {
                task.abort();
            }
        }
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        if let Some((_, task)) = self.active.take() {
            task.abort();
        }
    }
}
