//! Countdown scheduling.
//!
//! The controller never sleeps. It asks a [`TickScheduler`] to call back once
//! per period and identifies each countdown with a fresh [`CountdownId`], so a
//! host can drop callbacks that belong to a countdown that was already
//! cancelled.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Period between two ticks of a running countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Identifies one scheduled countdown. Never reused within a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountdownId(pub u64);

impl std::fmt::Display for CountdownId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "countdown-{}", self.0)
    }
}

/// Recurring callback source.
///
/// Implementations deliver `tick()` for `id` every `period` until
/// `cancel(id)`. Cancelling an id that is not scheduled is a no-op.
pub trait TickScheduler {
    fn schedule(&mut self, id: CountdownId, period: Duration);
    fn cancel(&mut self, id: CountdownId);
}

/// Scheduler for hosts that call `tick()` themselves.
///
/// Clones share state, so a test or host can keep one clone to observe which
/// countdown is active after handing the other to the controller.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

#[derive(Debug, Default)]
struct ManualInner {
    active: Vec<CountdownId>,
    scheduled_total: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids currently scheduled, oldest first.
    pub fn active(&self) -> Vec<CountdownId> {
        self.inner
            .lock()
            .map(|inner| inner.active.clone())
            .unwrap_or_default()
    }

    /// How many countdowns were ever scheduled.
    pub fn scheduled_total(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.scheduled_total)
            .unwrap_or_default()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, id: CountdownId, _period: Duration) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.active.push(id);
            inner.scheduled_total += 1;
        }
    }

    fn cancel(&mut self, id: CountdownId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.active.retain(|active| *active != id);
        }
    }
}
