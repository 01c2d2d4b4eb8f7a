//! Extended-execution grants while the host is backgrounded.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Token for one best-effort background execution grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackgroundGrant(pub u64);

/// Host platform that can keep the process ticking briefly in the background.
pub trait BackgroundHost {
    /// Ask for a grant. `None` when the host declines.
    fn begin_background_execution(&mut self) -> Option<BackgroundGrant>;

    fn end_background_execution(&mut self, grant: BackgroundGrant);
}

/// Host without background execution. Every request is declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackground;

impl BackgroundHost for NoBackground {
    fn begin_background_execution(&mut self) -> Option<BackgroundGrant> {
        None
    }

    fn end_background_execution(&mut self, _grant: BackgroundGrant) {}
}

/// Host that always grants. Clones share the set of outstanding grants.
#[derive(Debug, Clone, Default)]
pub struct SimulatedHost {
    inner: Arc<Mutex<SimulatedInner>>,
}

#[derive(Debug, Default)]
struct SimulatedInner {
    next: u64,
    outstanding: Vec<BackgroundGrant>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding(&self) -> Vec<BackgroundGrant> {
        self.inner
            .lock()
            .map(|inner| inner.outstanding.clone())
            .unwrap_or_default()
    }
}

impl BackgroundHost for SimulatedHost {
    fn begin_background_execution(&mut self) -> Option<BackgroundGrant> {
        let mut inner = self.inner.lock().ok()?;
        inner.next += 1;
        let grant = BackgroundGrant(inner.next);
        inner.outstanding.push(grant);
        Some(grant)
    }

    fn end_background_execution(&mut self, grant: BackgroundGrant) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.outstanding.retain(|g| *g != grant);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_host_hands_out_distinct_grants() {
        let observer = SimulatedHost::new();
        let mut host = observer.clone();

        let a = host.begin_background_execution().unwrap();
        let b = host.begin_background_execution().unwrap();
        assert_ne!(a, b);

        host.end_background_execution(a);
        assert_eq!(observer.outstanding(), vec![b]);
    }

    #[test]
    fn no_background_declines() {
        assert!(NoBackground.begin_background_execution().is_none());
    }
}
