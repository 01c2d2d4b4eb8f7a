use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::host::BackgroundGrant;
use crate::session::{CountdownId, Phase, SessionSnapshot};

/// Every state change in the controller produces an Event.
/// The presentation layer polls for events or subscribes through the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        countdown: CountdownId,
        phase: Phase,
        remaining_secs: u64,
        cycle: u32,
        at: DateTime<Utc>,
    },
    CountdownCancelled {
        countdown: CountdownId,
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    Ticked {
        phase: Phase,
        remaining_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase: Phase,
        cycle: u32,
        at: DateTime<Utc>,
    },
    CycleAdvanced {
        cycle: u32,
        total_cycles: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    ConfigApplied {
        work_duration_secs: u64,
        break_duration_secs: u64,
        total_cycles: u32,
        at: DateTime<Utc>,
    },
    ShieldEngaged {
        app_count: usize,
        at: DateTime<Utc>,
    },
    ShieldReleased {
        at: DateTime<Utc>,
    },
    /// Blocking was requested with no apps configured.
    ShieldSkipped {
        at: DateTime<Utc>,
    },
    BackgroundGranted {
        grant: BackgroundGrant,
        at: DateTime<Utc>,
    },
    BackgroundReleased {
        grant: BackgroundGrant,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        snapshot: SessionSnapshot,
    },
}

impl Event {
    /// Short machine name of the variant, as used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::CountdownStarted { .. } => "countdown_started",
            Event::CountdownCancelled { .. } => "countdown_cancelled",
            Event::Ticked { .. } => "ticked",
            Event::PhaseCompleted { .. } => "phase_completed",
            Event::CycleAdvanced { .. } => "cycle_advanced",
            Event::SessionReset { .. } => "session_reset",
            Event::ConfigApplied { .. } => "config_applied",
            Event::ShieldEngaged { .. } => "shield_engaged",
            Event::ShieldReleased { .. } => "shield_released",
            Event::ShieldSkipped { .. } => "shield_skipped",
            Event::BackgroundGranted { .. } => "background_granted",
            Event::BackgroundReleased { .. } => "background_released",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::PhaseCompleted {
            phase: Phase::Work,
            cycle: 2,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PhaseCompleted");
        assert_eq!(json["phase"], "work");
        assert_eq!(event.kind(), "phase_completed");
    }
}
