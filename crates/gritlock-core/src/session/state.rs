use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable session state. Only [`SessionController`](super::SessionController)
/// writes to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub remaining_secs: u64,
    /// 1-based round counter.
    pub current_cycle: u32,
    pub running: bool,
    /// Time of the previous primary-button press, if any.
    pub last_press: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Work phase, full work duration, first cycle, idle.
    pub fn initial(work_duration_secs: u64) -> Self {
        Self {
            phase: Phase::Work,
            remaining_secs: work_duration_secs,
            current_cycle: 1,
            running: false,
            last_press: None,
        }
    }
}

/// Elapsed fraction of a phase, clamped to `[0.0, 1.0]`.
pub fn progress_of(remaining_secs: u64, total_secs: u64) -> f64 {
    if total_secs == 0 {
        return 0.0;
    }
    let elapsed = total_secs.saturating_sub(remaining_secs);
    (elapsed as f64 / total_secs as f64).clamp(0.0, 1.0)
}

/// Render seconds as `MM:SS`. Minutes keep counting past 59.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Read-only view of the session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub progress: f64,
    pub current_cycle: u32,
    pub total_cycles: u32,
    pub running: bool,
    pub clock: String,
    pub at: DateTime<Utc>,
}
