use serde::{Deserialize, Serialize};

use super::state::Phase;
use crate::error::ConfigError;

/// Interval lengths and round count for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_work_duration_secs")]
    pub work_duration_secs: u64,
    #[serde(default = "default_break_duration_secs")]
    pub break_duration_secs: u64,
    #[serde(default = "default_total_cycles")]
    pub total_cycles: u32,
    /// Take one more break after the last work interval before resetting.
    #[serde(default)]
    pub break_after_final_cycle: bool,
}

fn default_work_duration_secs() -> u64 {
    1500
}
fn default_break_duration_secs() -> u64 {
    300
}
fn default_total_cycles() -> u32 {
    4
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_duration_secs: default_work_duration_secs(),
            break_duration_secs: default_break_duration_secs(),
            total_cycles: default_total_cycles(),
            break_after_final_cycle: false,
        }
    }
}

impl SessionConfig {
    /// Build a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any value is zero.
    pub fn new(
        work_duration_secs: u64,
        break_duration_secs: u64,
        total_cycles: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            work_duration_secs,
            break_duration_secs,
            total_cycles,
            break_after_final_cycle: false,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_break_after_final_cycle(mut self, enabled: bool) -> Self {
        self.break_after_final_cycle = enabled;
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first zero field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |key: &str, value: u64| {
            if value == 0 {
                Err(ConfigError::InvalidValue {
                    key: format!("session.{key}"),
                    message: "must be greater than zero".into(),
                })
            } else {
                Ok(())
            }
        };
        positive("work_duration_secs", self.work_duration_secs)?;
        positive("break_duration_secs", self.break_duration_secs)?;
        positive("total_cycles", u64::from(self.total_cycles))
    }

    /// Configured length of `phase` in seconds.
    pub fn duration_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_duration_secs,
            Phase::Break => self.break_duration_secs,
        }
    }

    /// Whether finishing the work interval of `cycle` leads into a break.
    pub fn has_break_after(&self, cycle: u32) -> bool {
        if self.break_after_final_cycle {
            cycle <= self.total_cycles
        } else {
            cycle < self.total_cycles
        }
    }
}
