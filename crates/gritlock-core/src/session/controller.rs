//! Session controller.
//!
//! Single owner of [`SessionState`]. Every method is synchronous; the
//! countdown advances only when the host calls [`SessionController::tick`]
//! for the countdown returned by [`SessionController::active_countdown`].
//!
//! ## State Transitions
//!
//! ```text
//! Work-Idle  -> Work-Running  -> Break-Running -> Work-Running -> ... -> Work-Idle
//!                                Break-Running -> Break-Idle (single press)
//! Break-*    -> Work-Idle (double press)
//! ```

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::countdown::{CountdownId, ManualScheduler, TickScheduler, TICK_PERIOD};
use super::state::{format_clock, progress_of, Phase, SessionSnapshot, SessionState};
use crate::error::ConfigError;
use crate::events::Event;
use crate::host::{BackgroundGrant, BackgroundHost, NoBackground};
use crate::shield::{AppSet, AppShield, MemoryShield};
use crate::storage::{MemoryFlagStore, RunningFlagStore};

/// Two presses closer together than this count as a double press.
pub const DOUBLE_PRESS_WINDOW_MS: i64 = 500;

/// External collaborators the controller signals.
pub struct Collaborators {
    pub shield: Box<dyn AppShield + Send>,
    pub flags: Box<dyn RunningFlagStore + Send>,
    pub host: Box<dyn BackgroundHost + Send>,
    pub scheduler: Box<dyn TickScheduler + Send>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            shield: Box::new(MemoryShield::new()),
            flags: Box::new(MemoryFlagStore::default()),
            host: Box::new(NoBackground),
            scheduler: Box::new(ManualScheduler::new()),
        }
    }
}

impl Collaborators {
    pub fn with_shield(mut self, shield: impl AppShield + Send + 'static) -> Self {
        self.shield = Box::new(shield);
        self
    }

    pub fn with_flags(mut self, flags: impl RunningFlagStore + Send + 'static) -> Self {
        self.flags = Box::new(flags);
        self
    }

    pub fn with_host(mut self, host: impl BackgroundHost + Send + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    pub fn with_scheduler(mut self, scheduler: impl TickScheduler + Send + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }
}

pub struct SessionController {
    config: SessionConfig,
    apps: AppSet,
    state: SessionState,
    countdown: Option<CountdownId>,
    next_countdown: u64,
    grant: Option<BackgroundGrant>,
    shield: Box<dyn AppShield + Send>,
    flags: Box<dyn RunningFlagStore + Send>,
    host: Box<dyn BackgroundHost + Send>,
    scheduler: Box<dyn TickScheduler + Send>,
    events: Vec<Event>,
}

impl SessionController {
    /// Create a controller in the Work-Idle state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `config` has a zero value.
    pub fn new(
        config: SessionConfig,
        apps: AppSet,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let Collaborators {
            shield,
            flags,
            host,
            scheduler,
        } = collaborators;
        Ok(Self {
            state: SessionState::initial(config.work_duration_secs),
            config,
            apps,
            countdown: None,
            next_countdown: 1,
            grant: None,
            shield,
            flags,
            host,
            scheduler,
            events: Vec::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn apps(&self) -> &AppSet {
        &self.apps
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn current_cycle(&self) -> u32 {
        self.state.current_cycle
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Configured length of the current phase.
    pub fn total_secs(&self) -> u64 {
        self.config.duration_secs(self.state.phase)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        progress_of(self.state.remaining_secs, self.total_secs())
    }

    /// The countdown whose ticks are currently honored.
    pub fn active_countdown(&self) -> Option<CountdownId> {
        self.countdown
    }

    pub fn background_grant(&self) -> Option<BackgroundGrant> {
        self.grant
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            total_secs: self.total_secs(),
            progress: self.progress(),
            current_cycle: self.state.current_cycle,
            total_cycles: self.config.total_cycles,
            running: self.state.running,
            clock: format_clock(self.state.remaining_secs),
            at: Utc::now(),
        }
    }

    /// Drain the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn on_primary_button_press(&mut self) {
        self.on_primary_button_press_at(Utc::now());
    }

    /// Handle a press that happened at `now`.
    ///
    /// A double press during a break abandons the session. Otherwise a press
    /// starts an idle countdown or stops a running break; it does nothing
    /// while a work countdown runs.
    pub fn on_primary_button_press_at(&mut self, now: DateTime<Utc>) {
        let previous = self.state.last_press.replace(now);
        let double_press = previous.is_some_and(|prev| {
            now.signed_duration_since(prev) < ChronoDuration::milliseconds(DOUBLE_PRESS_WINDOW_MS)
        });

        if double_press && self.state.phase == Phase::Break {
            info!(cycle = self.state.current_cycle, "double press during break, resetting session");
            self.cancel_countdown();
            self.state.phase = Phase::Work;
            self.reset_to_initial();
            self.unlock_apps();
            return;
        }

        match (self.countdown.is_some(), self.state.phase) {
            (false, _) => self.start_countdown(),
            (true, Phase::Break) => {
                info!(remaining_secs = self.state.remaining_secs, "break stopped early");
                self.cancel_countdown();
            }
            // Work cannot be paused from the button.
            (true, Phase::Work) => debug!("press ignored while work countdown runs"),
        }
    }

    /// Begin ticking the current phase from the in-memory remaining time.
    ///
    /// Any countdown already active is cancelled first.
    pub fn start_countdown(&mut self) {
        if self.countdown.is_some() {
            debug!("restarting active countdown");
            self.cancel_countdown();
        }

        self.state.running = true;
        self.persist_running(true);

        match self.state.phase {
            Phase::Work => self.lock_apps(),
            Phase::Break => self.unlock_apps(),
        }

        let id = CountdownId(self.next_countdown);
        self.next_countdown += 1;
        self.scheduler.schedule(id, TICK_PERIOD);
        self.countdown = Some(id);

        info!(
            %id,
            phase = %self.state.phase,
            cycle = self.state.current_cycle,
            remaining_secs = self.state.remaining_secs,
            "countdown started"
        );
        self.events.push(Event::CountdownStarted {
            countdown: id,
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            cycle: self.state.current_cycle,
            at: Utc::now(),
        });
    }

    /// Advance the running countdown by one second. Ignored when idle.
    pub fn tick(&mut self) {
        if self.countdown.is_none() {
            debug!("tick ignored, no countdown running");
            return;
        }

        if self.state.remaining_secs > 0 {
            self.state.remaining_secs -= 1;
            self.events.push(Event::Ticked {
                phase: self.state.phase,
                remaining_secs: self.state.remaining_secs,
                progress: self.progress(),
                at: Utc::now(),
            });
        }

        if self.state.remaining_secs == 0 {
            self.end_phase();
        }
    }

    fn end_phase(&mut self) {
        let finished = self.state.phase;
        info!(phase = %finished, cycle = self.state.current_cycle, "phase completed");
        self.events.push(Event::PhaseCompleted {
            phase: finished,
            cycle: self.state.current_cycle,
            at: Utc::now(),
        });

        match finished {
            Phase::Work => {
                self.cancel_countdown();
                self.unlock_apps();
                if self.config.has_break_after(self.state.current_cycle) {
                    self.state.phase = Phase::Break;
                    self.state.remaining_secs = self.config.break_duration_secs;
                    self.start_countdown();
                } else {
                    self.reset_to_initial();
                }
            }
            Phase::Break => {
                self.cancel_countdown();
                // Re-engaged before the cycle check, so a session that ends
                // here stays shielded.
                self.lock_apps();
                self.state.current_cycle += 1;
                self.events.push(Event::CycleAdvanced {
                    cycle: self.state.current_cycle,
                    total_cycles: self.config.total_cycles,
                    at: Utc::now(),
                });
                if self.state.current_cycle <= self.config.total_cycles {
                    self.state.phase = Phase::Work;
                    self.state.remaining_secs = self.config.work_duration_secs;
                    self.start_countdown();
                } else {
                    self.reset_to_initial();
                }
            }
        }
    }

    /// Stop the countdown, keeping remaining time and phase.
    ///
    /// Idempotent: a second call, or a call while idle, does nothing.
    pub fn cancel_countdown(&mut self) {
        let Some(id) = self.countdown.take() else {
            return;
        };

        self.scheduler.cancel(id);
        self.state.running = false;
        self.persist_running(false);
        self.release_background();

        debug!(%id, remaining_secs = self.state.remaining_secs, "countdown cancelled");
        self.events.push(Event::CountdownCancelled {
            countdown: id,
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        });
    }

    /// Back to Work-Idle at the first cycle with the full work duration.
    pub fn reset_to_initial(&mut self) {
        self.cancel_countdown();
        self.state.phase = Phase::Work;
        self.state.remaining_secs = self.config.work_duration_secs;
        self.state.current_cycle = 1;
        info!("session reset");
        self.events.push(Event::SessionReset { at: Utc::now() });
    }

    /// Replace the config and reset, discarding any countdown.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] and leaves the session untouched
    /// if `config` has a zero value.
    pub fn apply_config(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.reset_to_initial();
        self.events.push(Event::ConfigApplied {
            work_duration_secs: self.config.work_duration_secs,
            break_duration_secs: self.config.break_duration_secs,
            total_cycles: self.config.total_cycles,
            at: Utc::now(),
        });
        Ok(())
    }

    /// Replace the shielded app set. Takes effect the next time apps are blocked.
    pub fn set_apps(&mut self, apps: AppSet) {
        self.apps = apps;
    }

    /// Restart ticking if the persisted flag says a session was running.
    ///
    /// Ticks from the in-memory remaining time; time spent suspended is not
    /// subtracted. Does nothing while a countdown is already active.
    pub fn resume_if_persisted_running(&mut self) {
        if let Some(id) = self.countdown {
            debug!(%id, "countdown already active, nothing to resume");
            return;
        }
        match self.flags.running_flag() {
            Ok(true) => {
                info!(phase = %self.state.phase, "resuming persisted session");
                self.start_countdown();
            }
            Ok(false) => debug!("no persisted session to resume"),
            Err(e) => warn!(error = %e, "failed to read running flag"),
        }
    }

    pub fn on_enter_foreground(&mut self) {
        self.resume_if_persisted_running();
    }

    /// Ask the host to keep ticking while backgrounded. No-op when idle.
    pub fn on_enter_background(&mut self) {
        if self.countdown.is_none() {
            return;
        }
        self.release_background();
        match self.host.begin_background_execution() {
            Some(grant) => {
                debug!(?grant, "background execution granted");
                self.grant = Some(grant);
                self.events.push(Event::BackgroundGranted {
                    grant,
                    at: Utc::now(),
                });
            }
            None => debug!("host declined background execution"),
        }
    }

    /// The host revoked the background grant.
    pub fn on_background_expired(&mut self) {
        self.release_background();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn release_background(&mut self) {
        if let Some(grant) = self.grant.take() {
            self.host.end_background_execution(grant);
            self.events.push(Event::BackgroundReleased {
                grant,
                at: Utc::now(),
            });
        }
    }

    fn persist_running(&mut self, running: bool) {
        if let Err(e) = self.flags.set_running_flag(running) {
            warn!(error = %e, running, "failed to persist running flag");
        }
    }

    fn lock_apps(&mut self) {
        if self.apps.is_empty() {
            info!("No apps selected for locking");
            self.events.push(Event::ShieldSkipped { at: Utc::now() });
            return;
        }
        match self.shield.block(&self.apps) {
            Ok(()) => self.events.push(Event::ShieldEngaged {
                app_count: self.apps.len(),
                at: Utc::now(),
            }),
            Err(e) => warn!(error = %e, "failed to shield apps"),
        }
    }

    fn unlock_apps(&mut self) {
        match self.shield.unblock() {
            Ok(()) => self.events.push(Event::ShieldReleased { at: Utc::now() }),
            Err(e) => warn!(error = %e, "failed to release shield"),
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("apps", &self.apps)
            .field("state", &self.state)
            .field("countdown", &self.countdown)
            .field("grant", &self.grant)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ShieldError, StorageError};
    use crate::host::SimulatedHost;

    struct Harness {
        controller: SessionController,
        shield: MemoryShield,
        flags: MemoryFlagStore,
        scheduler: ManualScheduler,
        host: SimulatedHost,
    }

    fn harness(config: SessionConfig) -> Harness {
        harness_with_flag(config, false)
    }

    fn harness_with_flag(config: SessionConfig, running: bool) -> Harness {
        let shield = MemoryShield::new();
        let flags = MemoryFlagStore::new(running);
        let scheduler = ManualScheduler::new();
        let host = SimulatedHost::new();
        let apps: AppSet = ["com.social.feed"].into_iter().collect();
        let controller = SessionController::new(
            config,
            apps,
            Collaborators::default()
                .with_shield(shield.clone())
                .with_flags(flags.clone())
                .with_scheduler(scheduler.clone())
                .with_host(host.clone()),
        )
        .unwrap();
        Harness {
            controller,
            shield,
            flags,
            scheduler,
            host,
        }
    }

    fn small() -> SessionConfig {
        SessionConfig::new(3, 2, 2).unwrap()
    }

    fn ticks(c: &mut SessionController, n: u64) {
        for _ in 0..n {
            c.tick();
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-05T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn starts_work_idle() {
        let h = harness(small());
        let c = &h.controller;
        assert_eq!(c.phase(), Phase::Work);
        assert_eq!(c.remaining_secs(), 3);
        assert_eq!(c.current_cycle(), 1);
        assert!(!c.is_running());
        assert_eq!(c.progress(), 0.0);
        assert!(c.active_countdown().is_none());
    }

    #[test]
    fn first_press_starts_work_and_shields() {
        let mut h = harness(small());
        h.controller.on_primary_button_press_at(t0());

        assert!(h.controller.is_running());
        assert!(h.flags.get());
        assert!(h.shield.is_engaged());
        assert_eq!(h.scheduler.active().len(), 1);
    }

    #[test]
    fn press_during_running_work_is_ignored() {
        let mut h = harness(small());
        h.controller.on_primary_button_press_at(t0());
        h.controller.tick();
        let id = h.controller.active_countdown();

        h.controller
            .on_primary_button_press_at(t0() + ChronoDuration::seconds(5));

        assert_eq!(h.controller.active_countdown(), id);
        assert_eq!(h.controller.remaining_secs(), 2);
        assert!(h.controller.is_running());
    }

    #[test]
    fn work_end_moves_to_break_and_unshields() {
        let mut h = harness(small());
        h.controller.start_countdown();
        ticks(&mut h.controller, 3);

        assert_eq!(h.controller.phase(), Phase::Break);
        assert_eq!(h.controller.remaining_secs(), 2);
        assert!(h.controller.is_running());
        assert!(!h.shield.is_engaged());
        assert_eq!(h.scheduler.active().len(), 1);
    }

    #[test]
    fn single_press_during_break_stops_without_reset() {
        let mut h = harness(small());
        h.controller.start_countdown();
        ticks(&mut h.controller, 4);
        assert_eq!(h.controller.phase(), Phase::Break);
        assert_eq!(h.controller.remaining_secs(), 1);

        h.controller.on_primary_button_press_at(t0());

        assert!(!h.controller.is_running());
        assert!(!h.flags.get());
        assert_eq!(h.controller.phase(), Phase::Break);
        assert_eq!(h.controller.remaining_secs(), 1);
        assert_eq!(h.controller.progress(), 0.5);
        assert!(h.scheduler.active().is_empty());
    }

    #[test]
    fn double_press_during_break_resets_to_work_idle() {
        let mut h = harness(SessionConfig::new(3, 10, 3).unwrap());
        h.controller.start_countdown();
        ticks(&mut h.controller, 3 + 4);
        assert_eq!(h.controller.phase(), Phase::Break);

        h.controller.on_primary_button_press_at(t0());
        h.controller
            .on_primary_button_press_at(t0() + ChronoDuration::milliseconds(300));

        let c = &h.controller;
        assert_eq!(c.phase(), Phase::Work);
        assert!(!c.is_running());
        assert_eq!(c.current_cycle(), 1);
        assert_eq!(c.remaining_secs(), 3);
        assert_eq!(c.progress(), 0.0);
        assert!(!h.shield.is_engaged());
        assert!(h.scheduler.active().is_empty());
    }

    #[test]
    fn slow_second_press_during_break_restarts_break() {
        let mut h = harness(SessionConfig::new(3, 10, 3).unwrap());
        h.controller.start_countdown();
        ticks(&mut h.controller, 3 + 4);

        h.controller.on_primary_button_press_at(t0());
        h.controller
            .on_primary_button_press_at(t0() + ChronoDuration::milliseconds(500));

        assert_eq!(h.controller.phase(), Phase::Break);
        assert!(h.controller.is_running());
        assert_eq!(h.controller.remaining_secs(), 6);
    }

    #[test]
    fn double_press_during_work_acts_as_single_press() {
        let mut h = harness(small());
        h.controller.on_primary_button_press_at(t0());
        h.controller
            .on_primary_button_press_at(t0() + ChronoDuration::milliseconds(100));

        assert_eq!(h.controller.phase(), Phase::Work);
        assert!(h.controller.is_running());
        assert_eq!(h.scheduler.scheduled_total(), 1);
    }

    #[test]
    fn double_press_window_is_measured_press_to_press() {
        let mut h = harness(SessionConfig::new(1, 10, 3).unwrap());
        h.controller.start_countdown();
        h.controller.tick();
        assert_eq!(h.controller.phase(), Phase::Break);

        h.controller.on_primary_button_press_at(t0());
        assert!(!h.controller.is_running());
        h.controller
            .on_primary_button_press_at(t0() + ChronoDuration::seconds(2));
        assert!(h.controller.is_running());

        // 300ms after the previous press, two seconds after the first one.
        h.controller
            .on_primary_button_press_at(t0() + ChronoDuration::milliseconds(2300));
        assert_eq!(h.controller.phase(), Phase::Work);
        assert!(!h.controller.is_running());
        assert_eq!(h.controller.current_cycle(), 1);
    }

    #[test]
    fn ignored_press_still_updates_press_time() {
        let mut h = harness(SessionConfig::new(1, 10, 3).unwrap());
        h.controller.start_countdown();
        h.controller.on_primary_button_press_at(t0());
        assert_eq!(h.controller.state().last_press, Some(t0()));

        h.controller.tick();
        assert_eq!(h.controller.phase(), Phase::Break);
        h.controller
            .on_primary_button_press_at(t0() + ChronoDuration::milliseconds(400));

        assert_eq!(h.controller.phase(), Phase::Work);
        assert_eq!(h.controller.remaining_secs(), 1);
        assert!(!h.controller.is_running());
    }

    #[test]
    fn final_work_interval_resets_by_default() {
        let mut h = harness(small());
        h.controller.start_countdown();
        ticks(&mut h.controller, 3 + 2);
        assert_eq!(h.controller.phase(), Phase::Work);
        assert_eq!(h.controller.current_cycle(), 2);
        assert!(h.shield.is_engaged());

        ticks(&mut h.controller, 3);
        let c = &h.controller;
        assert_eq!(c.phase(), Phase::Work);
        assert_eq!(c.current_cycle(), 1);
        assert_eq!(c.remaining_secs(), 3);
        assert!(!c.is_running());
        assert!(!h.shield.is_engaged());
        assert!(!h.flags.get());
    }

    #[test]
    fn final_break_ends_session_and_leaves_shield_engaged() {
        let mut h = harness(small().with_break_after_final_cycle(true));
        h.controller.start_countdown();
        ticks(&mut h.controller, 3 + 2 + 3);
        assert_eq!(h.controller.phase(), Phase::Break);
        assert_eq!(h.controller.current_cycle(), 2);

        ticks(&mut h.controller, 2);
        let c = &h.controller;
        assert_eq!(c.phase(), Phase::Work);
        assert_eq!(c.current_cycle(), 1);
        assert!(!c.is_running());
        assert!(h.shield.is_engaged());
    }

    #[test]
    fn tick_while_idle_is_ignored() {
        let mut h = harness(small());
        h.controller.tick();
        assert_eq!(h.controller.remaining_secs(), 3);
        assert!(h.controller.take_events().is_empty());
    }

    #[test]
    fn cancel_twice_equals_cancel_once() {
        let mut h = harness(small());
        h.controller.start_countdown();
        h.controller.tick();
        h.controller.cancel_countdown();
        let once = (h.controller.state().clone(), h.flags.get(), h.scheduler.active());
        let events_once = h.controller.take_events().len();

        h.controller.cancel_countdown();
        let twice = (h.controller.state().clone(), h.flags.get(), h.scheduler.active());

        assert_eq!(once, twice);
        assert!(events_once > 0);
        assert!(h.controller.take_events().is_empty());
    }

    #[test]
    fn start_while_running_keeps_one_countdown() {
        let mut h = harness(small());
        h.controller.start_countdown();
        let first = h.controller.active_countdown().unwrap();
        h.controller.start_countdown();
        let second = h.controller.active_countdown().unwrap();

        assert_ne!(first, second);
        assert_eq!(h.scheduler.active(), vec![second]);
    }

    #[test]
    fn apply_config_resets_running_session() {
        let mut h = harness(SessionConfig::new(100, 5, 2).unwrap());
        h.controller.start_countdown();
        ticks(&mut h.controller, 58);
        assert_eq!(h.controller.remaining_secs(), 42);

        h.controller
            .apply_config(SessionConfig::new(600, 5, 2).unwrap())
            .unwrap();

        assert_eq!(h.controller.remaining_secs(), 600);
        assert_eq!(h.controller.progress(), 0.0);
        assert!(!h.controller.is_running());
        assert!(h.scheduler.active().is_empty());
    }

    #[test]
    fn apply_invalid_config_leaves_session_untouched() {
        let mut h = harness(small());
        h.controller.start_countdown();
        let bad = SessionConfig {
            work_duration_secs: 0,
            ..SessionConfig::default()
        };
        assert!(h.controller.apply_config(bad).is_err());
        assert!(h.controller.is_running());
        assert_eq!(h.controller.config(), &small());
    }

    #[test]
    fn resume_restarts_from_in_memory_time() {
        let mut h = harness_with_flag(small(), true);
        h.controller.resume_if_persisted_running();

        assert!(h.controller.is_running());
        assert_eq!(h.controller.remaining_secs(), 3);
        assert!(h.shield.is_engaged());
    }

    #[test]
    fn foreground_while_running_keeps_countdown() {
        let mut h = harness_with_flag(small(), true);
        h.controller.on_enter_foreground();
        let id = h.controller.active_countdown();
        h.controller.tick();
        h.controller.on_enter_background();
        h.controller.take_events();

        h.controller.on_enter_foreground();
        h.controller.on_enter_foreground();

        assert_eq!(h.controller.active_countdown(), id);
        assert_eq!(h.scheduler.scheduled_total(), 1);
        assert_eq!(h.controller.remaining_secs(), 2);
        assert_eq!(h.host.outstanding().len(), 1);
        assert!(h.controller.take_events().is_empty());
    }

    #[test]
    fn resume_without_flag_stays_idle() {
        let mut h = harness(small());
        h.controller.on_enter_foreground();
        assert!(!h.controller.is_running());
        assert_eq!(h.scheduler.scheduled_total(), 0);
    }

    #[test]
    fn resume_in_break_unshields() {
        let mut h = harness(small());
        h.controller.start_countdown();
        ticks(&mut h.controller, 3);
        // Suspended mid-break with the shield engaged and the flag still set.
        h.controller.cancel_countdown();
        h.flags.clone().set_running_flag(true).unwrap();
        h.shield.clone().block(h.controller.apps()).unwrap();

        h.controller.on_enter_foreground();

        assert_eq!(h.controller.phase(), Phase::Break);
        assert!(!h.shield.is_engaged());
    }

    #[test]
    fn background_grant_is_released_on_cancel() {
        let mut h = harness(small());
        h.controller.on_enter_background();
        assert!(h.host.outstanding().is_empty());

        h.controller.start_countdown();
        h.controller.on_enter_background();
        assert_eq!(h.host.outstanding().len(), 1);

        h.controller.on_enter_background();
        assert_eq!(h.host.outstanding().len(), 1);

        h.controller.cancel_countdown();
        assert!(h.host.outstanding().is_empty());
        assert!(h.controller.background_grant().is_none());
    }

    #[test]
    fn background_expiry_keeps_countdown() {
        let mut h = harness(small());
        h.controller.start_countdown();
        h.controller.on_enter_background();
        h.controller.on_background_expired();

        assert!(h.host.outstanding().is_empty());
        assert!(h.controller.is_running());
    }

    #[test]
    fn empty_app_set_skips_shield() {
        let mut h = harness(small());
        h.controller.set_apps(AppSet::new());
        h.controller.start_countdown();

        assert!(!h.shield.is_engaged());
        assert!(h
            .controller
            .take_events()
            .iter()
            .any(|e| matches!(e, Event::ShieldSkipped { .. })));
    }

    struct FailingShield;

    impl AppShield for FailingShield {
        fn block(&mut self, _apps: &AppSet) -> Result<(), ShieldError> {
            Err(ShieldError::NotAuthorized)
        }
        fn unblock(&mut self) -> Result<(), ShieldError> {
            Err(ShieldError::Store(StorageError::Locked))
        }
    }

    #[test]
    fn shield_failures_do_not_stop_the_timer() {
        let mut c = SessionController::new(
            small(),
            ["com.feed"].into_iter().collect(),
            Collaborators::default().with_shield(FailingShield),
        )
        .unwrap();
        c.start_countdown();
        ticks(&mut c, 3);
        assert_eq!(c.phase(), Phase::Break);
        assert!(c.is_running());
    }

    #[test]
    fn snapshot_reports_clock_and_progress() {
        let mut h = harness(SessionConfig::new(120, 5, 4).unwrap());
        h.controller.start_countdown();
        ticks(&mut h.controller, 30);

        let snap = h.controller.snapshot();
        assert_eq!(snap.clock, "01:30");
        assert_eq!(snap.progress, 0.25);
        assert_eq!(snap.total_secs, 120);
        assert_eq!(snap.total_cycles, 4);
        assert!(snap.running);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let bad = SessionConfig {
            total_cycles: 0,
            ..SessionConfig::default()
        };
        assert!(SessionController::new(bad, AppSet::new(), Collaborators::default()).is_err());
    }
}
