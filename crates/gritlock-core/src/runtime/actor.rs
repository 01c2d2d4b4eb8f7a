//! Session actor - owns the controller and processes commands and ticks.
//!
//! All controller mutation happens inside this one task, so the controller
//! needs no locking.

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, trace};

use super::commands::{LifecycleSignal, SessionCommand};
use crate::events::Event;
use crate::session::{CountdownId, SessionController, SessionSnapshot};

pub struct SessionActor {
    controller: SessionController,
    commands: mpsc::Receiver<SessionCommand>,
    ticks: mpsc::UnboundedReceiver<CountdownId>,
    events: broadcast::Sender<Event>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionActor {
    pub fn new(
        controller: SessionController,
        commands: mpsc::Receiver<SessionCommand>,
        ticks: mpsc::UnboundedReceiver<CountdownId>,
        events: broadcast::Sender<Event>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            controller,
            commands,
            ticks,
            events,
            snapshots,
        }
    }

    /// Runs until every [`SessionHandle`](super::SessionHandle) is dropped.
    ///
    /// The persisted running flag is left as is on exit so the next launch
    /// can resume.
    pub async fn run(mut self) {
        info!("session actor starting");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(id) = self.ticks.recv() => self.handle_tick(id),
            }
        }

        info!(
            running = self.controller.is_running(),
            remaining_secs = self.controller.remaining_secs(),
            "session actor stopped"
        );
    }

    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Press { at, respond_to } => {
                self.controller.on_primary_button_press_at(at);
                let _ = respond_to.send(self.publish_with_snapshot());
            }
            SessionCommand::ApplyConfig { config, respond_to } => {
                let result = self.controller.apply_config(config);
                let snapshot = self.publish_with_snapshot();
                let _ = respond_to.send(result.map(|()| snapshot));
            }
            SessionCommand::SetApps { apps, respond_to } => {
                debug!(count = apps.len(), "app set replaced");
                self.controller.set_apps(apps);
                let _ = respond_to.send(self.publish_with_snapshot());
            }
            SessionCommand::Lifecycle { signal, respond_to } => {
                match signal {
                    LifecycleSignal::EnterBackground => self.controller.on_enter_background(),
                    LifecycleSignal::EnterForeground => self.controller.on_enter_foreground(),
                    LifecycleSignal::BackgroundExpired => self.controller.on_background_expired(),
                }
                let _ = respond_to.send(self.publish_with_snapshot());
            }
            SessionCommand::Snapshot { respond_to } => {
                let _ = respond_to.send(self.controller.snapshot());
            }
        }
    }

    fn handle_tick(&mut self, id: CountdownId) {
        if self.controller.active_countdown() != Some(id) {
            trace!(%id, "dropping tick for inactive countdown");
            return;
        }
        self.controller.tick();
        self.publish();
    }

    /// Like [`Self::publish`], followed by a `StateSnapshot` event so
    /// subscribers see where each command left the session.
    fn publish_with_snapshot(&mut self) -> SessionSnapshot {
        let snapshot = self.publish();
        let _ = self.events.send(Event::StateSnapshot {
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    /// Broadcast pending events and the current snapshot.
    fn publish(&mut self) -> SessionSnapshot {
        for event in self.controller.take_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
        let snapshot = self.controller.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}
