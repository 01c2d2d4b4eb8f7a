//! Client interface for a session running in the actor.

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::commands::{LifecycleSignal, SessionCommand};
use crate::error::CoreError;
use crate::events::Event;
use crate::session::{SessionConfig, SessionSnapshot};
use crate::shield::AppSet;

/// Cheap-to-clone handle to the session actor.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
    events: broadcast::Sender<Event>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<SessionCommand>,
        events: broadcast::Sender<Event>,
        snapshots: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self {
            sender,
            events,
            snapshots,
        }
    }

    async fn request<F>(&self, build: F) -> Result<SessionSnapshot, CoreError>
    where
        F: FnOnce(oneshot::Sender<SessionSnapshot>) -> SessionCommand,
    {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| CoreError::ChannelClosed)?;
        rx.await.map_err(|_| CoreError::ChannelClosed)
    }

    /// Primary button press, timestamped now.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ChannelClosed`] if the actor has shut down.
    pub async fn press(&self) -> Result<SessionSnapshot, CoreError> {
        self.press_at(Utc::now()).await
    }

    /// # Errors
    ///
    /// Returns [`CoreError::ChannelClosed`] if the actor has shut down.
    pub async fn press_at(&self, at: DateTime<Utc>) -> Result<SessionSnapshot, CoreError> {
        self.request(|respond_to| SessionCommand::Press { at, respond_to })
            .await
    }

    /// Replace the session config, resetting the session.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the config is invalid, or
    /// [`CoreError::ChannelClosed`] if the actor has shut down.
    pub async fn apply_config(&self, config: SessionConfig) -> Result<SessionSnapshot, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::ApplyConfig {
                config,
                respond_to: tx,
            })
            .await
            .map_err(|_| CoreError::ChannelClosed)?;
        Ok(rx.await.map_err(|_| CoreError::ChannelClosed)??)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::ChannelClosed`] if the actor has shut down.
    pub async fn set_apps(&self, apps: AppSet) -> Result<SessionSnapshot, CoreError> {
        self.request(|respond_to| SessionCommand::SetApps { apps, respond_to })
            .await
    }

    /// # Errors
    ///
    /// Returns [`CoreError::ChannelClosed`] if the actor has shut down.
    pub async fn enter_background(&self) -> Result<SessionSnapshot, CoreError> {
        self.lifecycle(LifecycleSignal::EnterBackground).await
    }

    /// # Errors
    ///
    /// Returns [`CoreError::ChannelClosed`] if the actor has shut down.
    pub async fn enter_foreground(&self) -> Result<SessionSnapshot, CoreError> {
        self.lifecycle(LifecycleSignal::EnterForeground).await
    }

    /// # Errors
    ///
    /// Returns [`CoreError::ChannelClosed`] if the actor has shut down.
    pub async fn background_expired(&self) -> Result<SessionSnapshot, CoreError> {
        self.lifecycle(LifecycleSignal::BackgroundExpired).await
    }

    async fn lifecycle(&self, signal: LifecycleSignal) -> Result<SessionSnapshot, CoreError> {
        self.request(|respond_to| SessionCommand::Lifecycle { signal, respond_to })
            .await
    }

    /// # Errors
    ///
    /// Returns [`CoreError::ChannelClosed`] if the actor has shut down.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, CoreError> {
        self.request(|respond_to| SessionCommand::Snapshot { respond_to })
            .await
    }

    /// Subscribe to controller events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Latest published snapshot, updated after every command and tick.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}
