//! Messages accepted by the session actor.

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::error::ConfigError;
use crate::session::{SessionConfig, SessionSnapshot};
use crate::shield::AppSet;

/// Host lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    EnterBackground,
    EnterForeground,
    BackgroundExpired,
}

/// Commands sent to the session actor. Every command answers with the
/// snapshot taken after it was applied.
#[derive(Debug)]
pub enum SessionCommand {
    Press {
        at: DateTime<Utc>,
        respond_to: oneshot::Sender<SessionSnapshot>,
    },
    ApplyConfig {
        config: SessionConfig,
        respond_to: oneshot::Sender<Result<SessionSnapshot, ConfigError>>,
    },
    SetApps {
        apps: AppSet,
        respond_to: oneshot::Sender<SessionSnapshot>,
    },
    Lifecycle {
        signal: LifecycleSignal,
        respond_to: oneshot::Sender<SessionSnapshot>,
    },
    Snapshot {
        respond_to: oneshot::Sender<SessionSnapshot>,
    },
}
