//! Tokio runtime for the session controller.
//!
//! [`spawn_session`] moves a controller into an actor task. Ticks come from
//! an [`IntervalScheduler`] and callers talk to the actor through a
//! [`SessionHandle`].
//!
//! ```ignore
//! let (handle, _task) = spawn_session(|scheduler| {
//!     SessionController::new(config, apps, Collaborators::default().with_scheduler(scheduler))
//! })?;
//! handle.press().await?;
//! let mut events = handle.subscribe();
//! ```

mod actor;
mod commands;
mod handle;
mod scheduler;

pub use actor::SessionActor;
pub use commands::{LifecycleSignal, SessionCommand};
pub use handle::SessionHandle;
pub use scheduler::IntervalScheduler;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::session::SessionController;
use crate::shield::AuthorizationProvider;

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

/// Build a controller around a fresh [`IntervalScheduler`] and spawn its actor.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns whatever `build` returns when the controller cannot be created.
pub fn spawn_session<F>(build: F) -> Result<(SessionHandle, JoinHandle<()>), ConfigError>
where
    F: FnOnce(IntervalScheduler) -> Result<SessionController, ConfigError>,
{
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let controller = build(IntervalScheduler::new(tick_tx))?;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

    let actor = SessionActor::new(controller, command_rx, tick_rx, event_tx.clone(), snapshot_tx);
    let task = tokio::spawn(actor.run());

    Ok((SessionHandle::new(command_tx, event_tx, snapshot_rx), task))
}

/// Request screen-time authorization without waiting for the answer.
///
/// The outcome is only logged; a denial leaves the timer working with
/// nothing shielded.
pub fn spawn_authorization<P>(provider: P) -> JoinHandle<()>
where
    P: AuthorizationProvider + 'static,
{
    tokio::spawn(async move {
        match provider.request_authorization().await {
            Ok(()) => info!("Screen Time authorization granted"),
            Err(e) => warn!(error = %e, "Screen Time authorization failed"),
        }
    })
}
