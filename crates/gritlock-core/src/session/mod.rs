mod config;
mod controller;
mod countdown;
mod state;

pub use config::SessionConfig;
pub use controller::{Collaborators, SessionController, DOUBLE_PRESS_WINDOW_MS};
pub use countdown::{CountdownId, ManualScheduler, TickScheduler, TICK_PERIOD};
pub use state::{format_clock, progress_of, Phase, SessionSnapshot, SessionState};
