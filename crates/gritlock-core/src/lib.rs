//! # GritLock Core Library
//!
//! Business logic for the GritLock focus timer: alternate work and break
//! intervals for a configured number of rounds and shield distracting apps
//! while a work interval runs.
//!
//! ## Architecture
//!
//! - **Session Controller**: A synchronous state machine that owns the timer
//!   state and signals its collaborators
//! - **Collaborators**: Traits for the app shield, the running-flag store, the
//!   host's background grants and the tick scheduler
//! - **Runtime**: A tokio actor that drives the controller once per second
//! - **Storage**: SQLite key-value storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionController`]: Core session state machine
//! - [`SessionHandle`]: Async client for a controller running in the runtime
//! - [`Database`]: Running flag and local shield persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod host;
pub mod runtime;
pub mod session;
pub mod shield;
pub mod storage;

pub use error::{AuthorizationError, ConfigError, CoreError, ShieldError, StorageError};
pub use events::Event;
pub use host::{BackgroundGrant, BackgroundHost, NoBackground, SimulatedHost};
pub use runtime::{spawn_authorization, spawn_session, IntervalScheduler, SessionHandle};
pub use session::{
    Collaborators, CountdownId, ManualScheduler, Phase, SessionConfig, SessionController,
    SessionSnapshot, TickScheduler,
};
pub use shield::{AppSet, AppShield, AuthorizationProvider, MemoryShield, StaticAuthorization};
pub use storage::{Config, Database, MemoryFlagStore, RunningFlagStore, ShieldStore, StoreAuthorization};
