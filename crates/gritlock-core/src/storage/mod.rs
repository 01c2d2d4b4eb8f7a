mod config;
pub mod database;
pub mod shield_store;

pub use config::{Config, ShieldConfig};
pub use database::Database;
pub use shield_store::{ShieldStore, StoreAuthorization};

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::StorageError;

/// Durable "a session is currently running" flag.
pub trait RunningFlagStore {
    fn running_flag(&self) -> Result<bool, StorageError>;
    fn set_running_flag(&mut self, running: bool) -> Result<(), StorageError>;
}

/// In-memory flag store. Clones share the flag, which lets a test simulate a
/// process restart by handing a clone to a fresh controller.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    running: Arc<AtomicBool>,
}

impl MemoryFlagStore {
    pub fn new(running: bool) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(running)),
        }
    }

    pub fn get(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl RunningFlagStore for MemoryFlagStore {
    fn running_flag(&self) -> Result<bool, StorageError> {
        Ok(self.get())
    }

    fn set_running_flag(&mut self, running: bool) -> Result<(), StorageError> {
        self.running.store(running, Ordering::SeqCst);
        Ok(())
    }
}

/// Returns `~/.config/gritlock[-dev]/` based on GRITLOCK_ENV.
///
/// Set GRITLOCK_ENV=dev to use the development data directory, or
/// GRITLOCK_HOME to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("GRITLOCK_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GRITLOCK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("gritlock-dev")
            } else {
                base_dir.join("gritlock")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
