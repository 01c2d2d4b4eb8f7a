pub mod apps;
pub mod auth;
pub mod config;
pub mod run;
pub mod shield;
pub mod status;

use std::path::PathBuf;

use gritlock_core::error::Result;
use gritlock_core::storage::data_dir;
use gritlock_core::{Database, ShieldStore};

pub type CliResult = Result<()>;

/// Path of the shared SQLite database.
pub fn database_path() -> Result<PathBuf, std::io::Error> {
    Ok(data_dir()?.join("gritlock.db"))
}

pub fn open_database() -> Result<Database> {
    Ok(Database::open_at(&database_path()?)?)
}

pub fn open_shield_store() -> Result<ShieldStore> {
    Ok(ShieldStore::new(open_database()?))
}
