use gritlock_core::{Config, RunningFlagStore};
use serde_json::json;

use super::{open_database, open_shield_store, CliResult};

pub fn run() -> CliResult {
    let config = Config::load()?;
    let db = open_database()?;
    let store = open_shield_store()?;

    let status = json!({
        "running": db.running_flag()?,
        "authorized": store.is_authorized()?,
        "shielded": store.shielded()?,
        "session": config.session,
        "applications": config.shield.applications,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
