use clap::Subcommand;
use gritlock_core::session::format_clock;
use gritlock_core::{Config, ConfigError, SessionConfig};

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "session.work_duration_secs")
        key: String,
    },
    /// Set a config value; takes effect at the next `run`
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values as JSON
    List,
    /// Show the interval plan the current session settings produce
    Plan,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            let effective = config.get(&key).unwrap_or(value);
            println!("{key} = {effective}");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Plan => {
            let config = Config::load()?;
            for line in plan_lines(&config.session, config.shield.applications.len()) {
                println!("{line}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

/// Number of breaks a full session runs.
fn break_count(session: &SessionConfig) -> u32 {
    if session.break_after_final_cycle {
        session.total_cycles
    } else {
        session.total_cycles.saturating_sub(1)
    }
}

fn plan_lines(session: &SessionConfig, app_count: usize) -> Vec<String> {
    let breaks = break_count(session);
    let total = session.work_duration_secs * u64::from(session.total_cycles)
        + session.break_duration_secs * u64::from(breaks);
    let final_break = if session.break_after_final_cycle {
        "break after the final cycle"
    } else {
        "no break after the final cycle"
    };
    vec![
        format!(
            "work  {} x {}",
            format_clock(session.work_duration_secs),
            session.total_cycles
        ),
        format!("break {} x {breaks}", format_clock(session.break_duration_secs)),
        format!("total {} ({final_break})", format_clock(total)),
        format!("shielded apps: {app_count}"),
    ]
}
