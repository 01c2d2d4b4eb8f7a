use clap::Subcommand;

use super::{open_shield_store, CliResult};
use gritlock_core::AppShield;

#[derive(Subcommand)]
pub enum ShieldAction {
    /// Show which apps are currently shielded
    Show,
    /// Clear the shield immediately
    Unblock,
}

pub fn run(action: ShieldAction) -> CliResult {
    let mut store = open_shield_store()?;
    match action {
        ShieldAction::Show => match store.shielded()? {
            Some(apps) => println!("{}", serde_json::to_string_pretty(&apps)?),
            None => println!("no apps shielded"),
        },
        ShieldAction::Unblock => {
            store.unblock()?;
            println!("shield cleared");
        }
    }
    Ok(())
}
