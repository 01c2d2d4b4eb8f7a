use clap::Subcommand;

use super::{open_shield_store, CliResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Allow the local shield to block apps
    Grant,
    /// Revoke access; sessions keep running with nothing blocked
    Revoke,
    /// Print the current authorization
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    let store = open_shield_store()?;
    match action {
        AuthAction::Grant => {
            store.set_authorized(true)?;
            println!("authorized");
        }
        AuthAction::Revoke => {
            store.set_authorized(false)?;
            println!("revoked");
        }
        AuthAction::Status => {
            let state = if store.is_authorized()? {
                "authorized"
            } else {
                "not authorized"
            };
            println!("{state}");
        }
    }
    Ok(())
}
