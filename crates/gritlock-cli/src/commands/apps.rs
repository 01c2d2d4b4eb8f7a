use clap::Subcommand;
use gritlock_core::{AppSet, Config};

use super::CliResult;

#[derive(Subcommand)]
pub enum AppsAction {
    /// List shielded applications
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add applications by identifier
    Add {
        #[arg(required = true)]
        apps: Vec<String>,
    },
    /// Remove applications by identifier
    Remove {
        #[arg(required = true)]
        apps: Vec<String>,
    },
    /// Remove every application
    Clear,
}

pub fn run(action: AppsAction) -> CliResult {
    let mut config = Config::load()?;

    match action {
        AppsAction::List { json } => {
            let apps = &config.shield.applications;
            if json {
                println!("{}", serde_json::to_string_pretty(apps)?);
            } else if apps.is_empty() {
                println!("no apps configured");
            } else {
                for app in apps.iter() {
                    println!("{app}");
                }
            }
            return Ok(());
        }
        AppsAction::Add { apps } => {
            let added = apps
                .into_iter()
                .filter(|app| config.shield.applications.insert(app.as_str()))
                .count();
            println!("added {added} app(s)");
        }
        AppsAction::Remove { apps } => {
            let removed = apps
                .iter()
                .filter(|app| config.shield.applications.remove(app))
                .count();
            println!("removed {removed} app(s)");
        }
        AppsAction::Clear => {
            config.shield.applications = AppSet::new();
            println!("cleared");
        }
    }

    config.save()?;
    Ok(())
}
