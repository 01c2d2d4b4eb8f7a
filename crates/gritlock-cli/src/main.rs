use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gritlock", version, about = "GritLock focus timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session in the terminal
    Run(commands::run::RunArgs),
    /// Print persisted session state as JSON
    Status,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Manage the applications shielded during work
    Apps {
        #[command(subcommand)]
        action: commands::apps::AppsAction,
    },
    /// Inspect or clear the local shield
    Shield {
        #[command(subcommand)]
        action: commands::shield::ShieldAction,
    },
    /// Local Screen Time authorization
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gritlock=info,gritlock_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Status => commands::status::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Apps { action } => commands::apps::run(action),
        Commands::Shield { action } => commands::shield::run(action),
        Commands::Auth { action } => commands::auth::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
