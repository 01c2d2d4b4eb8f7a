//! Interactive terminal session.
//!
//! Reads one command per line from stdin and prints a status line for every
//! snapshot the session publishes.

use std::time::Duration;

use clap::Args;
use gritlock_core::{
    spawn_authorization, spawn_session, Collaborators, Config, CoreError, Database, Phase,
    SessionController, SessionSnapshot, ShieldStore, SimulatedHost, StoreAuthorization,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, watch};
use tracing::debug;

use super::{database_path, CliResult};

const BAR_WIDTH: usize = 10;

const HELP: &str = "\
commands:
  <enter>, p   press the primary button
  d            double press (stops a break and resets)
  bg           simulate entering the background
  fg           simulate returning to the foreground
  s            print the current state
  q            quit";

#[derive(Args)]
pub struct RunArgs {
    /// Milliseconds per countdown tick; lower values fast-forward the clock
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Print snapshots as JSON lines instead of status lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Press,
    DoublePress,
    Background,
    Foreground,
    Status,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim() {
        "" | "p" | "press" => Some(Input::Press),
        "d" | "double" => Some(Input::DoublePress),
        "bg" | "background" => Some(Input::Background),
        "fg" | "foreground" => Some(Input::Foreground),
        "s" | "status" => Some(Input::Status),
        "h" | "help" | "?" => Some(Input::Help),
        "q" | "quit" | "exit" => Some(Input::Quit),
        _ => None,
    }
}

/// One status line, e.g. `WORK 24:59 cycle 1/4 [#---------] running`.
fn render(snapshot: &SessionSnapshot) -> String {
    let label = match snapshot.phase {
        Phase::Work => "WORK ",
        Phase::Break => "BREAK",
    };
    let filled = ((snapshot.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let state = if snapshot.running { "running" } else { "stopped" };
    format!(
        "{label} {} cycle {}/{} [{}{}] {state}",
        snapshot.clock,
        snapshot.current_cycle,
        snapshot.total_cycles,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
    )
}

fn print_snapshot(snapshot: &SessionSnapshot, json: bool) {
    if json {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("error: {e}"),
        }
    } else {
        println!("{}", render(snapshot));
    }
}

async fn print_snapshots(mut snapshots: watch::Receiver<SessionSnapshot>, json: bool) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        print_snapshot(&snapshot, json);
    }
}

async fn log_events(mut events: broadcast::Receiver<gritlock_core::Event>) {
    loop {
        match events.recv().await {
            Ok(event) => debug!(event = event.kind(), "session event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

pub fn run(args: RunArgs) -> CliResult {
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(session(args));
    // A pending stdin read would otherwise block runtime shutdown.
    runtime.shutdown_background();
    result
}

async fn session(args: RunArgs) -> CliResult {
    let config = Config::load()?;
    let db_path = database_path()?;
    let flags = Database::open_at(&db_path)?;
    let shield = ShieldStore::new(Database::open_at(&db_path)?);
    let period = Duration::from_millis(args.tick_ms.max(1));

    spawn_authorization(StoreAuthorization::at(&db_path));

    let (handle, task) = spawn_session(|scheduler| {
        SessionController::new(
            config.session.clone(),
            config.shield.applications.clone(),
            Collaborators::default()
                .with_shield(shield)
                .with_flags(flags)
                .with_host(SimulatedHost::new())
                .with_scheduler(scheduler.with_period(period)),
        )
    })?;

    let printer = tokio::spawn(print_snapshots(handle.watch(), args.json));
    let logger = tokio::spawn(log_events(handle.subscribe()));

    eprintln!("{HELP}");
    // Cold start counts as entering the foreground.
    let snapshot = handle.enter_foreground().await?;
    print_snapshot(&snapshot, args.json);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Some(Input::Press) => {
                handle.press().await?;
            }
            Some(Input::DoublePress) => {
                handle.press().await?;
                handle.press().await?;
            }
            Some(Input::Background) => {
                handle.enter_background().await?;
            }
            Some(Input::Foreground) => {
                handle.enter_foreground().await?;
            }
            Some(Input::Status) => {
                let snapshot = handle.snapshot().await?;
                print_snapshot(&snapshot, args.json);
            }
            Some(Input::Help) => eprintln!("{HELP}"),
            Some(Input::Quit) => break,
            None => eprintln!("unknown command: {} (h for help)", line.trim()),
        }
    }

    printer.abort();
    logger.abort();
    drop(handle);
    task.await
        .map_err(|e| CoreError::Custom(format!("session task failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(phase: Phase, remaining_secs: u64, total_secs: u64, running: bool) -> SessionSnapshot {
        SessionSnapshot {
            phase,
            remaining_secs,
            total_secs,
            progress: gritlock_core::session::progress_of(remaining_secs, total_secs),
            current_cycle: 2,
            total_cycles: 4,
            running,
            clock: gritlock_core::session::format_clock(remaining_secs),
            at: Utc::now(),
        }
    }

    #[test]
    fn render_work_line() {
        let line = render(&snapshot(Phase::Work, 1500, 1500, true));
        assert_eq!(line, "WORK  25:00 cycle 2/4 [----------] running");
    }

    #[test]
    fn render_half_done_break() {
        let line = render(&snapshot(Phase::Break, 150, 300, false));
        assert_eq!(line, "BREAK 02:30 cycle 2/4 [#####-----] stopped");
    }

    #[test]
    fn render_full_bar() {
        let line = render(&snapshot(Phase::Work, 0, 60, true));
        assert!(line.contains("[##########]"));
    }

    #[test]
    fn empty_line_is_a_press() {
        assert_eq!(parse_input(""), Some(Input::Press));
        assert_eq!(parse_input("  p \n"), Some(Input::Press));
        assert_eq!(parse_input("d"), Some(Input::DoublePress));
        assert_eq!(parse_input("bg"), Some(Input::Background));
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input("launch"), None);
    }
}
