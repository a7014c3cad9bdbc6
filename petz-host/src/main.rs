//! `petz`: look after a virtual pet from the terminal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use petz_core::persistence::SqliteStore;
use petz_core::{ActionKind, Clock, PetzConfig, Report};
use petz_host::setup::db_path;
use petz_host::{init_tracing, load_config, open_session, render, StoreOptions};

#[derive(Parser)]
#[command(name = "petz", version = env!("CARGO_PKG_VERSION"), about = "A persistent virtual pet whose needs grow in real time")]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Save file, overriding `persistence.path`
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Do not read or write a save file
    #[arg(long, global = true)]
    in_memory: bool,

    /// Print reports as JSON instead of the text card
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Catch up on elapsed time and show the pet (default)
    Status,
    /// Give a fish snack
    Feed,
    /// Gentle scritches
    Pet,
    /// Play together
    Play,
    /// Run around
    Exercise,
    /// Take a nap
    Sleep,
    /// Run an action by name
    Act {
        /// feed, pet, play, exercise or sleep
        action: String,
    },
    /// Start over with a brand-new pet
    Adopt {
        /// Name for the newcomer
        name: Option<String>,
        /// Replace a pet that is still alive
        #[arg(long)]
        force: bool,
    },
    /// Bring a dead pet back one level lower
    Revive,
    /// Give the pet a new name
    Rename {
        /// The new name
        name: String,
    },
    /// Keep ticking until Ctrl-C
    Watch,
    /// Copy the save file
    Backup {
        /// Destination path
        dest: PathBuf,
    },
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render(report));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("loading config")?;
    init_tracing(&config.general.log_level, cli.log_json);

    let options = StoreOptions {
        db: cli.db.clone(),
        in_memory: cli.in_memory,
    };

    let command = cli.command.unwrap_or(Command::Status);

    let mut session = open_session(&config, &options)?;

    let report = match command {
        Command::Status => session.tick_now(),
        Command::Feed => act(&mut session, ActionKind::Feed),
        Command::Pet => act(&mut session, ActionKind::Pet),
        Command::Play => act(&mut session, ActionKind::Play),
        Command::Exercise => act(&mut session, ActionKind::Exercise),
        Command::Sleep => act(&mut session, ActionKind::Sleep),
        Command::Act { action } => act(&mut session, action.parse()?),
        Command::Adopt { name, force } => {
            session.tick_now();
            if session.state().alive && !force {
                bail!(
                    "{} is still alive; pass --force to adopt a new pet anyway",
                    session.state().name
                );
            }
            session.adopt(name.as_deref())
        }
        Command::Revive => {
            session.tick_now();
            if session.state().alive {
                bail!("{} is alive and well", session.state().name);
            }
            session.revive()
        }
        Command::Rename { name } => {
            session.tick_now();
            session.rename(&name)
        }
        Command::Watch => {
            let every = Duration::from_secs(config.general.tick_interval_seconds.max(1));
            return watch(&mut session, every, cli.json).await;
        }
        Command::Backup { dest } => return backup(&config, &options, &dest),
    };

    print_report(&report, cli.json)
}

fn backup(config: &PetzConfig, options: &StoreOptions, dest: &Path) -> anyhow::Result<()> {
    if options.in_memory || config.persistence.backend != "sqlite" {
        bail!("backup needs the sqlite backend");
    }
    let store = SqliteStore::open(db_path(&config.persistence, options), &config.persistence)?;
    store.backup(dest)?;
    println!("Saved a copy to {}", dest.display());
    Ok(())
}

fn act(session: &mut petz_host::HostSession, kind: ActionKind) -> Report {
    let now = session.clock().now();
    session.apply_action(kind, now)
}

async fn watch(
    session: &mut petz_host::HostSession,
    every: Duration,
    json: bool,
) -> anyhow::Result<()> {
    info!(interval_s = every.as_secs(), "Watching pet");
    print_report(&session.tick_now(), json)?;

    let mut interval = tokio::time::interval(every);
    interval.tick().await;
    let mut last_status = session.report().status;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = session.tick_now();
                if report.status != last_status || !report.events.is_empty() {
                    print_report(&report, json)?;
                    last_status = report.status;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopped watching");
                return Ok(());
            }
        }
    }
}
