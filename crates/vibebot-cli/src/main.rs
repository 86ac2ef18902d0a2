mod commands;
mod error;
mod platforms;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{daemon, engage, interactions, scout, Context};
use crate::error::{exit_code_for, report_error};
use vibebot_config as config;
use vibebot_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "vibebot", version, about = "vibebot CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one mission for the given keywords
    Scout(scout::ScoutArgs),
    List(interactions::ListArgs),
    Show(interactions::ShowArgs),
    Stats,
    Like(engage::LikeArgs),
    Reply(engage::ReplyArgs),
    /// Delete every stored interaction
    Clear(interactions::ClearArgs),
    /// Run scheduled missions until stopped
    Daemon(daemon::DaemonArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }
    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store = Store::open(&db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let ctx = Context {
        store: &store,
        db_path: &db_path,
        json,
        config: &app_config,
    };

    match command {
        Command::Scout(args) => scout::scout(&ctx, args),
        Command::List(args) => interactions::list(&ctx, args),
        Command::Show(args) => interactions::show(&ctx, args),
        Command::Stats => interactions::stats(&ctx),
        Command::Like(args) => engage::like(&ctx, args),
        Command::Reply(args) => engage::reply(&ctx, args),
        Command::Clear(args) => interactions::clear(&ctx, args),
        Command::Daemon(args) => daemon::daemon(&ctx, args),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
