use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

mod commands;
mod display;

use commands::{shell, Session};
use svc_core::{DiskBackend, Repository, RepositoryConfig, DEFAULT_BRANCH};

#[derive(Parser)]
#[command(name = "svc")]
#[command(version, about = "A small in-memory version control session", long_about = None)]
struct Cli {
    /// Working directory that tracked paths are relative to
    #[arg(short, long, default_value = ".", global = true)]
    dir: PathBuf,

    /// Name of the branch a new repository starts on
    #[arg(long, default_value = DEFAULT_BRANCH, global = true)]
    default_branch: String,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Shell,

    /// Run every command in a script file, one per line
    Run {
        /// Script to execute
        script: PathBuf,

        /// Keep going after a failing command
        #[arg(long)]
        keep_going: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = std::fs::canonicalize(&cli.dir)
        .with_context(|| format!("Working directory {} not found", cli.dir.display()))?;
    let config = RepositoryConfig::default().with_default_branch(cli.default_branch);
    let repo = Repository::with_config(DiskBackend::new(&root), config)?;
    let mut session = Session::new(repo, cli.json);

    let outcome = match cli.command {
        Commands::Shell => shell::interactive(&mut session),
        Commands::Run { script, keep_going } => shell::run_script(&mut session, &script, keep_going),
    };

    session.finish();
    outcome
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
