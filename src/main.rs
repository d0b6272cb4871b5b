mod config;
mod error;
mod fs;
mod progress;
mod remote;
mod ssh;
mod sync;
mod util;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::SyncConfig;
use crate::ssh::SshSession;
use crate::sync::Synchronizer;

#[derive(Parser)]
#[command(
    name = "sync-repo",
    about = "Mirror a git repository to a remote host over SFTP"
)]
struct Cli {
    /// Config file (default: .sync_repo.conf at the repository root)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Push the whole filtered repository tree (the default)
    All,
    /// Push a single file
    File { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SyncConfig::load(cli.config)?;
    let session = SshSession::connect(&config)?;
    let sync = Synchronizer::new(&config, session.sftp()?)?;

    match cli.command.unwrap_or(Command::All) {
        Command::All => sync.sync_repo()?,
        Command::File { path } => sync.sync_file(&path)?,
    }

    Ok(())
}
