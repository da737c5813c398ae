//! caravan: imports files referenced by migration rows into managed storage

use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod files;
mod migrate;

use cli::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    match cli.command {
        Commands::Import(command) => {
            cli::commands::import::handle_import_command(command, &config).await
        }
        Commands::Files(command) => {
            cli::commands::files::handle_files_command(command, &config).await
        }
    }
}
