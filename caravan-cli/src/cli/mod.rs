//! Command line interface definitions

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::files::FilesCommands;
use commands::import::ImportCommands;

#[derive(Debug, Parser)]
#[command(name = "caravan-cli")]
#[command(about = "Import files referenced by migration rows into managed storage")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Override the database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run file imports from a manifest
    #[command(subcommand)]
    Import(ImportCommands),

    /// Inspect the managed file records
    #[command(subcommand)]
    Files(FilesCommands),
}
