//! Managed file inspection commands

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::repository::files as repo;
use crate::config::{self, AppConfig};

#[derive(Debug, Subcommand)]
pub enum FilesCommands {
    /// List stored file records, newest first
    List {
        /// Maximum number of records to show
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Show the record stored for a URI
    Lookup {
        /// Storage URI, e.g. public://images/photo.jpg
        uri: String,
    },
    /// Delete a file record by id (bytes stay in storage)
    Delete {
        /// Record id as shown by `files list`
        id: i64,
    },
}

/// Handle the files command group
pub async fn handle_files_command(command: FilesCommands, config: &AppConfig) -> Result<()> {
    let pool = config::connect_database(&config.database_path()).await?;

    match command {
        FilesCommands::List { limit } => {
            let files = repo::list_files(&pool, limit).await?;
            if files.is_empty() {
                println!("No file records stored yet.");
                return Ok(());
            }

            // Pad before coloring; ColoredString ignores width specifiers
            let header = format!(
                "{:>6}  {:<10}  {:>6}  {:<19}  {}",
                "id", "status", "owner", "created", "uri"
            );
            println!("{}", header.bold());
            for file in files {
                println!(
                    "{:>6}  {:<10}  {:>6}  {:<19}  {}",
                    file.id,
                    file.status.to_string(),
                    file.owner,
                    file.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    file.uri.cyan()
                );
            }
        }
        FilesCommands::Lookup { uri } => {
            match repo::find_file_by_uri(&pool, &uri).await? {
                Some(record) => {
                    println!("id:     {}", record.id.unwrap_or_default());
                    println!("uri:    {}", record.uri.cyan());
                    println!("owner:  {}", record.owner);
                    println!("status: {}", record.status);
                }
                None => anyhow::bail!("No file record stored for {}", uri),
            }
        }
        FilesCommands::Delete { id } => {
            if repo::delete_file(&pool, id).await? {
                println!("{} file record {}", "Deleted".bright_green(), id);
            } else {
                anyhow::bail!("No file record with id {}", id);
            }
        }
    }

    Ok(())
}
