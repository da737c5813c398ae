//! Application configuration and database bootstrap

pub mod repository;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::files::SchemeRegistry;

/// Application configuration, read from `config.toml` in the config dir.
///
/// Everything is optional; a missing file means defaults across the board.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Database file; `caravan.db` in the config dir when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Local roots backing the storage schemes.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the `public` scheme
    #[serde(default = "default_public_root")]
    pub public_root: PathBuf,
    /// Additional scheme roots, keyed by scheme name
    #[serde(default)]
    pub schemes: HashMap<String, PathBuf>,
    /// Scheme applied to schemeless destination paths
    #[serde(default)]
    pub default_scheme: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_root: default_public_root(),
            schemes: HashMap::new(),
            default_scheme: None,
        }
    }
}

fn default_public_root() -> PathBuf {
    config_dir().join("files")
}

/// Get the config directory (~/.config/caravan/)
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("caravan")
}

impl AppConfig {
    /// Load the configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir().join("config.toml"))
    }

    /// Load the configuration from a specific file; defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Database file location.
    pub fn database_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| config_dir().join("caravan.db"))
    }

    /// Build the scheme registry from the configured storage roots.
    pub fn scheme_registry(&self) -> SchemeRegistry {
        let mut registry = SchemeRegistry::new(&self.storage.public_root);
        for (scheme, root) in &self.storage.schemes {
            registry = registry.with_scheme(scheme, root);
        }
        if let Some(scheme) = &self.storage.default_scheme {
            registry = registry.with_default_scheme(scheme);
        }
        registry
    }
}

const FILES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uri TEXT NOT NULL UNIQUE,
    owner INTEGER NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Open the sqlite database, creating the file and schema when missing.
pub async fn connect_database(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Ensure the schema exists on an open pool.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(FILES_SCHEMA)
        .execute(pool)
        .await
        .context("Failed to initialize database schema")?;
    Ok(())
}
