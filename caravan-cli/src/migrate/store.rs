//! File records and their persistence

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

/// Lifecycle status of a file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Temporary,
    Permanent,
}

impl FileStatus {
    pub fn from_i64(value: i64) -> Self {
        if value == 0 {
            FileStatus::Temporary
        } else {
            FileStatus::Permanent
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            FileStatus::Temporary => 0,
            FileStatus::Permanent => 1,
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Temporary => write!(f, "temporary"),
            FileStatus::Permanent => write!(f, "permanent"),
        }
    }
}

/// A persisted file entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// Database id; None until saved
    pub id: Option<i64>,
    pub uri: String,
    pub owner: i64,
    pub status: FileStatus,
}

impl FileRecord {
    /// A permanent record for the file at `uri`, not yet persisted.
    pub fn permanent(uri: impl Into<String>, owner: i64) -> Self {
        Self {
            id: None,
            uri: uri.into(),
            owner,
            status: FileStatus::Permanent,
        }
    }
}

/// Persistence for file records.
#[async_trait]
pub trait FileRecordStore: Send + Sync {
    /// Find the record whose stored URI equals `uri` exactly.
    async fn find_by_uri(&self, uri: &str) -> Result<Option<FileRecord>>;

    /// Persist the record, assigning its id on first save.
    async fn save(&self, record: &mut FileRecord) -> Result<i64>;
}

/// Store backed by the sqlite `files` table.
pub struct SqliteFileStore {
    pool: SqlitePool,
}

impl SqliteFileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRecordStore for SqliteFileStore {
    async fn find_by_uri(&self, uri: &str) -> Result<Option<FileRecord>> {
        crate::config::repository::files::find_file_by_uri(&self.pool, uri).await
    }

    async fn save(&self, record: &mut FileRecord) -> Result<i64> {
        let id = match record.id {
            Some(id) => {
                crate::config::repository::files::update_file(&self.pool, record).await?;
                id
            }
            None => crate::config::repository::files::insert_file(&self.pool, record).await?,
        };
        record.id = Some(id);
        Ok(id)
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryFileStore {
    records: Mutex<Vec<FileRecord>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as if it had been saved earlier. Returns its id.
    pub async fn seed(&self, mut record: FileRecord) -> i64 {
        let mut records = self.records.lock().await;
        let id = record.id.unwrap_or(records.len() as i64 + 1);
        record.id = Some(id);
        records.push(record);
        id
    }

    /// Snapshot of the stored records.
    pub async fn records(&self) -> Vec<FileRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl FileRecordStore for MemoryFileStore {
    async fn find_by_uri(&self, uri: &str) -> Result<Option<FileRecord>> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.uri == uri).cloned())
    }

    async fn save(&self, record: &mut FileRecord) -> Result<i64> {
        let mut records = self.records.lock().await;
        match record.id {
            Some(id) => {
                if let Some(stored) = records.iter_mut().find(|r| r.id == Some(id)) {
                    *stored = record.clone();
                }
                Ok(id)
            }
            None => {
                // Same uniqueness rule as the sqlite table
                if records.iter().any(|r| r.uri == record.uri) {
                    anyhow::bail!("A file record for {} already exists", record.uri);
                }
                let id = records.len() as i64 + 1;
                record.id = Some(id);
                records.push(record.clone());
                Ok(id)
            }
        }
    }
}
