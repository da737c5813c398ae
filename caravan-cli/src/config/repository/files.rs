//! Repository for file record operations

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};

use crate::migrate::store::{FileRecord, FileStatus};

/// A stored file row with its bookkeeping columns (for listing)
#[derive(Debug, Clone)]
pub struct FileListing {
    pub id: i64,
    pub uri: String,
    pub owner: i64,
    pub status: FileStatus,
    pub created_at: NaiveDateTime,
}

/// Find the record whose stored URI equals `uri` exactly
pub async fn find_file_by_uri(pool: &SqlitePool, uri: &str) -> Result<Option<FileRecord>> {
    let row = sqlx::query("SELECT id, uri, owner, status FROM files WHERE uri = ?")
        .bind(uri)
        .fetch_optional(pool)
        .await
        .context("Failed to look up file record by uri")?;

    match row {
        Some(row) => Ok(Some(FileRecord {
            id: Some(row.try_get("id")?),
            uri: row.try_get("uri")?,
            owner: row.try_get("owner")?,
            status: FileStatus::from_i64(row.try_get("status")?),
        })),
        None => Ok(None),
    }
}

/// Insert a new file record, returning its id
pub async fn insert_file(pool: &SqlitePool, record: &FileRecord) -> Result<i64> {
    let result = sqlx::query("INSERT INTO files (uri, owner, status) VALUES (?, ?, ?)")
        .bind(&record.uri)
        .bind(record.owner)
        .bind(record.status.as_i64())
        .execute(pool)
        .await
        .with_context(|| format!("Failed to insert file record for {}", record.uri))?;

    Ok(result.last_insert_rowid())
}

/// Update an already-saved file record in place
pub async fn update_file(pool: &SqlitePool, record: &FileRecord) -> Result<()> {
    let id = record
        .id
        .context("Cannot update a file record that was never saved")?;

    sqlx::query("UPDATE files SET uri = ?, owner = ?, status = ? WHERE id = ?")
        .bind(&record.uri)
        .bind(record.owner)
        .bind(record.status.as_i64())
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update file record {}", id))?;

    Ok(())
}

/// List stored file records, newest first
pub async fn list_files(pool: &SqlitePool, limit: i64) -> Result<Vec<FileListing>> {
    let rows = sqlx::query(
        "SELECT id, uri, owner, status, created_at FROM files ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to list file records")?;

    let mut files = Vec::new();
    for row in rows {
        files.push(FileListing {
            id: row.try_get("id")?,
            uri: row.try_get("uri")?,
            owner: row.try_get("owner")?,
            status: FileStatus::from_i64(row.try_get("status")?),
            created_at: row.try_get("created_at")?,
        });
    }

    Ok(files)
}

/// Delete a file record by id; true when a record was removed
pub async fn delete_file(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM files WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete file record {}", id))?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        config::init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trip() {
        let pool = pool().await;
        let record = FileRecord::permanent("public://images/a.jpg", 3);

        let id = insert_file(&pool, &record).await.unwrap();
        assert!(id > 0);

        let found = find_file_by_uri(&pool, "public://images/a.jpg")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.uri, "public://images/a.jpg");
        assert_eq!(found.owner, 3);
        assert_eq!(found.status, FileStatus::Permanent);
    }

    #[tokio::test]
    async fn test_find_missing_uri_is_none() {
        let pool = pool().await;
        let found = find_file_by_uri(&pool, "public://nope.jpg").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_uri_is_rejected() {
        let pool = pool().await;
        let record = FileRecord::permanent("public://a.jpg", 0);

        insert_file(&pool, &record).await.unwrap();
        let duplicate = insert_file(&pool, &record).await;

        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_update_file() {
        let pool = pool().await;
        let mut record = FileRecord::permanent("public://a.jpg", 0);
        record.id = Some(insert_file(&pool, &record).await.unwrap());

        record.owner = 7;
        update_file(&pool, &record).await.unwrap();

        let found = find_file_by_uri(&pool, "public://a.jpg").await.unwrap().unwrap();
        assert_eq!(found.owner, 7);
    }

    #[tokio::test]
    async fn test_list_files_newest_first() {
        let pool = pool().await;
        insert_file(&pool, &FileRecord::permanent("public://first.jpg", 0))
            .await
            .unwrap();
        insert_file(&pool, &FileRecord::permanent("public://second.jpg", 0))
            .await
            .unwrap();

        let files = list_files(&pool, 50).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].uri, "public://second.jpg");
        assert_eq!(files[1].uri, "public://first.jpg");

        let limited = list_files(&pool, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_file() {
        let pool = pool().await;
        let id = insert_file(&pool, &FileRecord::permanent("public://a.jpg", 0))
            .await
            .unwrap();

        assert!(delete_file(&pool, id).await.unwrap());
        assert!(!delete_file(&pool, id).await.unwrap());
        assert!(find_file_by_uri(&pool, "public://a.jpg").await.unwrap().is_none());
    }
}
