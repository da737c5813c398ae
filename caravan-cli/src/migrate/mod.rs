//! File import migrations
//!
//! This module provides the migration side of file imports: rows loaded
//! from a manifest, the file import transform applied per row, record
//! persistence, and the report summarizing a run.

pub mod pipeline;
pub mod process;
pub mod source;
pub mod store;
pub mod types;

pub use pipeline::{CollectingSink, ImportRunner, MessageSink};
pub use process::{FileImportTransform, ImportError};
pub use source::ImportManifest;
pub use store::{FileRecord, FileRecordStore, FileStatus, MemoryFileStore, SqliteFileStore};
