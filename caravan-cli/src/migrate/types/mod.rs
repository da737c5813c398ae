//! Core types for file import migrations

pub mod config;
pub mod property;
pub mod report;
pub mod row;

pub use config::FileImportConfig;
pub use property::{PropertyReference, ReferenceTarget};
pub use report::{ImportReport, RowOutcome};
pub use row::Row;
