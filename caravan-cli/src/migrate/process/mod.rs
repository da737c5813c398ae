//! Per-field transform steps

pub mod file_import;

pub use file_import::{FileImportTransform, ImportError};
