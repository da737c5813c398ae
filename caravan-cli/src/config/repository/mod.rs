//! Repository layer for database operations

pub mod files;
