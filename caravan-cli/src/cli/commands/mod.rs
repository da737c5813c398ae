pub mod files;
pub mod import;
