//! Managed file storage
//!
//! This module provides the storage side of file imports: URI helpers,
//! the scheme registry mapping storage schemes to local directories, the
//! transfer service that moves bytes into storage, and existence probes
//! for sources.

pub mod probe;
pub mod storage;
pub mod transfer;
pub mod uri;

pub use probe::{DefaultSourceProbe, SourceProbe};
pub use storage::SchemeRegistry;
pub use transfer::{
    ConflictPolicy, DryRunTransfer, FileTransfer, LocalFileTransfer, TransferError, TransferMode,
};
