//! Configuration for the file import transform

use serde::{Deserialize, Serialize};

use crate::files::{ConflictPolicy, TransferMode};

/// Configuration for one file import field.
///
/// `source` names the row property whose value feeds the transform.
/// `destination` and a string `uid` resolve against the row at transform
/// time and stand for themselves when no such property exists, so both
/// can hold literals; a numeric `uid` is the owner id itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileImportConfig {
    /// Row property holding the file path or URL
    pub source: String,
    /// Destination URI, or a directory when it ends in `/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Owner of the created file record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<serde_json::Value>,
    /// Move local sources instead of copying them
    #[serde(default, rename = "move")]
    pub move_file: bool,
    /// Append a numeric suffix when the destination is taken
    #[serde(default)]
    pub rename: bool,
    /// Reuse a file already present at the destination
    #[serde(default)]
    pub reuse: bool,
    /// Skip the row (return no value) when the source does not exist
    #[serde(default)]
    pub skip_on_missing_source: bool,
    /// Return the bare file id instead of `{"target_id": id}`
    #[serde(default)]
    pub id_only: bool,
}

impl FileImportConfig {
    /// Config with defaults for everything but the source property.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: None,
            uid: None,
            move_file: false,
            rename: false,
            reuse: false,
            skip_on_missing_source: false,
            id_only: false,
        }
    }

    /// Conflict policy for this import.
    ///
    /// `rename` is evaluated first and wins over `reuse`; with neither set,
    /// existing destinations are replaced.
    pub fn conflict_policy(&self) -> ConflictPolicy {
        if self.rename {
            ConflictPolicy::Rename
        } else if self.reuse {
            ConflictPolicy::ErrorOnExisting
        } else {
            ConflictPolicy::Replace
        }
    }

    pub fn transfer_mode(&self) -> TransferMode {
        if self.move_file {
            TransferMode::Move
        } else {
            TransferMode::Copy
        }
    }
}
