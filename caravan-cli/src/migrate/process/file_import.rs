//! Field transform that imports a referenced file into managed storage

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use crate::files::{uri, ConflictPolicy, FileTransfer, SchemeRegistry, SourceProbe};
use crate::migrate::pipeline::MessageSink;
use crate::migrate::store::{FileRecord, FileRecordStore};
use crate::migrate::types::{FileImportConfig, PropertyReference, Row};

/// Unrecoverable failure while importing one file.
///
/// Carries the source and the requested (pre-rename) destination so the
/// operator can see which transfer went wrong.
#[derive(Debug)]
pub struct ImportError {
    pub source: String,
    pub destination: String,
    pub reason: String,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Import of {} to {} failed: {}",
            self.source, self.destination, self.reason
        )
    }
}

impl std::error::Error for ImportError {}

/// Imports the file a row points at and yields a file record reference.
///
/// All side effects go through the injected collaborators: `transfer` moves
/// bytes, `store` persists records, `probe` answers source existence, and
/// `messages` receives operator-facing notes. Swapping them out is how the
/// tests and the dry-run mode work.
///
/// Assumes a single writer. Nothing locks between the reuse existence check
/// and record creation, so concurrent runs against the same destination can
/// race; the unique uri column catches the collision as an error.
pub struct FileImportTransform {
    config: FileImportConfig,
    transfer: Arc<dyn FileTransfer>,
    store: Arc<dyn FileRecordStore>,
    probe: Arc<dyn SourceProbe>,
    schemes: Arc<SchemeRegistry>,
    messages: Arc<dyn MessageSink>,
}

impl FileImportTransform {
    pub fn new(
        config: FileImportConfig,
        transfer: Arc<dyn FileTransfer>,
        store: Arc<dyn FileRecordStore>,
        probe: Arc<dyn SourceProbe>,
        schemes: Arc<SchemeRegistry>,
        messages: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            config,
            transfer,
            store,
            probe,
            schemes,
            messages,
        }
    }

    pub fn config(&self) -> &FileImportConfig {
        &self.config
    }

    /// Import the file named by `source_value`.
    ///
    /// Returns `None` when the value is empty, or when the source is missing
    /// and the import is configured to skip such rows. On success, the value
    /// to write onto the row's destination field.
    pub async fn transform(&self, source_value: &Value, row: &Row) -> Result<Option<Value>> {
        // Empty values produce no file and touch nothing.
        if is_empty_value(source_value) {
            return Ok(None);
        }
        let source = value_to_text(source_value);

        let destination_base = self.resolve_destination(row);
        let owner = self.resolve_owner(row);

        if self.config.skip_on_missing_source && !self.probe.exists(&source).await? {
            let message = format!("Source file {} does not exist, skipping row", source);
            self.messages.log_message(&message).await;
            return Ok(None);
        }

        let destination = self.destination_path(&source, &destination_base);
        let policy = self.config.conflict_policy();

        // When overwriting is forbidden and a local source's destination is
        // already occupied, reuse what is there instead of transferring.
        let mut reused_uri = None;
        if policy == ConflictPolicy::ErrorOnExisting && self.schemes.is_local(&source) {
            if let Some(path) = self.schemes.resolve(&destination) {
                if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    if let Some(existing) = self.store.find_by_uri(&destination).await? {
                        if let Some(id) = existing.id {
                            log::debug!("Reusing file record {} for {}", id, destination);
                            return Ok(Some(self.wrap_id(id)));
                        }
                    }
                    // On disk but not on record: adopt the path as-is and
                    // create the record below without transferring.
                    reused_uri = Some(destination.clone());
                }
            }
        }

        let final_uri = match reused_uri {
            Some(uri) => uri,
            None => {
                let mode = self.config.transfer_mode();
                match self.transfer.transfer(&source, &destination, mode, policy).await {
                    Ok(uri) => uri,
                    Err(e) => {
                        return Err(ImportError {
                            source,
                            destination,
                            reason: e.to_string(),
                        }
                        .into());
                    }
                }
            }
        };

        let mut record = FileRecord::permanent(final_uri, owner);
        // Replacing an occupied destination adopts its record, so ids stay
        // stable across re-imports.
        if let Some(existing) = self.store.find_by_uri(&record.uri).await? {
            record.id = existing.id;
        }
        let id = self.store.save(&mut record).await?;
        Ok(Some(self.wrap_id(id)))
    }

    /// Destination base from configuration; the default storage root when
    /// nothing usable resolves.
    fn resolve_destination(&self, row: &Row) -> String {
        let resolved = self
            .config
            .destination
            .as_deref()
            .and_then(|raw| resolve_config_value(raw, row));
        match resolved {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => self.schemes.default_scheme_prefix(),
        }
    }

    /// Owner id from configuration; anonymous (0) when nothing resolves.
    fn resolve_owner(&self, row: &Row) -> i64 {
        let configured = match &self.config.uid {
            Some(value) => value,
            None => return 0,
        };
        // Strings resolve against the row; anything else is the owner
        // id itself.
        let resolved = match configured {
            Value::String(raw) => resolve_config_value(raw, row),
            other => Some(other.clone()),
        };
        match resolved {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Final destination URI: directories get the source's base name
    /// appended, and schemeless paths get the default scheme.
    fn destination_path(&self, source: &str, destination: &str) -> String {
        let path = if uri::ends_with_separator(destination) {
            format!("{}{}", destination, uri::base_name(source))
        } else {
            destination.to_string()
        };
        uri::apply_default_scheme(&path, self.schemes.default_scheme())
    }

    fn wrap_id(&self, id: i64) -> Value {
        if self.config.id_only {
            Value::from(id)
        } else {
            json!({ "target_id": id })
        }
    }
}

/// Resolve a configuration value against the row.
///
/// Sigiled values are row lookups and come back absent when the property
/// is missing. A sigil-less value is tried as a source property first and
/// stands for itself when no such property exists, so configuration can
/// hold literal URIs and owner ids.
fn resolve_config_value(raw: &str, row: &Row) -> Option<Value> {
    let resolved = PropertyReference::lookup(raw, row);
    if resolved.is_none() && !raw.is_empty() && !raw.starts_with('@') {
        return Some(Value::String(raw.to_string()));
    }
    resolved
}

/// Empty values short-circuit the transform: null, false, zero, the empty
/// string, and the empty array all count.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(_) => false,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
