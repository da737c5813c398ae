//! Sequential import runner and row-message plumbing

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::migrate::process::FileImportTransform;
use crate::migrate::types::{ImportReport, PropertyReference, Row, RowOutcome};

/// Receives human-readable messages raised while a row is transformed.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn log_message(&self, message: &str);
}

/// Sink that keeps messages for the final report and mirrors them to the log.
#[derive(Default)]
pub struct CollectingSink {
    messages: tokio::sync::Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected messages.
    pub async fn messages(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }

    /// Take all collected messages, leaving the sink empty.
    pub async fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().await)
    }
}

#[async_trait]
impl MessageSink for CollectingSink {
    async fn log_message(&self, message: &str) {
        log::warn!("{}", message);
        self.messages.lock().await.push(message.to_string());
    }
}

/// Runs one file import across a set of rows, one row at a time.
///
/// A failed row is recorded in the report and the run continues; rows are
/// never retried.
pub struct ImportRunner {
    field: String,
    transform: FileImportTransform,
    sink: Arc<CollectingSink>,
}

impl ImportRunner {
    pub fn new(field: impl Into<String>, transform: FileImportTransform, sink: Arc<CollectingSink>) -> Self {
        Self {
            field: field.into(),
            transform,
            sink,
        }
    }

    /// Transform every row, writing successful values onto the destination
    /// field, and return the report.
    pub async fn run(&self, rows: &mut [Row]) -> ImportReport {
        let mut report = ImportReport::new(&self.field);

        for (index, row) in rows.iter_mut().enumerate() {
            let source_value = PropertyReference::lookup(&self.transform.config().source, row)
                .unwrap_or(Value::Null);

            match self.transform.transform(&source_value, row).await {
                Ok(Some(value)) => {
                    row.set_destination_property(&self.field, value.clone());
                    report.add_outcome(RowOutcome::imported(value));
                }
                Ok(None) => {
                    report.add_outcome(RowOutcome::skipped());
                }
                Err(e) => {
                    log::warn!("Row {}: {:#}", index, e);
                    report.add_outcome(RowOutcome::failed(format!("{:#}", e)));
                }
            }
        }

        for message in self.sink.drain().await {
            report.add_message(message);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{DefaultSourceProbe, LocalFileTransfer, SchemeRegistry};
    use crate::migrate::store::MemoryFileStore;
    use crate::migrate::types::FileImportConfig;
    use serde_json::json;

    #[tokio::test]
    async fn test_collecting_sink_keeps_messages_in_order() {
        let sink = CollectingSink::new();
        sink.log_message("first").await;
        sink.log_message("second").await;

        assert_eq!(sink.messages().await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_collecting_sink_drain_empties() {
        let sink = CollectingSink::new();
        sink.log_message("only").await;

        assert_eq!(sink.drain().await, vec!["only"]);
        assert!(sink.messages().await.is_empty());
    }

    struct RunnerFixture {
        storage: tempfile::TempDir,
        store: Arc<MemoryFileStore>,
    }

    impl RunnerFixture {
        fn new() -> Self {
            Self {
                storage: tempfile::tempdir().unwrap(),
                store: Arc::new(MemoryFileStore::new()),
            }
        }

        fn runner(&self, field: &str, config: FileImportConfig) -> ImportRunner {
            let schemes = Arc::new(SchemeRegistry::new(self.storage.path()));
            let sink = Arc::new(CollectingSink::new());
            let transform = FileImportTransform::new(
                config,
                Arc::new(LocalFileTransfer::new(schemes.clone())),
                self.store.clone(),
                Arc::new(DefaultSourceProbe::new(schemes.clone())),
                schemes,
                sink.clone(),
            );
            ImportRunner::new(field, transform, sink)
        }
    }

    fn write_source(dir: &tempfile::TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, b"bytes").unwrap();
        path.to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_run_records_an_outcome_per_row() {
        let sources = tempfile::tempdir().unwrap();
        let present = write_source(&sources, "photo.jpg");
        let missing = sources.path().join("gone.jpg");

        let fixture = RunnerFixture::new();
        let runner = fixture.runner("field_photo", FileImportConfig::new("photo"));

        let mut rows = vec![Row::default(), Row::default(), Row::default()];
        rows[0].set_source_property("photo", json!(present));
        // rows[1] has no photo property at all
        rows[2].set_source_property("photo", json!(missing.to_str().unwrap()));

        let report = runner.run(&mut rows).await;

        assert_eq!(report.field, "field_photo");
        assert_eq!(report.total(), 3);
        assert_eq!(report.imported_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);

        assert_eq!(
            rows[0].destination_property("field_photo"),
            Some(&json!({ "target_id": 1 }))
        );
        assert_eq!(rows[1].destination_property("field_photo"), None);
        assert_eq!(rows[2].destination_property("field_photo"), None);

        match &report.outcomes[2] {
            RowOutcome::Failed { message } => assert!(message.contains("gone.jpg")),
            other => panic!("expected a failure, got {:?}", other),
        }

        // The imported file landed in storage and got a record
        assert!(fixture.storage.path().join("photo.jpg").exists());
        let records = fixture.store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].uri, "public://photo.jpg");
    }

    #[tokio::test]
    async fn test_run_continues_past_failures() {
        let sources = tempfile::tempdir().unwrap();
        let missing = sources.path().join("gone.jpg");
        let present = write_source(&sources, "photo.jpg");

        let fixture = RunnerFixture::new();
        let runner = fixture.runner("field_photo", FileImportConfig::new("photo"));

        let mut rows = vec![Row::default(), Row::default()];
        rows[0].set_source_property("photo", json!(missing.to_str().unwrap()));
        rows[1].set_source_property("photo", json!(present));

        let report = runner.run(&mut rows).await;

        assert!(report.outcomes[0].is_failed());
        assert!(report.outcomes[1].is_imported());
    }

    #[tokio::test]
    async fn test_run_carries_skip_messages_into_the_report() {
        let sources = tempfile::tempdir().unwrap();
        let missing = sources.path().join("gone.jpg");

        let fixture = RunnerFixture::new();
        let mut config = FileImportConfig::new("photo");
        config.skip_on_missing_source = true;
        let runner = fixture.runner("field_photo", config);

        let mut rows = vec![Row::default()];
        rows[0].set_source_property("photo", json!(missing.to_str().unwrap()));

        let report = runner.run(&mut rows).await;

        assert_eq!(report.skipped_count(), 1);
        assert!(!report.has_failures());
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].contains("gone.jpg"));
        assert!(fixture.store.records().await.is_empty());
    }
}
