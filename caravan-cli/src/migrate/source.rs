//! Import manifests and row sources

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::migrate::types::{FileImportConfig, Row};

/// Manifest describing one import run.
///
/// ```toml
/// source = "rows.csv"
/// field = "field_photo"
///
/// [import]
/// source = "photo"
/// destination = "public://images/"
/// rename = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ImportManifest {
    /// Rows file (`.json` or `.csv`); relative paths resolve against the
    /// manifest's own directory
    pub source: String,
    /// Destination field that receives the file record reference
    pub field: String,
    /// The file import configuration applied to every row
    pub import: FileImportConfig,
}

impl ImportManifest {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }

    /// Location of the rows file, resolved against the manifest's directory.
    pub fn rows_path(&self, manifest_path: &Path) -> PathBuf {
        let source = Path::new(&self.source);
        if source.is_absolute() {
            return source.to_path_buf();
        }
        match manifest_path.parent() {
            Some(dir) => dir.join(source),
            None => source.to_path_buf(),
        }
    }
}

/// Load rows from a JSON or CSV file, chosen by extension.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => load_json_rows(path),
        Some("csv") => load_csv_rows(path),
        _ => bail!(
            "Unsupported row source {} (expected a .json or .csv file)",
            path.display()
        ),
    }
}

/// A JSON rows file is a top-level array of flat objects, one row each.
fn load_json_rows(path: &Path) -> Result<Vec<Row>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rows from {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as a JSON array", path.display()))?;

    let mut rows = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let object = value
            .as_object()
            .with_context(|| format!("Row {} in {} is not an object", index, path.display()))?;
        rows.push(Row::from_object(object));
    }

    Ok(rows)
}

/// A CSV rows file names the properties in its header row; every cell
/// loads as a string value.
fn load_csv_rows(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to read rows from {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read headers from {}", path.display()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to read record from {}", path.display()))?;
        let mut source = HashMap::new();
        for (index, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(index) {
                // First header may carry a BOM
                let header = header.trim_matches('\u{feff}');
                source.insert(header.to_string(), Value::String(value.to_string()));
            }
        }
        rows.push(Row::new(source));
    }

    Ok(rows)
}
