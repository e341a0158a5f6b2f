//! CSV manifest ingestion
//!
//! Loads a headered CSV manifest into [`AssetRecord`]s, keeping the header
//! row around so the pipeline can verify the required columns exist before
//! processing any row. Unrecognized columns are preserved opaquely.

use crate::error::Result;
use crate::types::AssetRecord;
use std::io::Read;
use std::path::Path;

/// Required manifest columns, in reporting order
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "unit-name", "url"];

/// Optional column carrying the MIME type hint
pub const MIME_HINT_COLUMN: &str = "metadata_mime_type";

/// A parsed manifest: header row plus mapped records
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    /// Column names exactly as they appeared in the header row
    columns: Vec<String>,
    /// Mapped rows, in manifest order
    records: Vec<AssetRecord>,
}

impl Dataset {
    /// Load a manifest from a CSV file on disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        Self::from_csv_reader(reader)
    }

    /// Load a manifest from any reader producing CSV text
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(map_record(&columns, &row));
        }

        tracing::debug!(
            columns = columns.len(),
            records = records.len(),
            "Manifest loaded"
        );

        Ok(Self { columns, records })
    }

    /// Column names from the header row
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Mapped records, in manifest order
    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    /// Number of rows in the manifest
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the manifest has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Which of the required columns are missing from the header row
    ///
    /// An empty result means the manifest is structurally valid; a non-empty
    /// result aborts the run before any row is processed.
    pub fn missing_required_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|required| !self.columns.iter().any(|c| c == *required))
            .copied()
            .collect()
    }
}

/// Map one CSV row onto an [`AssetRecord`] by column name
///
/// Short rows are padded with empty fields, matching how the csv crate reads
/// ragged data when columns are addressed positionally.
fn map_record(columns: &[String], row: &csv::StringRecord) -> AssetRecord {
    let mut record = AssetRecord::default();

    for (column, value) in columns.iter().zip(row.iter()) {
        match column.as_str() {
            "name" => record.display_name = value.trim().to_string(),
            "unit-name" => record.unit_label = value.trim().to_string(),
            "url" => record.source_uri = value.trim().to_string(),
            MIME_HINT_COLUMN => {
                let value = value.trim();
                if !value.is_empty() {
                    record.mime_hint = Some(value.to_string());
                }
            }
            other => {
                record
                    .extra
                    .insert(other.to_string(), value.to_string());
            }
        }
    }

    record
}

/// Convenience wrapper building a [`Dataset`] from in-memory CSV text
pub fn dataset_from_str(csv_text: &str) -> Result<Dataset> {
    Dataset::from_reader(csv_text.as_bytes())
}
