//! Persisting output units.
//!
//! One JSON workbook per store: the `info`, `menu`, and `review` tables plus
//! the capture metadata. Each file is written to a temporary sibling and
//! renamed into place, so an interrupted run never leaves a truncated unit.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use placescrape_core::{ExpansionReport, StoreOutputUnit, Table};
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

/// File-name stem used when a store has no name on its profile.
const UNNAMED_STORE: &str = "unnamed";

/// Common file-name length limit (ext4, APFS, NTFS).
const MAX_FILE_NAME_BYTES: usize = 255;

#[derive(Debug, Error)]
pub(crate) enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize store {store_id}: {source}")]
    Serialize {
        store_id: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) trait OutputSink {
    /// Persist one unit and return where it went.
    fn write_unit(&self, unit: &StoreOutputUnit) -> Result<PathBuf, SinkError>;
}

#[derive(Serialize)]
struct Workbook<'a> {
    store_id: &'a str,
    captured_at: DateTime<Utc>,
    menu_expansion: ExpansionReport,
    review_expansion: ExpansionReport,
    tables: BTreeMap<&'static str, Table>,
}

#[derive(Debug, Clone)]
pub(crate) struct JsonWorkbookSink {
    output_dir: PathBuf,
}

impl JsonWorkbookSink {
    pub(crate) fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Create the output directory if it does not exist yet.
    pub(crate) fn ensure_dir(&self) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| io_error(&self.output_dir, source))
    }
}

impl OutputSink for JsonWorkbookSink {
    fn write_unit(&self, unit: &StoreOutputUnit) -> Result<PathBuf, SinkError> {
        self.ensure_dir()?;

        let capture_date = unit.captured_at.with_timezone(&Local).date_naive();
        let path = self
            .output_dir
            .join(artifact_file_name(unit.profile.name(), &unit.store_id, capture_date));

        let workbook = Workbook {
            store_id: &unit.store_id,
            captured_at: unit.captured_at,
            menu_expansion: unit.menu_expansion,
            review_expansion: unit.review_expansion,
            tables: unit.tables().into_iter().map(|table| (table.name, table)).collect(),
        };
        let body = serde_json::to_vec_pretty(&workbook).map_err(|source| SinkError::Serialize {
            store_id: unit.store_id.clone(),
            source,
        })?;

        let mut temp = NamedTempFile::new_in(&self.output_dir).map_err(|source| io_error(&self.output_dir, source))?;
        temp.write_all(&body).map_err(|source| io_error(temp.path(), source))?;
        temp.persist(&path).map_err(|e| io_error(&path, e.error))?;

        Ok(path)
    }
}

/// `{store_name}_{store_id}_{YYYY-MM-DD}.json` with characters that are
/// unsafe in file names removed. Long names are cut so the id, date, and
/// extension always fit within the file-name limit.
pub(crate) fn artifact_file_name(store_name: &str, store_id: &str, capture_date: NaiveDate) -> String {
    let store_id = sanitize_filename::sanitize(store_id);
    let suffix = format!("_{store_id}_{}.json", capture_date.format("%Y-%m-%d"));

    let store_name = sanitize_filename::sanitize(store_name.trim());
    let store_name = truncate_at_char_boundary(
        store_name.trim(),
        MAX_FILE_NAME_BYTES.saturating_sub(suffix.len()),
    );
    let store_name = if store_name.is_empty() {
        UNNAMED_STORE
    } else {
        store_name
    };

    format!("{store_name}{suffix}")
}

fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod tests;
