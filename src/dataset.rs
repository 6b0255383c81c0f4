//! Research data viewer.
//!
//! Reads the demographic metadata table that accompanies the training
//! dataset and hands it back verbatim, one string per cell. Nothing is
//! parsed or validated; the table is only displayed.

use std::path::Path;

use serde::Serialize;

use crate::error::{log_dataset_error, DatasetError};

/// Demographic table as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DemographicTable {
    /// Read the table at `path`
    ///
    /// Rows may have differing lengths; they are kept as-is.
    ///
    /// # Errors
    /// Any failure becomes `DatasetError::Unavailable`, which carries a
    /// generic user-facing message. The underlying cause is logged.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let result = Self::read(path).map_err(|err| DatasetError::Unavailable {
            path: path.to_path_buf(),
            details: err.to_string(),
        });

        if let Err(err) = &result {
            log_dataset_error(err, "DemographicTable::load");
        }
        result
    }

    fn read(path: &Path) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
