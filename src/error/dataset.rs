// Research dataset error types

use crate::error::ErrorCode;
use log::error;
use std::fmt;
use std::path::PathBuf;

/// Dataset error code constants
///
/// Error code range: 2001
pub struct DatasetErrorCodes;

impl DatasetErrorCodes {
    /// Demographic table missing or unreadable
    pub const UNAVAILABLE: i32 = 2001;
}

/// Log a dataset error with the underlying detail
///
/// The user-facing message is deliberately generic, so the detail only
/// reaches the log.
pub fn log_dataset_error(err: &DatasetError, context: &str) {
    match err {
        DatasetError::Unavailable { path, details } => error!(
            "Dataset error in {}: code={}, component=ResearchData, path={}, details={}",
            context,
            err.code(),
            path.display(),
            details
        ),
    }
}

/// Research data errors
///
/// Every failure to read the demographic table (missing file, permission
/// problem, broken CSV) collapses into a single variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    Unavailable { path: PathBuf, details: String },
}

impl ErrorCode for DatasetError {
    fn code(&self) -> i32 {
        match self {
            DatasetError::Unavailable { .. } => DatasetErrorCodes::UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            DatasetError::Unavailable { path, .. } => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "demographic.csv".to_string());
                format!("{} not found in data folder.", name)
            }
        }
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for DatasetError {}
