// Error types for the EEG risk dashboard
//
// This module defines custom error types for the signal pipeline and the
// research data viewer, providing structured error handling with numeric
// codes that the CLI and HTTP layers surface verbatim.

mod dataset;
mod pipeline;

pub use dataset::{log_dataset_error, DatasetError, DatasetErrorCodes};
pub use pipeline::{log_pipeline_error, PipelineError, PipelineErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the CLI and HTTP boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
