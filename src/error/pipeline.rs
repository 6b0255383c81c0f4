// Pipeline error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Pipeline error code constants
///
/// Single source of truth for the codes reported by the CLI exit payload
/// and the HTTP error body.
///
/// Error code range: 1001-1010
pub struct PipelineErrorCodes;

impl PipelineErrorCodes {
    /// Upload contained no header row
    pub const EMPTY_UPLOAD: i32 = 1001;

    /// CSV structure could not be read (ragged rows, bad quoting)
    pub const MALFORMED_TABLE: i32 = 1002;

    /// A cell did not parse as a finite number
    pub const NON_NUMERIC_VALUE: i32 = 1003;

    /// Signal has no samples (or the requested channel does not exist)
    pub const EMPTY_SIGNAL: i32 = 1004;

    /// Sampling rate must be positive and finite
    pub const INVALID_SAMPLE_RATE: i32 = 1005;

    /// Filter or scoring band edges are inconsistent
    pub const INVALID_BAND: i32 = 1006;

    /// No PSD bins fall inside a scoring band
    pub const EMPTY_BAND: i32 = 1007;

    /// Band ratio was NaN or infinite
    pub const NON_FINITE_SCORE: i32 = 1008;

    /// Reading the upload from disk failed
    pub const IO: i32 = 1009;

    /// Configuration values are inconsistent
    pub const INVALID_CONFIG: i32 = 1010;
}

/// Log a pipeline error with structured context
///
/// Emits the numeric code, the component, and the message on one line so
/// failed uploads can be grepped out of the server log.
pub fn log_pipeline_error(err: &PipelineError, context: &str) {
    error!(
        "Pipeline error in {}: code={}, component=SignalPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Signal pipeline errors
///
/// These cover parsing an uploaded table, filtering it, and scoring the
/// filtered signal. Nothing in the pipeline panics on bad input; every
/// failure ends up here.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Upload contained no header row at all
    EmptyUpload,

    /// CSV structure could not be read
    MalformedTable { reason: String },

    /// Cell at (row, column) is not a finite number; `row` is 1-based and
    /// counts data rows only
    NonNumericValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Signal has no samples to work with
    EmptySignal,

    /// Sampling rate is zero, negative or not finite
    InvalidSampleRate { sample_rate_hz: f64 },

    /// Band edges violate `0 < low < high <= nyquist`
    InvalidBand { low_hz: f64, high_hz: f64 },

    /// No PSD bins inside the named band
    EmptyBand {
        band: &'static str,
        low_hz: f64,
        high_hz: f64,
    },

    /// Band ratio could not be turned into a score
    NonFiniteScore { ratio: f64 },

    /// Reading the upload failed
    Io { details: String },

    /// Configuration values are inconsistent
    InvalidConfig { reason: String },
}

impl ErrorCode for PipelineError {
    fn code(&self) -> i32 {
        match self {
            PipelineError::EmptyUpload => PipelineErrorCodes::EMPTY_UPLOAD,
            PipelineError::MalformedTable { .. } => PipelineErrorCodes::MALFORMED_TABLE,
            PipelineError::NonNumericValue { .. } => PipelineErrorCodes::NON_NUMERIC_VALUE,
            PipelineError::EmptySignal => PipelineErrorCodes::EMPTY_SIGNAL,
            PipelineError::InvalidSampleRate { .. } => PipelineErrorCodes::INVALID_SAMPLE_RATE,
            PipelineError::InvalidBand { .. } => PipelineErrorCodes::INVALID_BAND,
            PipelineError::EmptyBand { .. } => PipelineErrorCodes::EMPTY_BAND,
            PipelineError::NonFiniteScore { .. } => PipelineErrorCodes::NON_FINITE_SCORE,
            PipelineError::Io { .. } => PipelineErrorCodes::IO,
            PipelineError::InvalidConfig { .. } => PipelineErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            PipelineError::EmptyUpload => "Uploaded file is empty (no header row)".to_string(),
            PipelineError::MalformedTable { reason } => {
                format!("Malformed CSV table: {}", reason)
            }
            PipelineError::NonNumericValue { row, column, value } => {
                format!(
                    "Non-numeric value {:?} in column {:?} at data row {}",
                    value, column, row
                )
            }
            PipelineError::EmptySignal => "Signal contains no samples".to_string(),
            PipelineError::InvalidSampleRate { sample_rate_hz } => {
                format!(
                    "Sample rate must be a positive number (got {})",
                    sample_rate_hz
                )
            }
            PipelineError::InvalidBand { low_hz, high_hz } => {
                format!(
                    "Invalid frequency band {}-{} Hz (need 0 < low < high <= Nyquist)",
                    low_hz, high_hz
                )
            }
            PipelineError::EmptyBand {
                band,
                low_hz,
                high_hz,
            } => {
                format!(
                    "No spectral bins inside the {} band ({}-{} Hz); signal too short",
                    band, low_hz, high_hz
                )
            }
            PipelineError::NonFiniteScore { ratio } => {
                format!("Band power ratio is not finite (got {})", ratio)
            }
            PipelineError::Io { details } => format!("I/O error: {}", details),
            PipelineError::InvalidConfig { reason } => {
                format!("Invalid configuration: {}", reason)
            }
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PipelineError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io {
            details: err.to_string(),
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            return PipelineError::Io {
                details: err.to_string(),
            };
        }
        PipelineError::MalformedTable {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_codes() {
        assert_eq!(PipelineError::EmptyUpload.code(), 1001);
        assert_eq!(
            PipelineError::MalformedTable {
                reason: "test".to_string()
            }
            .code(),
            1002
        );
        assert_eq!(
            PipelineError::NonNumericValue {
                row: 1,
                column: "Fz".to_string(),
                value: "abc".to_string()
            }
            .code(),
            1003
        );
        assert_eq!(PipelineError::EmptySignal.code(), 1004);
        assert_eq!(
            PipelineError::InvalidSampleRate {
                sample_rate_hz: 0.0
            }
            .code(),
            1005
        );
        assert_eq!(
            PipelineError::InvalidBand {
                low_hz: 40.0,
                high_hz: 1.0
            }
            .code(),
            1006
        );
        assert_eq!(
            PipelineError::EmptyBand {
                band: "theta",
                low_hz: 4.0,
                high_hz: 8.0
            }
            .code(),
            1007
        );
        assert_eq!(
            PipelineError::NonFiniteScore { ratio: f64::NAN }.code(),
            1008
        );
        assert_eq!(
            PipelineError::Io {
                details: "test".to_string()
            }
            .code(),
            1009
        );
    }

    #[test]
    fn test_non_numeric_message_names_cell() {
        let err = PipelineError::NonNumericValue {
            row: 3,
            column: "Cz".to_string(),
            value: "n/a".to_string(),
        };
        let message = err.message();
        assert!(message.contains("\"n/a\""));
        assert!(message.contains("\"Cz\""));
        assert!(message.contains("row 3"));
    }

    #[test]
    fn test_display_includes_code() {
        let err = PipelineError::EmptySignal;
        assert_eq!(
            err.to_string(),
            "PipelineError (code 1004): Signal contains no samples"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing upload");
        let err: PipelineError = io_err.into();

        match err {
            PipelineError::Io { details } => assert!(details.contains("missing upload")),
            _ => panic!("Expected Io variant"),
        }
    }
}
