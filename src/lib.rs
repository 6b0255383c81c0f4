// EEG Risk Dashboard - demonstration pipeline
// CSV upload -> band-pass -> Welch PSD -> theta/alpha score -> report

// Module declarations
pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod signal;

#[cfg(feature = "http")]
pub mod http;

// Re-exports for convenience
pub use config::AppConfig;
pub use error::{DatasetError, ErrorCode, PipelineError};
pub use pipeline::{analyze_bytes, analyze_path, analyze_reader, AnalysisReport, DISCLAIMER};

/// Install the global subscriber; `RUST_LOG` overrides the default level.
///
/// `log` records from the library are bridged into tracing. Calling this
/// more than once is harmless.
pub fn init_logging(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
