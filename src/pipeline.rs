//! End-to-end analysis of one upload.
//!
//! load -> filter -> Welch PSD -> band ratio -> score -> report. The report
//! is the single value every surface (CLI, JSON API, HTML page) renders.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::analysis::{BandPowers, RiskAnalyzer, Severity};
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::signal::{self, SignalOrigin};

/// Shown next to every score
pub const DISCLAIMER: &str = "Demonstration only. The score is a theta/alpha power-ratio \
heuristic that has not been validated against clinical labels and is not a diagnosis.";

/// Everything needed to render the analysis of one upload
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Risk percentage in `[min_score, max_score]`
    pub score: u8,
    pub ratio: f64,
    pub severity: Severity,
    pub banner: &'static str,
    /// `score / 100`
    pub progress: f64,
    pub band_powers: BandPowers,
    /// Label of the channel that was scored and plotted
    pub channel: String,
    pub channel_count: usize,
    pub sample_count: usize,
    pub sample_rate_hz: f64,
    pub duration_secs: f64,
    /// First filtered samples of the scored channel
    pub trace: Vec<f64>,
    pub origin: SignalOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub disclaimer: &'static str,
}

/// Analyse an upload from any reader
pub fn analyze_reader<R: Read>(
    input: R,
    config: &AppConfig,
) -> Result<AnalysisReport, PipelineError> {
    config.validate()?;

    let prepared = signal::run_cleaning_pipeline(input, &config.pipeline)?;
    let assessment =
        RiskAnalyzer::new(config.scoring.clone()).calculate_risk_score(&prepared.signal)?;

    let score = assessment.score;
    let severity = Severity::classify(score.value, &config.dashboard);

    let trace = prepared
        .signal
        .channel(config.scoring.channel_index)
        .map(|samples| {
            let end = samples.len().min(config.dashboard.plot_samples);
            samples[..end].to_vec()
        })
        .unwrap_or_default();

    info!(
        "[Pipeline] score={} severity={:?} channels={} samples={} fallback={}",
        score.value,
        severity,
        prepared.signal.n_channels(),
        prepared.signal.n_samples(),
        prepared.origin.is_fallback()
    );

    Ok(AnalysisReport {
        score: score.value,
        ratio: score.ratio,
        severity,
        banner: severity.banner(),
        progress: score.progress(),
        band_powers: assessment.band_powers,
        channel: assessment.channel,
        channel_count: prepared.signal.n_channels(),
        sample_count: prepared.signal.n_samples(),
        sample_rate_hz: prepared.signal.sample_rate_hz(),
        duration_secs: prepared.signal.duration_secs(),
        trace,
        notice: prepared.origin.notice(),
        origin: prepared.origin,
        disclaimer: DISCLAIMER,
    })
}

/// Analyse an in-memory upload
pub fn analyze_bytes(bytes: &[u8], config: &AppConfig) -> Result<AnalysisReport, PipelineError> {
    analyze_reader(bytes, config)
}

/// Analyse a CSV file on disk
pub fn analyze_path<P: AsRef<Path>>(
    path: P,
    config: &AppConfig,
) -> Result<AnalysisReport, PipelineError> {
    let file = File::open(path.as_ref())?;
    analyze_reader(BufReader::new(file), config)
}
