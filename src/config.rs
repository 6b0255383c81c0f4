//! Configuration management for the dashboard and signal pipeline
//!
//! This module provides runtime configuration loading from JSON files so the
//! filter band, fallback shape and scoring constants can be adjusted without
//! recompilation. Every section has defaults matching the demo dashboard, and
//! a partial file only overrides the keys it names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Default config location relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub scoring: ScoringConfig,
    pub dashboard: DashboardConfig,
}

/// Band-pass filter implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMethod {
    /// Hamming-windowed sinc FIR, applied zero-phase
    Fir,
    /// Butterworth biquads run forward and backward
    Iir,
}

/// Signal preparation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sampling rate assumed for every uploaded table
    pub sample_rate_hz: f64,
    /// High-pass edge of the band-pass filter
    pub l_freq_hz: f64,
    /// Low-pass edge of the band-pass filter
    pub h_freq_hz: f64,
    pub filter_method: FilterMethod,
    /// Tables with fewer columns than this get the synthetic fallback
    pub min_columns: usize,
    pub fallback_channels: usize,
    pub fallback_samples: usize,
    /// Seed for the fallback noise; `None` draws from OS entropy
    pub fallback_seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 250.0,
            l_freq_hz: 1.0,
            h_freq_hz: 40.0,
            filter_method: FilterMethod::Fir,
            min_columns: 2,
            fallback_channels: 19,
            fallback_samples: 1000,
            fallback_seed: None,
        }
    }
}

/// Inclusive frequency band used for PSD averaging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Band {
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.low_hz && freq_hz <= self.high_hz
    }
}

/// Risk scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Channel the score is computed from
    pub channel_index: usize,
    /// Welch segment length in samples
    pub nperseg: usize,
    pub theta_band: Band,
    pub alpha_band: Band,
    /// Multiplier applied to theta/alpha before truncation
    pub ratio_scale: f64,
    /// Added to the alpha mean to avoid division by zero
    pub epsilon: f64,
    pub min_score: u8,
    pub max_score: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            channel_index: 0,
            nperseg: 256,
            theta_band: Band::new(4.0, 8.0),
            alpha_band: Band::new(8.0, 12.0),
            ratio_scale: 10.0,
            epsilon: 1e-6,
            min_score: 10,
            max_score: 95,
        }
    }
}

/// Dashboard surface parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind_addr: String,
    /// Number of filtered samples drawn in the trace plot
    pub plot_samples: usize,
    pub demographic_path: PathBuf,
    /// Scores strictly above this are high risk
    pub high_risk_threshold: u8,
    /// Scores strictly above this (and not high) are moderate risk
    pub moderate_risk_threshold: u8,
    pub max_upload_bytes: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            plot_samples: 500,
            demographic_path: PathBuf::from("data/demographic.csv"),
            high_risk_threshold: 70,
            moderate_risk_threshold: 40,
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration. If the file doesn't exist or the JSON is
    /// invalid, logs a warning and returns the default config.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), PipelineError> {
        let fs = self.pipeline.sample_rate_hz;
        if !fs.is_finite() || fs <= 0.0 {
            return Err(PipelineError::InvalidSampleRate { sample_rate_hz: fs });
        }

        let nyquist = fs / 2.0;
        let pipeline = &self.pipeline;
        if !(pipeline.l_freq_hz > 0.0
            && pipeline.l_freq_hz < pipeline.h_freq_hz
            && pipeline.h_freq_hz < nyquist)
        {
            return Err(PipelineError::InvalidBand {
                low_hz: pipeline.l_freq_hz,
                high_hz: pipeline.h_freq_hz,
            });
        }

        for band in [self.scoring.theta_band, self.scoring.alpha_band] {
            if !(band.low_hz >= 0.0 && band.low_hz <= band.high_hz && band.high_hz <= nyquist) {
                return Err(PipelineError::InvalidBand {
                    low_hz: band.low_hz,
                    high_hz: band.high_hz,
                });
            }
        }

        if self.scoring.nperseg == 0 {
            return Err(PipelineError::InvalidConfig {
                reason: "scoring.nperseg must be at least 1".to_string(),
            });
        }

        if self.scoring.min_score > self.scoring.max_score {
            return Err(PipelineError::InvalidConfig {
                reason: format!(
                    "scoring.min_score {} exceeds scoring.max_score {}",
                    self.scoring.min_score, self.scoring.max_score
                ),
            });
        }

        Ok(())
    }
}
