// Analysis - spectral risk scoring for filtered EEG
//
// Module organization:
// - types: Data structures (PowerSpectrum, BandPowers)
// - fft: FFT computation (power spectra, fast convolution)
// - welch: Welch PSD estimator
// - bands: Band averaging over the PSD
// - score: Ratio to bounded score, severity buckets
// - mod.rs: Coordinator (RiskAnalyzer)
//
// Pipeline: one channel -> Welch PSD -> theta/alpha means -> ratio -> score.

pub mod bands;
pub(crate) mod fft;
pub mod score;
pub mod types;
pub mod welch;

pub use score::{RiskScore, Severity};
pub use types::{BandPowers, PowerSpectrum};

use log::debug;
use serde::Serialize;

use crate::config::ScoringConfig;
use crate::error::PipelineError;
use crate::signal::MultiChannelSignal;
use welch::WelchEstimator;

/// Everything the scoring step computed, for reports and debugging
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub score: RiskScore,
    pub band_powers: BandPowers,
    /// Label of the channel the score was computed from
    pub channel: String,
}

/// RiskAnalyzer coordinates PSD estimation and scoring
pub struct RiskAnalyzer {
    scoring: ScoringConfig,
    welch: WelchEstimator,
}

impl RiskAnalyzer {
    pub fn new(scoring: ScoringConfig) -> Self {
        let welch = WelchEstimator::new(scoring.nperseg);
        Self { scoring, welch }
    }

    /// Score a filtered signal
    ///
    /// Only the configured channel (the first one by default) contributes.
    ///
    /// # Errors
    /// `EmptySignal` if the channel does not exist or has no samples, plus
    /// anything the Welch estimator, band averaging or scoring report.
    pub fn calculate_risk_score(
        &self,
        signal: &MultiChannelSignal,
    ) -> Result<RiskAssessment, PipelineError> {
        let index = self.scoring.channel_index;
        let samples = signal.channel(index).ok_or(PipelineError::EmptySignal)?;

        let spectrum = self.welch.estimate(samples, signal.sample_rate_hz())?;
        let band_powers = bands::band_powers(&spectrum, &self.scoring)?;
        let score = score::score_from_band_powers(band_powers, &self.scoring)?;

        debug!(
            "[Analysis] channel={} theta={:.6e} alpha={:.6e} ratio={:.3} score={}",
            signal.channel_names()[index],
            band_powers.theta,
            band_powers.alpha,
            score.ratio,
            score.value
        );

        Ok(RiskAssessment {
            score,
            band_powers,
            channel: signal.channel_names()[index].clone(),
        })
    }
}

impl Default for RiskAnalyzer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
