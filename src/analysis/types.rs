// Types module - Data structures for spectral analysis
//
// Plain values passed between the Welch estimator, band averaging and the
// scoring step.

use serde::Serialize;

/// One-sided power spectral density estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSpectrum {
    /// Bin centre frequencies in Hz, `k * fs / nfft`
    pub frequencies_hz: Vec<f64>,

    /// Power density per bin (signal units squared per Hz)
    pub density: Vec<f64>,

    /// Segment length actually used (shrinks for short signals)
    pub nperseg: usize,

    /// Number of segments averaged
    pub segments: usize,
}

impl PowerSpectrum {
    /// Frequency spacing between adjacent bins
    pub fn resolution_hz(&self) -> f64 {
        match self.frequencies_hz.get(1) {
            Some(&f1) => f1 - self.frequencies_hz[0],
            None => 0.0,
        }
    }
}

/// Mean PSD power in the two bands the score is built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPowers {
    /// Mean density over the theta band (numerator)
    pub theta: f64,

    /// Mean density over the alpha band (denominator)
    pub alpha: f64,
}
