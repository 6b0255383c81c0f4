// Welch module - Averaged periodogram PSD estimation
//
// Splits the signal into half-overlapping segments, removes each segment's
// mean, applies a periodic Hann window and averages the scaled periodograms.
// Scaling is "density": the result integrates to the signal variance.

use crate::analysis::fft::FftProcessor;
use crate::analysis::types::PowerSpectrum;
use crate::error::PipelineError;

/// Welch PSD estimator with a fixed nominal segment length
pub struct WelchEstimator {
    nperseg: usize,
    fft: FftProcessor,
}

impl WelchEstimator {
    /// Create an estimator
    ///
    /// # Arguments
    /// * `nperseg` - Nominal segment length; also the FFT length
    pub fn new(nperseg: usize) -> Self {
        Self {
            nperseg,
            fft: FftProcessor::new(),
        }
    }

    /// Estimate the one-sided PSD of `samples`
    ///
    /// When the signal is shorter than the nominal segment length, a single
    /// segment spanning the whole signal is used instead.
    ///
    /// # Errors
    /// `EmptySignal` for an empty input, `InvalidSampleRate` for a
    /// non-positive rate, `InvalidConfig` for a zero segment length.
    pub fn estimate(
        &self,
        samples: &[f64],
        sample_rate_hz: f64,
    ) -> Result<PowerSpectrum, PipelineError> {
        if samples.is_empty() {
            return Err(PipelineError::EmptySignal);
        }
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(PipelineError::InvalidSampleRate { sample_rate_hz });
        }
        if self.nperseg == 0 {
            return Err(PipelineError::InvalidConfig {
                reason: "Welch segment length must be at least 1".to_string(),
            });
        }

        let nperseg = self.nperseg.min(samples.len());
        let noverlap = nperseg / 2;
        let step = nperseg - noverlap;
        let nfft = nperseg;

        let window = periodic_hann(nperseg);
        let window_power: f64 = window.iter().map(|w| w * w).sum();
        let scale = 1.0 / (sample_rate_hz * window_power);

        let n_bins = nfft / 2 + 1;
        let mut accumulated = vec![0.0; n_bins];
        let segments = (samples.len() - nperseg) / step + 1;

        let mut segment = vec![0.0; nperseg];
        for seg_idx in 0..segments {
            let start = seg_idx * step;
            let raw = &samples[start..start + nperseg];
            let mean = raw.iter().sum::<f64>() / nperseg as f64;

            for ((dst, &x), &w) in segment.iter_mut().zip(raw).zip(&window) {
                *dst = (x - mean) * w;
            }

            let power = self.fft.power_spectrum(&segment, nfft);
            for (acc, p) in accumulated.iter_mut().zip(power) {
                *acc += p;
            }
        }

        // Fold negative frequencies into the one-sided estimate. DC and (for
        // even nfft) Nyquist have no mirror bin.
        let last_doubled = if nfft % 2 == 0 { n_bins - 1 } else { n_bins };
        let density: Vec<f64> = accumulated
            .iter()
            .enumerate()
            .map(|(k, &acc)| {
                let mut value = acc * scale / segments as f64;
                if k > 0 && k < last_doubled {
                    value *= 2.0;
                }
                value
            })
            .collect();

        let frequencies_hz = (0..n_bins)
            .map(|k| k as f64 * sample_rate_hz / nfft as f64)
            .collect();

        Ok(PowerSpectrum {
            frequencies_hz,
            density,
            nperseg,
            segments,
        })
    }
}

/// Periodic Hann window (the DFT-even form used for spectral estimation)
fn periodic_hann(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / len as f64).cos())
        .collect()
}
