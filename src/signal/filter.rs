//! Zero-phase band-pass filters for multichannel EEG.
//!
//! The default is a linear-phase FIR (Hamming-windowed sinc) whose length and
//! transition bands are derived from the pass band the same way common EEG
//! toolkits pick them automatically. The filter is centred on each sample so
//! the output has no group delay. An IIR alternative runs Butterworth
//! biquads forward and backward.

use log::debug;

use crate::analysis::fft::FftProcessor;
use crate::config::{FilterMethod, PipelineConfig};
use crate::error::PipelineError;

/// Transition-band length multiplier for a Hamming window
const HAMMING_LENGTH_FACTOR: f64 = 3.3;

/// Filter applied to one channel at a time without shifting it in time
pub trait ZeroPhaseFilter {
    fn apply(&self, samples: &[f64]) -> Vec<f64>;
}

/// Validate `0 < low < high < fs/2`
fn check_band(sample_rate_hz: f64, low_hz: f64, high_hz: f64) -> Result<(), PipelineError> {
    if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return Err(PipelineError::InvalidSampleRate { sample_rate_hz });
    }
    if !(low_hz > 0.0 && low_hz < high_hz && high_hz < sample_rate_hz / 2.0) {
        return Err(PipelineError::InvalidBand { low_hz, high_hz });
    }
    Ok(())
}

/// Linear-phase FIR band-pass
pub struct FirBandPass {
    taps: Vec<f64>,
    /// Width of the lower transition band (Hz)
    pub l_trans_hz: f64,
    /// Width of the upper transition band (Hz)
    pub h_trans_hz: f64,
    fft: FftProcessor,
}

impl FirBandPass {
    /// Design the filter for a pass band
    ///
    /// Transition bands: `l_trans = min(max(0.25 * low, 2), low)` and
    /// `h_trans = min(max(0.25 * high, 2), fs/2 - high)`. Length is
    /// `3.3 * fs / min(l_trans, h_trans)` rounded and forced odd. The -6 dB
    /// points sit in the middle of each transition band, and the taps are
    /// scaled to unity gain at the pass-band centre.
    pub fn design(sample_rate_hz: f64, low_hz: f64, high_hz: f64) -> Result<Self, PipelineError> {
        check_band(sample_rate_hz, low_hz, high_hz)?;

        let nyquist = sample_rate_hz / 2.0;
        let l_trans_hz = (0.25 * low_hz).max(2.0).min(low_hz);
        let h_trans_hz = (0.25 * high_hz).max(2.0).min(nyquist - high_hz);

        let mut length =
            ((HAMMING_LENGTH_FACTOR * sample_rate_hz / l_trans_hz.min(h_trans_hz)).round() as usize)
                .max(1);
        if length % 2 == 0 {
            length += 1;
        }

        let low_cut = low_hz - l_trans_hz / 2.0;
        let high_cut = high_hz + h_trans_hz / 2.0;
        let center = (length - 1) / 2;

        let mut taps: Vec<f64> = (0..length)
            .map(|n| {
                let t = n as f64 - center as f64;
                let ideal = ideal_lowpass(high_cut, sample_rate_hz, t)
                    - ideal_lowpass(low_cut, sample_rate_hz, t);
                ideal * hamming(n, length)
            })
            .collect();

        let pass_center = (low_cut + high_cut) / 2.0;
        let gain: f64 = taps
            .iter()
            .enumerate()
            .map(|(n, &h)| {
                let t = n as f64 - center as f64;
                h * (2.0 * std::f64::consts::PI * pass_center * t / sample_rate_hz).cos()
            })
            .sum();
        if gain.abs() > f64::EPSILON {
            for tap in &mut taps {
                *tap /= gain;
            }
        }

        debug!(
            "[Filter] FIR band-pass {}-{} Hz: {} taps, transitions {} / {} Hz",
            low_hz, high_hz, length, l_trans_hz, h_trans_hz
        );

        Ok(Self {
            taps,
            l_trans_hz,
            h_trans_hz,
            fft: FftProcessor::new(),
        })
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }
}

impl ZeroPhaseFilter for FirBandPass {
    fn apply(&self, samples: &[f64]) -> Vec<f64> {
        let n = samples.len();
        if n == 0 {
            return Vec::new();
        }

        let edge = self.taps.len().min(n) - 1;
        let padded = reflect_limited(samples, edge);
        let convolved = self.fft.convolve(&padded, &self.taps);

        let delay = (self.taps.len() - 1) / 2;
        convolved[edge + delay..edge + delay + n].to_vec()
    }
}

/// `2 fc / fs * sinc(2 fc / fs * t)`
fn ideal_lowpass(cutoff_hz: f64, sample_rate_hz: f64, t: f64) -> f64 {
    let normalized = 2.0 * cutoff_hz / sample_rate_hz;
    normalized * sinc(normalized * t)
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

fn hamming(n: usize, length: usize) -> f64 {
    if length == 1 {
        return 1.0;
    }
    0.54 - 0.46 * (2.0 * std::f64::consts::PI * n as f64 / (length - 1) as f64).cos()
}

/// Pad both ends by `edge` samples with an odd (point) reflection
///
/// `edge` must be less than `samples.len()`.
fn reflect_limited(samples: &[f64], edge: usize) -> Vec<f64> {
    let n = samples.len();
    let first = samples[0];
    let last = samples[n - 1];

    let mut padded = Vec::with_capacity(n + 2 * edge);
    padded.extend((1..=edge).rev().map(|j| 2.0 * first - samples[j]));
    padded.extend_from_slice(samples);
    padded.extend((1..=edge).map(|j| 2.0 * last - samples[n - 1 - j]));
    padded
}

/// Second-order IIR section (Direct Form II transposed)
#[derive(Clone, Debug)]
struct Biquad {
    b: [f64; 3],
    a: [f64; 3],
}

impl Biquad {
    /// Second-order Butterworth lowpass (bilinear transform)
    fn lowpass(sample_rate_hz: f64, cutoff_hz: f64) -> Self {
        let k = (std::f64::consts::PI * cutoff_hz / sample_rate_hz).tan();
        let k2 = k * k;
        let sqrt2 = std::f64::consts::SQRT_2;
        let norm = 1.0 / (1.0 + sqrt2 * k + k2);

        Self {
            b: [k2 * norm, 2.0 * k2 * norm, k2 * norm],
            a: [1.0, 2.0 * (k2 - 1.0) * norm, (1.0 - sqrt2 * k + k2) * norm],
        }
    }

    /// Second-order Butterworth highpass (bilinear transform)
    fn highpass(sample_rate_hz: f64, cutoff_hz: f64) -> Self {
        let k = (std::f64::consts::PI * cutoff_hz / sample_rate_hz).tan();
        let k2 = k * k;
        let sqrt2 = std::f64::consts::SQRT_2;
        let norm = 1.0 / (1.0 + sqrt2 * k + k2);

        Self {
            b: [norm, -2.0 * norm, norm],
            a: [1.0, 2.0 * (k2 - 1.0) * norm, (1.0 - sqrt2 * k + k2) * norm],
        }
    }

    fn run(&self, samples: &mut [f64]) {
        let (mut z1, mut z2) = (0.0, 0.0);
        for x in samples.iter_mut() {
            let input = *x;
            let output = self.b[0] * input + z1;
            z1 = self.b[1] * input - self.a[1] * output + z2;
            z2 = self.b[2] * input - self.a[2] * output;
            *x = output;
        }
    }
}

/// Butterworth band-pass run forward then backward
pub struct IirBandPass {
    sections: [Biquad; 2],
}

impl IirBandPass {
    /// Edge padding applied before the forward-backward pass
    const PAD_SAMPLES: usize = 15;

    pub fn design(sample_rate_hz: f64, low_hz: f64, high_hz: f64) -> Result<Self, PipelineError> {
        check_band(sample_rate_hz, low_hz, high_hz)?;
        debug!("[Filter] IIR band-pass {}-{} Hz (forward-backward)", low_hz, high_hz);

        Ok(Self {
            sections: [
                Biquad::highpass(sample_rate_hz, low_hz),
                Biquad::lowpass(sample_rate_hz, high_hz),
            ],
        })
    }
}

impl ZeroPhaseFilter for IirBandPass {
    fn apply(&self, samples: &[f64]) -> Vec<f64> {
        let n = samples.len();
        if n == 0 {
            return Vec::new();
        }

        let edge = Self::PAD_SAMPLES.min(n - 1);
        let mut work = reflect_limited(samples, edge);

        for section in &self.sections {
            section.run(&mut work);
        }
        work.reverse();
        for section in &self.sections {
            section.run(&mut work);
        }
        work.reverse();

        work[edge..edge + n].to_vec()
    }
}

/// Build the configured band-pass
pub fn build_band_pass(
    config: &PipelineConfig,
) -> Result<Box<dyn ZeroPhaseFilter>, PipelineError> {
    let (fs, low, high) = (config.sample_rate_hz, config.l_freq_hz, config.h_freq_hz);
    match config.filter_method {
        FilterMethod::Fir => Ok(Box::new(FirBandPass::design(fs, low, high)?)),
        FilterMethod::Iir => Ok(Box::new(IirBandPass::design(fs, low, high)?)),
    }
}
