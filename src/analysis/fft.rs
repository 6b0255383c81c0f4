// FFT module - Fast Fourier Transform computation
//
// Shared FFT plumbing for the Welch estimator (windowed power spectra) and
// the FIR band-pass (fast convolution). Plans are cached by the planner, so
// one processor can serve many segment and convolution sizes.

use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::{Arc, Mutex};

/// FFT processor for real-valued signals
pub struct FftProcessor {
    fft_planner: Arc<Mutex<FftPlanner<f64>>>,
}

impl FftProcessor {
    pub fn new() -> Self {
        Self {
            fft_planner: Arc::new(Mutex::new(FftPlanner::new())),
        }
    }

    /// Compute the squared-magnitude spectrum of a real signal
    ///
    /// The input is zero-padded (or truncated) to `fft_size` and the result
    /// covers the non-negative frequencies only, so its length is
    /// `fft_size / 2 + 1`. No window or scaling is applied here.
    pub fn power_spectrum(&self, samples: &[f64], fft_size: usize) -> Vec<f64> {
        let mut buffer = Self::complex_buffer(samples, fft_size);
        self.forward(&mut buffer);

        buffer[..fft_size / 2 + 1]
            .iter()
            .map(|c| c.norm_sqr())
            .collect()
    }

    /// Full linear convolution of `signal` with `kernel`
    ///
    /// Output length is `signal.len() + kernel.len() - 1`.
    pub fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Vec<f64> {
        if signal.is_empty() || kernel.is_empty() {
            return Vec::new();
        }

        let out_len = signal.len() + kernel.len() - 1;
        let fft_size = out_len.next_power_of_two();

        let mut signal_buf = Self::complex_buffer(signal, fft_size);
        let mut kernel_buf = Self::complex_buffer(kernel, fft_size);
        self.forward(&mut signal_buf);
        self.forward(&mut kernel_buf);

        for (s, k) in signal_buf.iter_mut().zip(kernel_buf.iter()) {
            *s *= *k;
        }
        self.inverse(&mut signal_buf);

        // rustfft does not normalize the inverse transform
        let norm = 1.0 / fft_size as f64;
        signal_buf[..out_len].iter().map(|c| c.re * norm).collect()
    }

    fn complex_buffer(samples: &[f64], fft_size: usize) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .take(fft_size)
            .map(|&sample| Complex::new(sample, 0.0))
            .collect();
        buffer.resize(fft_size, Complex::new(0.0, 0.0));
        buffer
    }

    fn forward(&self, buffer: &mut [Complex<f64>]) {
        let fft = {
            let mut planner = self
                .fft_planner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            planner.plan_fft_forward(buffer.len())
        };
        fft.process(buffer);
    }

    fn inverse(&self, buffer: &mut [Complex<f64>]) {
        let fft = {
            let mut planner = self
                .fft_planner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            planner.plan_fft_inverse(buffer.len())
        };
        fft.process(buffer);
    }
}

impl Default for FftProcessor {
    fn default() -> Self {
        Self::new()
    }
}
