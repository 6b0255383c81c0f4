//! Synthetic EEG-shaped data.
//!
//! Two generators live here: the standard-normal noise substituted for
//! unusable uploads, and deterministic sine tables used to build fixtures
//! for the CLI and the tests.

use std::f64::consts::PI;
use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// 10-20 montage labels used for generated tables
const MONTAGE_10_20: [&str; 19] = [
    "Fp1", "Fp2", "F7", "F3", "Fz", "F4", "F8", "T3", "C3", "Cz", "C4", "T4", "T5", "P3", "Pz",
    "P4", "T6", "O1", "O2",
];

/// Labels for the fallback channels: `EEG0`, `EEG1`, ...
pub fn fallback_labels(channels: usize) -> Vec<String> {
    (0..channels).map(|i| format!("EEG{}", i)).collect()
}

/// Standard-normal noise, one row per channel
///
/// Without a seed the generator is seeded from OS entropy and the output
/// differs on every call.
pub fn standard_normal(channels: usize, samples: usize, seed: Option<u64>) -> Vec<Vec<f64>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..channels)
        .map(|_| {
            (0..samples)
                .map(|_| rng.sample::<f64, _>(StandardNormal))
                .collect()
        })
        .collect()
}

/// Pure sine sampled at `sample_rate_hz`
pub fn sine_wave(frequency_hz: f64, amplitude: f64, sample_rate_hz: f64, samples: usize) -> Vec<f64> {
    (0..samples)
        .map(|i| amplitude * (2.0 * PI * frequency_hz * i as f64 / sample_rate_hz).sin())
        .collect()
}

/// Shape of a generated sine table
#[derive(Debug, Clone, PartialEq)]
pub struct SineTableSpec {
    pub frequency_hz: f64,
    pub amplitude: f64,
    pub sample_rate_hz: f64,
    pub channels: usize,
    pub samples: usize,
}

impl Default for SineTableSpec {
    fn default() -> Self {
        Self {
            frequency_hz: 6.0,
            amplitude: 1.0,
            sample_rate_hz: 250.0,
            channels: 2,
            samples: 1000,
        }
    }
}

impl SineTableSpec {
    /// Channel labels: 10-20 names first, then `CH20`, `CH21`, ...
    pub fn labels(&self) -> Vec<String> {
        (0..self.channels)
            .map(|i| match MONTAGE_10_20.get(i) {
                Some(name) => name.to_string(),
                None => format!("CH{}", i + 1),
            })
            .collect()
    }

    /// Write the table as CSV (header row + one row per sample)
    ///
    /// Every channel carries the same sine.
    pub fn write_csv<W: Write>(&self, output: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(output);
        writer.write_record(self.labels())?;

        let wave = sine_wave(
            self.frequency_hz,
            self.amplitude,
            self.sample_rate_hz,
            self.samples,
        );
        for value in wave {
            let cell = value.to_string();
            writer.write_record(std::iter::repeat(cell.as_str()).take(self.channels))?;
        }

        writer.flush()?;
        Ok(())
    }

    /// CSV as an in-memory byte buffer
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }
}
