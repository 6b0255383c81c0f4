// Signal - turning an uploaded table into a filtered multichannel series
//
// Module organization:
// - table: CSV header/record reading and numeric transposition
// - synthetic: fallback noise and sine fixtures
// - filter: zero-phase band-pass (FIR default, IIR alternative)
// - mod.rs: MultiChannelSignal, SignalOrigin, cleaning pipeline

pub mod filter;
pub mod synthetic;
pub mod table;

use std::io::Read;

use log::{info, warn};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use filter::ZeroPhaseFilter;
use table::TableReader;

/// Fixed-rate multichannel time series
///
/// Every channel has the same number of samples and there is at least one
/// channel with at least one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiChannelSignal {
    channel_names: Vec<String>,
    sample_rate_hz: f64,
    data: Vec<Vec<f64>>,
}

impl MultiChannelSignal {
    /// Assemble a signal from per-channel sample vectors
    ///
    /// # Errors
    /// `InvalidSampleRate` for a non-positive rate, `EmptySignal` when there
    /// are no channels or no samples, `MalformedTable` when labels and data
    /// disagree or channel lengths differ.
    pub fn new(
        channel_names: Vec<String>,
        sample_rate_hz: f64,
        data: Vec<Vec<f64>>,
    ) -> Result<Self, PipelineError> {
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(PipelineError::InvalidSampleRate { sample_rate_hz });
        }
        if channel_names.len() != data.len() {
            return Err(PipelineError::MalformedTable {
                reason: format!(
                    "{} channel labels for {} channels",
                    channel_names.len(),
                    data.len()
                ),
            });
        }

        let samples = data.first().map(Vec::len).unwrap_or(0);
        if samples == 0 {
            return Err(PipelineError::EmptySignal);
        }
        if let Some((idx, channel)) = data.iter().enumerate().find(|(_, ch)| ch.len() != samples) {
            return Err(PipelineError::MalformedTable {
                reason: format!(
                    "channel {} has {} samples, expected {}",
                    channel_names[idx],
                    channel.len(),
                    samples
                ),
            });
        }

        Ok(Self {
            channel_names,
            sample_rate_hz,
            data,
        })
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    pub fn n_channels(&self) -> usize {
        self.data.len()
    }

    pub fn n_samples(&self) -> usize {
        self.data[0].len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.n_samples() as f64 / self.sample_rate_hz
    }

    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.data.get(index).map(Vec::as_slice)
    }

    /// Run `filter` over every channel, keeping labels and rate
    pub fn filtered(&self, filter: &dyn ZeroPhaseFilter) -> Self {
        Self {
            channel_names: self.channel_names.clone(),
            sample_rate_hz: self.sample_rate_hz,
            data: self.data.iter().map(|ch| filter.apply(ch)).collect(),
        }
    }
}

/// Where the analysed samples came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalOrigin {
    /// Columns of the uploaded table
    Uploaded,
    /// Random noise substituted because the upload had too few columns
    SyntheticFallback {
        columns_found: usize,
        channels: usize,
        samples: usize,
        seed: Option<u64>,
    },
}

impl SignalOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SignalOrigin::SyntheticFallback { .. })
    }

    /// User-facing explanation when the upload was not analysed
    pub fn notice(&self) -> Option<String> {
        match self {
            SignalOrigin::Uploaded => None,
            SignalOrigin::SyntheticFallback {
                columns_found,
                channels,
                samples,
                seed,
            } => {
                let reproducibility = match seed {
                    Some(seed) => format!("seed {}", seed),
                    None => "unseeded, results will differ between runs".to_string(),
                };
                Some(format!(
                    "The uploaded table has {} column(s), fewer than required. \
                     Showing a demo analysis of {} channels x {} samples of random noise ({}) \
                     instead of your data.",
                    columns_found, channels, samples, reproducibility
                ))
            }
        }
    }
}

/// Signal ready for scoring, plus its provenance
#[derive(Debug, Clone)]
pub struct PreparedSignal {
    pub signal: MultiChannelSignal,
    pub origin: SignalOrigin,
}

/// Parse an upload into an (unfiltered) signal
///
/// Tables with fewer than `min_columns` columns are replaced by seeded or
/// unseeded standard-normal noise without their rows being read.
pub fn load_signal<R: Read>(
    input: R,
    config: &PipelineConfig,
) -> Result<PreparedSignal, PipelineError> {
    let reader = TableReader::open(input)?;

    if reader.column_count() < config.min_columns {
        let columns_found = reader.column_count();
        warn!(
            "[Signal] Upload has {} column(s) (< {}); substituting {}x{} synthetic noise",
            columns_found, config.min_columns, config.fallback_channels, config.fallback_samples
        );

        let data = synthetic::standard_normal(
            config.fallback_channels,
            config.fallback_samples,
            config.fallback_seed,
        );
        let labels = synthetic::fallback_labels(config.fallback_channels);
        let signal = MultiChannelSignal::new(labels, config.sample_rate_hz, data)?;

        return Ok(PreparedSignal {
            signal,
            origin: SignalOrigin::SyntheticFallback {
                columns_found,
                channels: config.fallback_channels,
                samples: config.fallback_samples,
                seed: config.fallback_seed,
            },
        });
    }

    let (labels, data) = reader.read_all()?.into_channels()?;
    let signal = MultiChannelSignal::new(labels, config.sample_rate_hz, data)?;

    Ok(PreparedSignal {
        signal,
        origin: SignalOrigin::Uploaded,
    })
}

/// Load an upload and band-pass filter every channel
pub fn run_cleaning_pipeline<R: Read>(
    input: R,
    config: &PipelineConfig,
) -> Result<PreparedSignal, PipelineError> {
    let band_pass = filter::build_band_pass(config)?;
    let prepared = load_signal(input, config)?;

    info!(
        "[Signal] Filtering {} channel(s) x {} samples at {} Hz ({}-{} Hz, {:?})",
        prepared.signal.n_channels(),
        prepared.signal.n_samples(),
        config.sample_rate_hz,
        config.l_freq_hz,
        config.h_freq_hz,
        config.filter_method
    );

    Ok(PreparedSignal {
        signal: prepared.signal.filtered(band_pass.as_ref()),
        origin: prepared.origin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthetic::SineTableSpec;

    fn seeded_config(seed: u64) -> PipelineConfig {
        PipelineConfig {
            fallback_seed: Some(seed),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_single_column_triggers_fallback() {
        let prepared =
            run_cleaning_pipeline("value\n1\n2\n3\n".as_bytes(), &PipelineConfig::default())
                .unwrap();

        assert_eq!(prepared.signal.n_channels(), 19);
        assert_eq!(prepared.signal.n_samples(), 1000);
        assert_eq!(prepared.signal.channel_names()[0], "EEG0");
        assert_eq!(
            prepared.origin,
            SignalOrigin::SyntheticFallback {
                columns_found: 1,
                channels: 19,
                samples: 1000,
                seed: None,
            }
        );
        assert!(prepared.origin.notice().unwrap().contains("unseeded"));
    }

    #[test]
    fn test_fallback_ignores_column_content() {
        let prepared = load_signal(
            "notes\nthis is not a number\n\"quoted, text\"\n".as_bytes(),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(prepared.origin.is_fallback());
        assert_eq!(prepared.signal.n_channels(), 19);
    }

    #[test]
    fn test_seeded_fallback_is_reproducible() {
        let first = run_cleaning_pipeline("x\n1\n".as_bytes(), &seeded_config(11)).unwrap();
        let second = run_cleaning_pipeline("x\n1\n".as_bytes(), &seeded_config(11)).unwrap();
        assert_eq!(first.signal, second.signal);
        assert!(first.origin.notice().unwrap().contains("seed 11"));
    }

    #[test]
    fn test_unseeded_fallback_differs_between_runs() {
        let config = PipelineConfig::default();
        let first = load_signal("x\n1\n".as_bytes(), &config).unwrap();
        let second = load_signal("x\n1\n".as_bytes(), &config).unwrap();
        assert_ne!(first.signal, second.signal);
    }

    #[test]
    fn test_channel_count_preserved() {
        for channels in [2, 3, 8] {
            let csv = SineTableSpec {
                channels,
                samples: 500,
                ..SineTableSpec::default()
            }
            .to_csv_bytes()
            .unwrap();

            let prepared =
                run_cleaning_pipeline(csv.as_slice(), &PipelineConfig::default()).unwrap();
            assert_eq!(prepared.origin, SignalOrigin::Uploaded);
            assert_eq!(prepared.signal.n_channels(), channels);
            assert_eq!(prepared.signal.n_samples(), 500);
            assert_eq!(prepared.signal.sample_rate_hz(), 250.0);
        }
    }

    #[test]
    fn test_headers_become_channel_labels() {
        let prepared = load_signal(
            "Fz,Cz,Pz\n1,2,3\n4,5,6\n".as_bytes(),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(prepared.signal.channel_names(), &["Fz", "Cz", "Pz"]);
        assert_eq!(prepared.signal.channel(1), Some(&[2.0, 5.0][..]));
    }

    #[test]
    fn test_header_only_table_is_empty_signal() {
        let err = load_signal("a,b\n".as_bytes(), &PipelineConfig::default()).unwrap_err();
        assert_eq!(err, PipelineError::EmptySignal);
    }

    #[test]
    fn test_non_numeric_upload_propagates() {
        let err =
            run_cleaning_pipeline("a,b\n1,x\n".as_bytes(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::NonNumericValue { .. }));
    }

    #[test]
    fn test_signal_rejects_ragged_channels() {
        let err = MultiChannelSignal::new(
            vec!["a".into(), "b".into()],
            250.0,
            vec![vec![1.0, 2.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::MalformedTable { .. }));
    }
}
