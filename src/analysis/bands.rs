// Bands module - PSD averaging over frequency bands
//
// Band edges are inclusive on both sides, so a bin sitting exactly on a
// shared edge counts toward both bands.

use crate::analysis::types::{BandPowers, PowerSpectrum};
use crate::config::{Band, ScoringConfig};
use crate::error::PipelineError;

/// Mean PSD density over the bins that fall inside `band`
///
/// # Errors
/// `EmptyBand` when no bin lies inside the band (very short signals give a
/// coarse frequency grid that can skip a 4 Hz wide band entirely).
pub fn band_mean(
    spectrum: &PowerSpectrum,
    band: Band,
    name: &'static str,
) -> Result<f64, PipelineError> {
    let (sum, count) = spectrum
        .frequencies_hz
        .iter()
        .zip(&spectrum.density)
        .filter(|(&freq, _)| band.contains(freq))
        .fold((0.0, 0usize), |(sum, count), (_, &p)| (sum + p, count + 1));

    if count == 0 {
        return Err(PipelineError::EmptyBand {
            band: name,
            low_hz: band.low_hz,
            high_hz: band.high_hz,
        });
    }

    Ok(sum / count as f64)
}

/// Theta and alpha means for the configured bands
pub fn band_powers(
    spectrum: &PowerSpectrum,
    scoring: &ScoringConfig,
) -> Result<BandPowers, PipelineError> {
    Ok(BandPowers {
        theta: band_mean(spectrum, scoring.theta_band, "theta")?,
        alpha: band_mean(spectrum, scoring.alpha_band, "alpha")?,
    })
}
