// Score module - Theta/alpha ratio to bounded risk score
//
// The mapping is an unvalidated demo heuristic: raised theta relative to
// alpha pushes the score up. It has never been calibrated against clinical
// labels and must not be read as a diagnosis.

use serde::Serialize;

use crate::analysis::types::BandPowers;
use crate::config::{DashboardConfig, ScoringConfig};
use crate::error::PipelineError;

/// Bounded integer score plus the ratio it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskScore {
    /// Score in `[min_score, max_score]` (10..=95 by default)
    pub value: u8,

    /// `theta / (alpha + epsilon) * ratio_scale` before truncation
    pub ratio: f64,
}

impl RiskScore {
    /// Score as a fraction of 100, for progress bars
    pub fn progress(&self) -> f64 {
        f64::from(self.value) / 100.0
    }
}

/// Map band powers to a score
///
/// The ratio is truncated toward zero and then clamped, so a ratio of 10.9
/// scores 10 and anything above 95 saturates at 95.
///
/// # Errors
/// `NonFiniteScore` when the ratio is NaN or infinite (NaN samples upstream).
pub fn score_from_band_powers(
    powers: BandPowers,
    scoring: &ScoringConfig,
) -> Result<RiskScore, PipelineError> {
    let ratio = powers.theta / (powers.alpha + scoring.epsilon) * scoring.ratio_scale;
    if !ratio.is_finite() {
        return Err(PipelineError::NonFiniteScore { ratio });
    }

    let min = f64::from(scoring.min_score);
    let max = f64::from(scoring.max_score);
    let value = ratio.trunc().clamp(min, max) as u8;

    Ok(RiskScore { value, ratio })
}

/// Severity bucket shown as a banner next to the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Moderate,
    Low,
}

impl Severity {
    /// Bucket a score; both thresholds are strict
    pub fn classify(score: u8, dashboard: &DashboardConfig) -> Self {
        if score > dashboard.high_risk_threshold {
            Severity::High
        } else if score > dashboard.moderate_risk_threshold {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            Severity::High => "HIGH RISK: Clinical correlation recommended.",
            Severity::Moderate => "MODERATE RISK: Monitor symptoms.",
            Severity::Low => "LOW RISK: Signal within normal range.",
        }
    }

    /// CSS class used by the HTML banner
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::High => "error",
            Severity::Moderate => "warning",
            Severity::Low => "success",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(theta: f64, alpha: f64) -> RiskScore {
        score_from_band_powers(BandPowers { theta, alpha }, &ScoringConfig::default()).unwrap()
    }

    #[test]
    fn test_equal_bands_score_at_floor() {
        let result = score(2.0, 2.0);
        assert_eq!(result.value, 10);
        assert!((result.ratio - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_ratio_truncates_before_clamp() {
        // ratio 42.9 -> 42
        let result = score(4.29, 1.0);
        assert_eq!(result.value, 42);
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(score(1000.0, 1.0).value, 95);
        assert_eq!(score(0.0, 1.0).value, 10);
        assert_eq!(score(1.0, 0.0).value, 95);
    }

    #[test]
    fn test_score_always_in_range() {
        let cases = [0.0, 1e-12, 0.3, 1.0, 3.7, 9.5, 1e3, 1e12];
        for &theta in &cases {
            for &alpha in &cases {
                let value = score(theta, alpha).value;
                assert!((10..=95).contains(&value), "theta={theta} alpha={alpha}");
            }
        }
    }

    #[test]
    fn test_nan_power_rejected() {
        let err = score_from_band_powers(
            BandPowers {
                theta: f64::NAN,
                alpha: 1.0,
            },
            &ScoringConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::NonFiniteScore { .. }));
    }

    #[test]
    fn test_severity_thresholds_are_strict() {
        let dashboard = DashboardConfig::default();
        assert_eq!(Severity::classify(95, &dashboard), Severity::High);
        assert_eq!(Severity::classify(71, &dashboard), Severity::High);
        assert_eq!(Severity::classify(70, &dashboard), Severity::Moderate);
        assert_eq!(Severity::classify(41, &dashboard), Severity::Moderate);
        assert_eq!(Severity::classify(40, &dashboard), Severity::Low);
        assert_eq!(Severity::classify(10, &dashboard), Severity::Low);
    }

    #[test]
    fn test_banner_text() {
        assert!(Severity::High.banner().starts_with("HIGH RISK"));
        assert!(Severity::Moderate.banner().starts_with("MODERATE RISK"));
        assert!(Severity::Low.banner().starts_with("LOW RISK"));
    }

    #[test]
    fn test_progress_fraction() {
        assert!((score(4.29, 1.0).progress() - 0.42).abs() < 1e-12);
    }
}
