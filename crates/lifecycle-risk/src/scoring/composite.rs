use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output scale of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    Unit,
    Percent,
}

impl ScoreScale {
    pub const fn max(self) -> f64 {
        match self {
            Self::Unit => 1.0,
            Self::Percent => 100.0,
        }
    }

    pub fn apply(self, unit_score: f64) -> f64 {
        unit_score * self.max()
    }
}

/// Weights applied to EHI, DSI and BCI. Non-negative and summing to one, so a
/// composite of unit-interval inputs stays in the unit interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    ehi: f64,
    dsi: f64,
    bci: f64,
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

impl CompositeWeights {
    /// 0.3 / 0.3 / 0.4, biometric compliance weighted highest.
    pub const LIFECYCLE: Self = Self {
        ehi: 0.3,
        dsi: 0.3,
        bci: 0.4,
    };

    /// 0.4 / 0.4 / 0.2, enrolment and demographic stages weighted highest.
    pub const ENROLMENT_LED: Self = Self {
        ehi: 0.4,
        dsi: 0.4,
        bci: 0.2,
    };

    pub fn new(ehi: f64, dsi: f64, bci: f64) -> Result<Self, WeightsError> {
        if [ehi, dsi, bci].iter().any(|weight| !weight.is_finite()) {
            return Err(WeightsError::NonFinite);
        }
        if [ehi, dsi, bci].iter().any(|weight| *weight < 0.0) {
            return Err(WeightsError::Negative);
        }
        let sum = ehi + dsi + bci;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::Sum(sum));
        }
        Ok(Self { ehi, dsi, bci })
    }

    pub fn ehi(&self) -> f64 {
        self.ehi
    }

    pub fn dsi(&self) -> f64 {
        self.dsi
    }

    pub fn bci(&self) -> f64 {
        self.bci
    }

    /// Weighted sum on the unit scale. A missing term counts as 0.
    pub fn combine(&self, ehi: Option<f64>, dsi: Option<f64>, bci: Option<f64>) -> f64 {
        let total = self.ehi * ehi.unwrap_or(0.0)
            + self.dsi * dsi.unwrap_or(0.0)
            + self.bci * bci.unwrap_or(0.0);
        total.clamp(0.0, 1.0)
    }
}

/// How the "1 = good" sub-indices enter the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOrientation {
    /// Each index enters as `1 - index`; a high composite means a district
    /// under strain.
    Risk,
    /// Each index enters unchanged.
    Health,
}

impl CompositeOrientation {
    pub fn term(self, index: f64) -> f64 {
        match self {
            Self::Risk => 1.0 - index,
            Self::Health => index,
        }
    }
}

/// ALHS is a risk score: high values are classified towards Critical.
pub const ALHS_ORIENTATION: CompositeOrientation = CompositeOrientation::Risk;

impl CompositeWeights {
    /// ALHS on the unit scale. A missing sub-index contributes nothing, so
    /// absent data never pushes a district towards a higher tier.
    pub fn alhs(&self, ehi: Option<f64>, dsi: Option<f64>, bci: Option<f64>) -> f64 {
        let term = |index: Option<f64>| index.map(|value| ALHS_ORIENTATION.term(value));
        self.combine(term(ehi), term(dsi), term(bci))
    }
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self::LIFECYCLE
    }
}

impl FromStr for CompositeWeights {
    type Err = WeightsError;

    /// Parses `"ehi,dsi,bci"`, e.g. `"0.3,0.3,0.4"`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts = raw
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| WeightsError::Malformed(raw.to_string()))?;

        match parts.as_slice() {
            [ehi, dsi, bci] => Self::new(*ehi, *dsi, *bci),
            _ => Err(WeightsError::Malformed(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    #[error("composite weights must be finite")]
    NonFinite,
    #[error("composite weights must be non-negative")]
    Negative,
    #[error("composite weights must sum to 1 (got {0:.6})")]
    Sum(f64),
    #[error("expected three comma-separated weights, got '{0}'")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_stays_in_unit_interval_at_extremes() {
        let weights = CompositeWeights::default();
        assert_eq!(weights.combine(Some(0.0), Some(0.0), Some(0.0)), 0.0);
        let top = weights.combine(Some(1.0), Some(1.0), Some(1.0));
        assert!((top - 1.0).abs() < 1e-12);
        assert!(top <= 1.0);
    }

    #[test]
    fn missing_sub_index_counts_as_zero() {
        let weights = CompositeWeights::LIFECYCLE;
        let score = weights.combine(Some(1.0), None, Some(0.5));
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn alhs_rises_as_sub_indices_worsen() {
        let weights = CompositeWeights::LIFECYCLE;
        assert_eq!(weights.alhs(Some(1.0), Some(1.0), Some(1.0)), 0.0);
        let worst = weights.alhs(Some(0.0), Some(0.0), Some(0.0));
        assert!((worst - 1.0).abs() < 1e-12);

        let strained = weights.alhs(Some(0.2), Some(0.5), Some(0.1));
        let healthy = weights.alhs(Some(0.8), Some(0.5), Some(0.9));
        assert!(strained > healthy);
    }

    #[test]
    fn missing_sub_index_adds_no_risk() {
        let weights = CompositeWeights::LIFECYCLE;
        let score = weights.alhs(Some(0.0), None, Some(1.0));
        assert!((score - 0.3).abs() < 1e-12);
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        assert_eq!(
            CompositeWeights::new(0.5, 0.5, 0.5),
            Err(WeightsError::Sum(1.5))
        );
        assert_eq!(
            CompositeWeights::new(1.2, -0.1, -0.1),
            Err(WeightsError::Negative)
        );
    }

    #[test]
    fn parses_comma_separated_weights() {
        let weights: CompositeWeights = "0.4, 0.4, 0.2".parse().expect("weights parse");
        assert_eq!(weights, CompositeWeights::ENROLMENT_LED);
        assert!(matches!(
            "0.5,0.5".parse::<CompositeWeights>(),
            Err(WeightsError::Malformed(_))
        ));
    }

    #[test]
    fn percent_scale_multiplies_by_hundred() {
        assert!((ScoreScale::Percent.apply(0.55) - 55.0).abs() < 1e-9);
        assert_eq!(ScoreScale::Unit.apply(0.55), 0.55);
        assert_eq!(ScoreScale::Percent.max(), 100.0);
    }
}
