//! Normalization, composite scoring, flag evaluation and risk classification.

mod classifier;
mod composite;
pub mod domain;
mod flags;
pub mod normalizer;
mod table;

pub use classifier::{CutPointError, RiskCutPoints, RiskTier};
pub use composite::{
    CompositeOrientation, CompositeWeights, ScoreScale, WeightsError, ALHS_ORIENTATION,
};
pub use domain::{
    DistrictFlags, DistrictRecord, DistrictView, FlagKind, RawDistrict, RiskCategory, SubIndex,
};
pub use flags::{FlagThresholds, SubIndices};
pub use table::{ScoredTable, ScoringError};

use normalizer::{normalize_sparse, orientation_for};
use serde::Serialize;
use std::str::FromStr;

/// Paired score scale and cut-point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringProfile {
    /// 0-100 scale, Low/Medium/High/Critical.
    Percent,
    /// 0-1 scale, Stable/Moderate/Critical.
    Unit,
}

impl ScoringProfile {
    pub fn scale(self) -> ScoreScale {
        match self {
            Self::Percent => ScoreScale::Percent,
            Self::Unit => ScoreScale::Unit,
        }
    }

    pub fn cut_points(self) -> RiskCutPoints {
        match self {
            Self::Percent => RiskCutPoints::four_tier_percent(),
            Self::Unit => RiskCutPoints::three_tier_unit(),
        }
    }
}

impl FromStr for ScoringProfile {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "percent" | "four_tier" | "0-100" => Ok(Self::Percent),
            "unit" | "three_tier" | "0-1" => Ok(Self::Unit),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub scale: ScoreScale,
    pub cut_points: RiskCutPoints,
    pub weights: CompositeWeights,
    pub flags: FlagThresholds,
}

impl ScoringConfig {
    pub fn from_profile(profile: ScoringProfile, weights: CompositeWeights) -> Self {
        Self {
            scale: profile.scale(),
            cut_points: profile.cut_points(),
            weights,
            flags: FlagThresholds::default(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::from_profile(ScoringProfile::Percent, CompositeWeights::default())
    }
}

/// Turns a raw extract into a [`ScoredTable`].
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn empty_table(&self) -> ScoredTable {
        ScoredTable::empty(self.config.scale, self.config.cut_points.clone())
    }

    /// Score the whole extract. Normalization bounds come from `rows` as a
    /// whole, so the result is only comparable with itself.
    pub fn score(&self, rows: Vec<RawDistrict>, epoch: u64) -> Result<ScoredTable, ScoringError> {
        let [ehi, dsi, bci] = SubIndex::ordered().map(|index| {
            let column: Vec<Option<f64>> = rows.iter().map(|row| row.raw_metric(index)).collect();
            normalize_sparse(&column, orientation_for(index))
        });

        let config = &self.config;
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(position, raw)| {
                let (ehi, dsi, bci) = (ehi[position], dsi[position], bci[position]);
                let alhs = config.scale.apply(config.weights.alhs(ehi, dsi, bci));
                let flags = config.flags.evaluate(&raw, SubIndices { ehi, dsi, bci });

                DistrictRecord {
                    district_id: raw.district_id,
                    district_name: raw.district_name,
                    state: raw.state,
                    population: raw.population,
                    total_enrolments: raw.total_enrolments,
                    pending_biometric_updates: raw.pending_biometric_updates,
                    ehi: ehi.unwrap_or(0.0),
                    dsi: dsi.unwrap_or(0.0),
                    bci: bci.unwrap_or(0.0),
                    alhs,
                    flags,
                    risk_category: config.cut_points.classify(alhs),
                    last_updated: raw.last_updated,
                }
            })
            .collect();

        ScoredTable::from_records(records, config.scale, config.cut_points.clone(), epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract() -> Vec<RawDistrict> {
        vec![
            RawDistrict::new("D-1", "Alpha", "Kerala", 1_000, 950, 10).with_demographic_updates(20),
            RawDistrict::new("D-2", "Beta", "Kerala", 1_000, 700, 80).with_demographic_updates(90),
            RawDistrict::new("D-3", "Gamma", "Bihar", 2_000, 1_600, 60)
                .with_demographic_updates(50),
        ]
    }

    #[test]
    fn healthiest_district_carries_least_risk_and_extremes_hit_bounds() {
        let table = ScoringEngine::default()
            .score(extract(), 1)
            .expect("table scores");

        let alpha = table.get("D-1").expect("alpha present");
        assert_eq!(alpha.ehi, 1.0);
        assert_eq!(alpha.dsi, 1.0);
        assert_eq!(alpha.bci, 1.0);
        assert!(alpha.alhs.abs() < 1e-9);
        assert_eq!(alpha.risk_category, RiskCategory::Low);
        assert_eq!(alpha.flags_count(), 0);

        let beta = table.get("D-2").expect("beta present");
        assert_eq!(beta.ehi, 0.0);
        assert!((beta.alhs - 100.0).abs() < 1e-9);
        assert_eq!(beta.risk_category, RiskCategory::Critical);
        assert_eq!(beta.flags_count(), 4);

        let gamma = table.get("D-3").expect("gamma present");
        assert!(gamma.alhs > alpha.alhs && gamma.alhs < beta.alhs);
    }

    #[test]
    fn missing_raw_metric_adds_no_risk_and_raises_no_flag() {
        let mut rows = extract();
        rows[2].demographic_updates = None;
        let table = ScoringEngine::default().score(rows, 1).expect("table scores");
        let gamma = table.get("D-3").expect("gamma present");
        assert_eq!(gamma.dsi, 0.0);
        assert!(gamma.alhs.is_finite());
        assert!(!gamma.flags.catchup_spike);

        let complete = ScoringEngine::default()
            .score(extract(), 1)
            .expect("table scores");
        let complete_gamma = complete.get("D-3").expect("gamma present");
        assert!(gamma.alhs < complete_gamma.alhs);
    }

    #[test]
    fn source_scores_take_precedence_over_counter_rates() {
        let rows = vec![
            RawDistrict::new("D-1", "Alpha", "Kerala", 1_000, 100, 10)
                .with_source_score(SubIndex::Ehi, 0.9),
            RawDistrict::new("D-2", "Beta", "Kerala", 1_000, 900, 10)
                .with_source_score(SubIndex::Ehi, 0.1),
        ];
        let table = ScoringEngine::default().score(rows, 1).expect("table scores");
        assert_eq!(table.get("D-1").map(|record| record.ehi), Some(1.0));
        assert_eq!(table.get("D-2").map(|record| record.ehi), Some(0.0));
    }

    #[test]
    fn duplicate_ids_reject_the_table() {
        let mut rows = extract();
        rows[1].district_id = "D-1".to_string();
        assert_eq!(
            ScoringEngine::default().score(rows, 1).unwrap_err(),
            ScoringError::DuplicateDistrict("D-1".to_string())
        );
    }

    #[test]
    fn unit_profile_keeps_scores_in_unit_interval() {
        let engine = ScoringEngine::new(ScoringConfig::from_profile(
            ScoringProfile::Unit,
            CompositeWeights::ENROLMENT_LED,
        ));
        let table = engine.score(extract(), 3).expect("table scores");
        assert_eq!(table.epoch(), 3);
        for record in table.records() {
            assert!((0.0..=1.0).contains(&record.alhs));
            assert!(matches!(
                record.risk_category,
                RiskCategory::Stable | RiskCategory::Moderate | RiskCategory::Critical
            ));
        }
    }

    #[test]
    fn profile_parses_both_conventions() {
        assert_eq!(
            "percent".parse::<ScoringProfile>(),
            Ok(ScoringProfile::Percent)
        );
        assert_eq!(" UNIT ".parse::<ScoringProfile>(), Ok(ScoringProfile::Unit));
        assert!("decile".parse::<ScoringProfile>().is_err());
    }
}
