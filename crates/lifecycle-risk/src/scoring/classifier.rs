use super::domain::RiskCategory;
use serde::Serialize;

/// One tier: every score at or above `lower_bound` and below the next tier's
/// bound maps to `category`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskTier {
    pub lower_bound: f64,
    pub category: RiskCategory,
}

impl RiskTier {
    pub const fn new(lower_bound: f64, category: RiskCategory) -> Self {
        Self {
            lower_bound,
            category,
        }
    }
}

/// Ordered cut points partitioning `[0, inf)`.
///
/// Boundaries are lower-inclusive: a score exactly on a cut point belongs to
/// the tier that starts there. Scores below zero (and NaN) fall into the
/// first tier, the last tier is open-ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskCutPoints {
    tiers: Vec<RiskTier>,
}

impl RiskCutPoints {
    pub fn new(tiers: Vec<RiskTier>) -> Result<Self, CutPointError> {
        let first = tiers.first().ok_or(CutPointError::Empty)?;
        if first.lower_bound != 0.0 {
            return Err(CutPointError::FirstBoundNotZero(first.lower_bound));
        }

        for pair in tiers.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            if !upper.lower_bound.is_finite() || upper.lower_bound <= lower.lower_bound {
                return Err(CutPointError::NotIncreasing(upper.lower_bound));
            }
        }

        for (position, tier) in tiers.iter().enumerate() {
            if tiers[..position]
                .iter()
                .any(|earlier| earlier.category == tier.category)
            {
                return Err(CutPointError::DuplicateCategory(tier.category));
            }
        }

        Ok(Self { tiers })
    }

    /// `[0,40) Low, [40,60) Medium, [60,75) High, [75,inf) Critical`.
    pub fn four_tier_percent() -> Self {
        Self {
            tiers: vec![
                RiskTier::new(0.0, RiskCategory::Low),
                RiskTier::new(40.0, RiskCategory::Medium),
                RiskTier::new(60.0, RiskCategory::High),
                RiskTier::new(75.0, RiskCategory::Critical),
            ],
        }
    }

    /// `[0,0.4) Stable, [0.4,0.7) Moderate, [0.7,inf) Critical`.
    pub fn three_tier_unit() -> Self {
        Self {
            tiers: vec![
                RiskTier::new(0.0, RiskCategory::Stable),
                RiskTier::new(0.4, RiskCategory::Moderate),
                RiskTier::new(0.7, RiskCategory::Critical),
            ],
        }
    }

    pub fn tiers(&self) -> &[RiskTier] {
        &self.tiers
    }

    pub fn categories(&self) -> Vec<RiskCategory> {
        self.tiers.iter().map(|tier| tier.category).collect()
    }

    pub fn contains(&self, category: RiskCategory) -> bool {
        self.tiers.iter().any(|tier| tier.category == category)
    }

    pub fn classify(&self, alhs: f64) -> RiskCategory {
        self.tiers
            .iter()
            .rev()
            .find(|tier| alhs >= tier.lower_bound)
            .or_else(|| self.tiers.first())
            .map(|tier| tier.category)
            .unwrap_or(RiskCategory::Low)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CutPointError {
    #[error("at least one risk tier is required")]
    Empty,
    #[error("the first risk tier must start at 0 (got {0})")]
    FirstBoundNotZero(f64),
    #[error("risk tier bounds must be finite and strictly increasing (offending bound {0})")]
    NotIncreasing(f64),
    #[error("risk category {0:?} appears in more than one tier")]
    DuplicateCategory(RiskCategory),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_tier_scenario_classifies_low_medium_critical() {
        let cut_points = RiskCutPoints::four_tier_percent();
        let categories: Vec<_> = [10.0, 55.0, 80.0]
            .into_iter()
            .map(|alhs| cut_points.classify(alhs))
            .collect();
        assert_eq!(
            categories,
            vec![
                RiskCategory::Low,
                RiskCategory::Medium,
                RiskCategory::Critical
            ]
        );
    }

    #[test]
    fn boundary_values_belong_to_the_upper_tier() {
        let cut_points = RiskCutPoints::four_tier_percent();
        assert_eq!(cut_points.classify(0.0), RiskCategory::Low);
        assert_eq!(cut_points.classify(39.999), RiskCategory::Low);
        assert_eq!(cut_points.classify(40.0), RiskCategory::Medium);
        assert_eq!(cut_points.classify(59.999), RiskCategory::Medium);
        assert_eq!(cut_points.classify(60.0), RiskCategory::High);
        assert_eq!(cut_points.classify(74.999), RiskCategory::High);
        assert_eq!(cut_points.classify(75.0), RiskCategory::Critical);
        assert_eq!(cut_points.classify(100.0), RiskCategory::Critical);

        let unit = RiskCutPoints::three_tier_unit();
        assert_eq!(unit.classify(0.4), RiskCategory::Moderate);
        assert_eq!(unit.classify(0.3999), RiskCategory::Stable);
        assert_eq!(unit.classify(0.7), RiskCategory::Critical);
        assert_eq!(unit.classify(1.0), RiskCategory::Critical);
    }

    #[test]
    fn every_score_maps_to_exactly_one_tier() {
        for cut_points in [
            RiskCutPoints::four_tier_percent(),
            RiskCutPoints::three_tier_unit(),
        ] {
            let tiers = cut_points.tiers();
            for step in 0..=10_000 {
                let alhs = step as f64 / 100.0;
                let matching = tiers
                    .iter()
                    .enumerate()
                    .filter(|(position, tier)| {
                        let upper = tiers
                            .get(position + 1)
                            .map(|next| next.lower_bound)
                            .unwrap_or(f64::INFINITY);
                        alhs >= tier.lower_bound && alhs < upper
                    })
                    .map(|(_, tier)| tier.category)
                    .collect::<Vec<_>>();
                assert_eq!(matching.len(), 1, "score {alhs} matched {matching:?}");
                assert_eq!(matching[0], cut_points.classify(alhs));
            }
        }
    }

    #[test]
    fn out_of_domain_scores_fall_into_first_tier() {
        let cut_points = RiskCutPoints::three_tier_unit();
        assert_eq!(cut_points.classify(-0.5), RiskCategory::Stable);
        assert_eq!(cut_points.classify(f64::NAN), RiskCategory::Stable);
    }

    #[test]
    fn rejects_gapped_or_overlapping_definitions() {
        assert_eq!(RiskCutPoints::new(Vec::new()), Err(CutPointError::Empty));
        assert_eq!(
            RiskCutPoints::new(vec![RiskTier::new(10.0, RiskCategory::Low)]),
            Err(CutPointError::FirstBoundNotZero(10.0))
        );
        assert_eq!(
            RiskCutPoints::new(vec![
                RiskTier::new(0.0, RiskCategory::Low),
                RiskTier::new(50.0, RiskCategory::High),
                RiskTier::new(50.0, RiskCategory::Critical),
            ]),
            Err(CutPointError::NotIncreasing(50.0))
        );
        assert_eq!(
            RiskCutPoints::new(vec![
                RiskTier::new(0.0, RiskCategory::Low),
                RiskTier::new(50.0, RiskCategory::Low),
            ]),
            Err(CutPointError::DuplicateCategory(RiskCategory::Low))
        );
    }

    #[test]
    fn severity_order_comes_from_the_active_tier_set() {
        assert_eq!(
            RiskCutPoints::four_tier_percent().categories(),
            vec![
                RiskCategory::Low,
                RiskCategory::Medium,
                RiskCategory::High,
                RiskCategory::Critical,
            ]
        );
        assert_eq!(
            RiskCutPoints::three_tier_unit().categories(),
            vec![
                RiskCategory::Stable,
                RiskCategory::Moderate,
                RiskCategory::Critical,
            ]
        );
        assert!(!RiskCutPoints::four_tier_percent().contains(RiskCategory::Moderate));
    }
}
