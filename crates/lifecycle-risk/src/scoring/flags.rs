use super::domain::{DistrictFlags, RawDistrict};
use serde::{Deserialize, Serialize};

/// Cut-offs for the early-warning flags. Sub-index thresholds are on the
/// unit scale ("1 = good"); the backlog ratio is pending biometric updates
/// per resident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagThresholds {
    pub low_compliance_bci: f64,
    pub infra_backlog_ratio: f64,
    pub catchup_dsi: f64,
    pub future_surge_ehi: f64,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self {
            low_compliance_bci: 0.40,
            infra_backlog_ratio: 0.05,
            catchup_dsi: 0.40,
            future_surge_ehi: 0.35,
        }
    }
}

/// Normalized sub-indices of one district. `None` means the metric was
/// missing from the extract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubIndices {
    pub ehi: Option<f64>,
    pub dsi: Option<f64>,
    pub bci: Option<f64>,
}

impl FlagThresholds {
    /// Each predicate is evaluated on its own; any combination may be raised.
    /// A missing sub-index never raises its flag.
    pub fn evaluate(&self, raw: &RawDistrict, indices: SubIndices) -> DistrictFlags {
        let below =
            |index: Option<f64>, threshold: f64| index.is_some_and(|value| value < threshold);
        DistrictFlags {
            low_child_compliance: below(indices.bci, self.low_compliance_bci),
            infra_stress: raw
                .biometric_backlog_ratio()
                .is_some_and(|ratio| ratio >= self.infra_backlog_ratio),
            catchup_spike: below(indices.dsi, self.catchup_dsi),
            future_surge: below(indices.ehi, self.future_surge_ehi),
        }
    }
}
