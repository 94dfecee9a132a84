use crate::scoring::{DistrictRecord, FlagKind, RiskCategory};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: RiskCategory,
    pub count: usize,
}

/// National (or single-state) headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_districts: usize,
    pub critical_districts: usize,
    pub category_counts: Vec<CategoryCount>,
    pub avg_alhs: f64,
    pub total_flags: u64,
    pub total_population: u64,
    pub pending_biometric_updates: u64,
    pub avg_biometric_compliance: f64,
    /// Scale maximum minus mean ALHS; higher is healthier.
    pub system_health: f64,
}

impl SummaryStats {
    pub fn count_for(&self, category: RiskCategory) -> usize {
        self.category_counts
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateStats {
    pub state: String,
    pub district_count: usize,
    pub avg_alhs: f64,
    pub total_flags: u64,
    pub population: u64,
    pub critical_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDistrict {
    pub district_id: String,
    pub district_name: String,
    pub state: String,
    pub alhs: f64,
    pub flags_count: u8,
    pub population: u64,
    pub risk_category: RiskCategory,
}

impl From<&DistrictRecord> for RankedDistrict {
    fn from(record: &DistrictRecord) -> Self {
        Self {
            district_id: record.district_id.clone(),
            district_name: record.district_name.clone(),
            state: record.state.clone(),
            alhs: record.alhs,
            flags_count: record.flags_count(),
            population: record.population,
            risk_category: record.risk_category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDistricts {
    pub count: usize,
    pub districts: Vec<RankedDistrict>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlagSummary {
    pub low_child_compliance: usize,
    pub infra_stress: usize,
    pub catchup_spike: usize,
    pub future_surge: usize,
    pub total_flags: u64,
    pub districts_with_multiple_flags: usize,
}

impl FlagSummary {
    pub fn count_for(&self, kind: FlagKind) -> usize {
        match kind {
            FlagKind::LowChildCompliance => self.low_child_compliance,
            FlagKind::InfraStress => self.infra_stress,
            FlagKind::CatchupSpike => self.catchup_spike,
            FlagKind::FutureSurge => self.future_surge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub category: RiskCategory,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskDistribution {
    pub total_districts: usize,
    pub entries: Vec<DistributionEntry>,
}

impl RiskDistribution {
    pub fn percentage_total(&self) -> f64 {
        self.entries.iter().map(|entry| entry.percentage).sum()
    }
}
