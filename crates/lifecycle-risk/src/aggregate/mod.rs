//! Read-only views over a [`ScoredTable`].
//!
//! Every function here is a pure reduction over the snapshot it is given. An
//! empty table yields zero counts, zero sums and empty collections.

mod correlation;
pub mod views;

pub use correlation::{CorrelationMatrix, CorrelationMetric};
pub use views::{
    CategoryCount, DistributionEntry, FlagSummary, RankedDistrict, RiskDistribution,
    StateStats, SummaryStats, TopDistricts,
};

use crate::scoring::{DistrictRecord, DistrictView, FlagKind, RiskCategory, ScoredTable};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Sentinel used by callers for "no state filter".
pub const ALL_STATES: &str = "All India";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateFilter(Option<String>);

impl StateFilter {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn only(state: impl Into<String>) -> Self {
        Self::from_param(Some(state.into()))
    }

    /// Blank values and the "All India" sentinel mean no filter.
    pub fn from_param(state: Option<String>) -> Self {
        Self(state.and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_STATES) {
                None
            } else {
                Some(trimmed.to_string())
            }
        }))
    }

    pub fn state(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn matches(&self, record: &DistrictRecord) -> bool {
        self.0.as_deref().map_or(true, |state| record.state == state)
    }
}

/// Bounded result count for rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankLimit(usize);

impl RankLimit {
    pub const MIN: usize = 1;
    pub const MAX: usize = 50;
    pub const DEFAULT: Self = Self(10);

    pub fn new(limit: usize) -> Result<Self, QueryError> {
        if (Self::MIN..=Self::MAX).contains(&limit) {
            Ok(Self(limit))
        } else {
            Err(QueryError::LimitOutOfRange {
                requested: limit,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for RankLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("limit must be between {min} and {max} (got {requested})")]
    LimitOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
    #[error("unknown risk category '{0}'")]
    UnknownRiskCategory(String),
}

/// Filters for the district listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictQuery {
    pub state: StateFilter,
    pub risk_category: Option<RiskCategory>,
    pub min_alhs: Option<f64>,
    pub limit: Option<usize>,
}

impl DistrictQuery {
    fn matches(&self, record: &DistrictRecord) -> bool {
        self.state.matches(record)
            && self
                .risk_category
                .map_or(true, |category| record.risk_category == category)
            && self.min_alhs.map_or(true, |min| record.alhs >= min)
    }
}

pub fn summary(table: &ScoredTable, state: &StateFilter) -> SummaryStats {
    let records: Vec<&DistrictRecord> = filtered(table, state).collect();

    let category_counts = table
        .cut_points()
        .categories()
        .into_iter()
        .map(|category| CategoryCount {
            category,
            count: records
                .iter()
                .filter(|record| record.risk_category == category)
                .count(),
        })
        .collect();

    let mean_alhs = mean(records.iter().map(|record| record.alhs));
    let system_health = if records.is_empty() {
        0.0
    } else {
        round_to(table.scale().max() - mean_alhs, 3)
    };

    SummaryStats {
        total_districts: records.len(),
        critical_districts: records
            .iter()
            .filter(|record| record.risk_category == RiskCategory::Critical)
            .count(),
        category_counts,
        avg_alhs: round_to(mean_alhs, 2),
        total_flags: records
            .iter()
            .map(|record| u64::from(record.flags_count()))
            .sum(),
        total_population: records.iter().map(|record| record.population).sum(),
        pending_biometric_updates: records
            .iter()
            .map(|record| record.pending_biometric_updates)
            .sum(),
        avg_biometric_compliance: round_to(mean(records.iter().map(|record| record.bci)), 4),
        system_health,
    }
}

#[derive(Default)]
struct StateAccumulator {
    district_count: usize,
    alhs_total: f64,
    total_flags: u64,
    population: u64,
    critical_count: usize,
}

/// Per-state rollup, highest mean ALHS first. Only states present in the
/// table appear.
pub fn state_rollup(table: &ScoredTable) -> Vec<StateStats> {
    let mut by_state: BTreeMap<&str, StateAccumulator> = BTreeMap::new();
    for record in table.records() {
        let entry = by_state.entry(record.state.as_str()).or_default();
        entry.district_count += 1;
        entry.alhs_total += record.alhs;
        entry.total_flags += u64::from(record.flags_count());
        entry.population += record.population;
        if record.risk_category == RiskCategory::Critical {
            entry.critical_count += 1;
        }
    }

    let mut rows: Vec<(f64, StateStats)> = by_state
        .into_iter()
        .map(|(state, acc)| {
            let mean_alhs = acc.alhs_total / acc.district_count as f64;
            (
                mean_alhs,
                StateStats {
                    state: state.to_string(),
                    district_count: acc.district_count,
                    avg_alhs: round_to(mean_alhs, 2),
                    total_flags: acc.total_flags,
                    population: acc.population,
                    critical_count: acc.critical_count,
                },
            )
        })
        .collect();

    rows.sort_by(|(left, _), (right, _)| descending(*left, *right));
    rows.into_iter().map(|(_, stats)| stats).collect()
}

/// Highest-ALHS districts. Ties keep their input order.
pub fn top_districts(table: &ScoredTable, limit: RankLimit, state: &StateFilter) -> TopDistricts {
    let districts: Vec<RankedDistrict> = ranked(table, |record| state.matches(record))
        .into_iter()
        .take(limit.get())
        .map(RankedDistrict::from)
        .collect();

    TopDistricts {
        count: districts.len(),
        districts,
    }
}

pub fn list_districts(table: &ScoredTable, query: &DistrictQuery) -> Vec<DistrictView> {
    let matching = ranked(table, |record| query.matches(record));
    let limit = query.limit.unwrap_or(matching.len());
    matching
        .into_iter()
        .take(limit)
        .map(DistrictRecord::to_view)
        .collect()
}

pub fn flag_summary(table: &ScoredTable, state: &StateFilter) -> FlagSummary {
    let mut summary = FlagSummary::default();
    for record in filtered(table, state) {
        for kind in record.flags.raised() {
            match kind {
                FlagKind::LowChildCompliance => summary.low_child_compliance += 1,
                FlagKind::InfraStress => summary.infra_stress += 1,
                FlagKind::CatchupSpike => summary.catchup_spike += 1,
                FlagKind::FutureSurge => summary.future_surge += 1,
            }
        }
        let count = record.flags_count();
        summary.total_flags += u64::from(count);
        if count >= 2 {
            summary.districts_with_multiple_flags += 1;
        }
    }
    summary
}

/// Count and share of each category that occurs, in tier order.
pub fn risk_distribution(table: &ScoredTable, state: &StateFilter) -> RiskDistribution {
    let records: Vec<&DistrictRecord> = filtered(table, state).collect();
    let total = records.len();
    if total == 0 {
        return RiskDistribution::default();
    }

    let entries = table
        .cut_points()
        .categories()
        .into_iter()
        .filter_map(|category| {
            let count = records
                .iter()
                .filter(|record| record.risk_category == category)
                .count();
            (count > 0).then(|| DistributionEntry {
                category,
                count,
                percentage: round_to(count as f64 / total as f64 * 100.0, 2),
            })
        })
        .collect();

    RiskDistribution {
        total_districts: total,
        entries,
    }
}

pub fn correlation_matrix(table: &ScoredTable) -> CorrelationMatrix {
    correlation::correlation_matrix(table)
}

pub fn state_names(table: &ScoredTable) -> Vec<String> {
    table
        .records()
        .iter()
        .map(|record| record.state.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn filtered<'a>(
    table: &'a ScoredTable,
    state: &'a StateFilter,
) -> impl Iterator<Item = &'a DistrictRecord> + 'a {
    table
        .records()
        .iter()
        .filter(move |record| state.matches(record))
}

fn ranked<'a, F>(table: &'a ScoredTable, keep: F) -> Vec<&'a DistrictRecord>
where
    F: Fn(&DistrictRecord) -> bool,
{
    let mut matching: Vec<&DistrictRecord> = table
        .records()
        .iter()
        .filter(|&record| keep(record))
        .collect();
    matching.sort_by(|left, right| descending(left.alhs, right.alhs));
    matching
}

fn descending(left: f64, right: f64) -> Ordering {
    right.partial_cmp(&left).unwrap_or(Ordering::Equal)
}

fn mean<I>(values: I) -> f64
where
    I: Iterator<Item = f64>,
{
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_filter_treats_sentinel_and_blank_as_all() {
        assert_eq!(StateFilter::from_param(None), StateFilter::all());
        assert_eq!(
            StateFilter::from_param(Some("all india".to_string())),
            StateFilter::all()
        );
        assert_eq!(StateFilter::from_param(Some("  ".to_string())).state(), None);
        assert_eq!(StateFilter::only(" Kerala ").state(), Some("Kerala"));
    }

    #[test]
    fn rank_limit_is_bounded() {
        assert_eq!(RankLimit::new(1).map(RankLimit::get), Ok(1));
        assert_eq!(RankLimit::new(50).map(RankLimit::get), Ok(50));
        assert!(RankLimit::new(0).is_err());
        assert_eq!(
            RankLimit::new(51),
            Err(QueryError::LimitOutOfRange {
                requested: 51,
                min: 1,
                max: 50
            })
        );
        assert_eq!(RankLimit::default().get(), 10);
    }

    #[test]
    fn rounding_uses_fixed_precision() {
        assert_eq!(round_to(33.33333, 2), 33.33);
        assert_eq!(round_to(0.12345, 4), 0.1235);
    }
}
