use super::classifier::RiskCutPoints;
use super::composite::ScoreScale;
use super::domain::DistrictRecord;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

/// One fully scored refresh of the district extract.
///
/// Sub-indices are normalized against this table only; `epoch` identifies the
/// refresh that produced them.
#[derive(Debug, Clone)]
pub struct ScoredTable {
    records: Vec<DistrictRecord>,
    index: HashMap<String, usize>,
    scale: ScoreScale,
    cut_points: RiskCutPoints,
    epoch: u64,
    built_at: DateTime<Utc>,
}

impl ScoredTable {
    pub fn empty(scale: ScoreScale, cut_points: RiskCutPoints) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            scale,
            cut_points,
            epoch: 0,
            built_at: Utc::now(),
        }
    }

    /// Assemble a table from already scored records. Fails on a repeated id.
    pub fn from_records(
        records: Vec<DistrictRecord>,
        scale: ScoreScale,
        cut_points: RiskCutPoints,
        epoch: u64,
    ) -> Result<Self, ScoringError> {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if index.insert(record.district_id.clone(), position).is_some() {
                return Err(ScoringError::DuplicateDistrict(record.district_id.clone()));
            }
        }

        Ok(Self {
            records,
            index,
            scale,
            cut_points,
            epoch,
            built_at: Utc::now(),
        })
    }

    pub fn records(&self) -> &[DistrictRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, district_id: &str) -> Option<&DistrictRecord> {
        self.index
            .get(district_id)
            .and_then(|position| self.records.get(*position))
    }

    pub fn scale(&self) -> ScoreScale {
        self.scale
    }

    pub fn cut_points(&self) -> &RiskCutPoints {
        &self.cut_points
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn state_count(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.state.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("district id '{0}' appears more than once in the extract")]
    DuplicateDistrict(String),
}
