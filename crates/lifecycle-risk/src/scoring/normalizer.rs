//! Table-wide min-max normalization.
//!
//! The scale of every normalized value depends on the minimum and maximum of
//! the whole column at build time, so a value is only meaningful inside the
//! refresh epoch that produced it. Normalized columns must be recomputed for
//! the full table on every refresh and never persisted across refreshes.

use super::domain::SubIndex;
use tracing::debug;

/// Whether a high raw value means good (`Direct`) or bad (`Inverted`) health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Direct,
    Inverted,
}

/// Fixed inversion policy: enrolment coverage is good when high, demographic
/// friction and biometric backlog are bad when high.
pub const NORMALIZATION_POLICY: [(SubIndex, Orientation); 3] = [
    (SubIndex::Ehi, Orientation::Direct),
    (SubIndex::Dsi, Orientation::Inverted),
    (SubIndex::Bci, Orientation::Inverted),
];

pub fn orientation_for(index: SubIndex) -> Orientation {
    NORMALIZATION_POLICY
        .iter()
        .find(|(candidate, _)| *candidate == index)
        .map(|(_, orientation)| *orientation)
        .unwrap_or(Orientation::Direct)
}

/// Observed bounds of a column, over its present and finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    pub fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|value| value.is_finite())
            .fold(None, |range, value| match range {
                None => Some(Self {
                    min: value,
                    max: value,
                }),
                Some(Self { min, max }) => Some(Self {
                    min: min.min(value),
                    max: max.max(value),
                }),
            })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// `(x - min) / (max - min)`, or 0 when the column has zero variance.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    pub fn invert_normalize(&self, value: f64) -> f64 {
        1.0 - self.normalize(value)
    }

    pub fn apply(&self, value: f64, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Direct => self.normalize(value),
            Orientation::Inverted => self.invert_normalize(value),
        }
    }
}

pub fn normalize(column: &[f64]) -> Vec<f64> {
    normalize_dense(column, Orientation::Direct)
}

pub fn invert_normalize(column: &[f64]) -> Vec<f64> {
    normalize_dense(column, Orientation::Inverted)
}

fn normalize_dense(column: &[f64], orientation: Orientation) -> Vec<f64> {
    let sparse: Vec<Option<f64>> = column.iter().copied().map(Some).collect();
    normalize_sparse(&sparse, orientation)
        .into_iter()
        .map(|value| value.unwrap_or(0.0))
        .collect()
}

/// Normalize a column that may contain missing values. Missing and
/// non-finite entries stay missing; they do not take part in min/max.
pub fn normalize_sparse(column: &[Option<f64>], orientation: Orientation) -> Vec<Option<f64>> {
    let Some(range) = ColumnRange::of(column.iter().flatten().copied()) else {
        return vec![None; column.len()];
    };

    if range.is_degenerate() {
        debug!(value = range.min, rows = column.len(), "zero-variance column");
    }

    column
        .iter()
        .map(|value| {
            value
                .filter(|raw| raw.is_finite())
                .map(|raw| range.apply(raw, orientation))
        })
        .collect()
}
