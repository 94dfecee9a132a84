use crate::scoring::normalizer::ColumnRange;
use crate::scoring::{ScoredTable, SubIndex};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMetric {
    Ehi,
    Dsi,
    Bci,
    Alhs,
}

impl CorrelationMetric {
    pub const fn ordered() -> [Self; 4] {
        [Self::Ehi, Self::Dsi, Self::Bci, Self::Alhs]
    }

    fn column(self, table: &ScoredTable) -> Vec<f64> {
        table
            .records()
            .iter()
            .map(|record| match self {
                Self::Ehi => record.sub_index(SubIndex::Ehi),
                Self::Dsi => record.sub_index(SubIndex::Dsi),
                Self::Bci => record.sub_index(SubIndex::Bci),
                Self::Alhs => record.alhs,
            })
            .collect()
    }
}

/// Pairwise Pearson coefficients. Empty when the table has no rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<CorrelationMetric>,
    pub correlation_matrix: BTreeMap<CorrelationMetric, BTreeMap<CorrelationMetric, f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: CorrelationMetric, column: CorrelationMetric) -> Option<f64> {
        self.correlation_matrix
            .get(&row)
            .and_then(|values| values.get(&column))
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

pub(crate) fn correlation_matrix(table: &ScoredTable) -> CorrelationMatrix {
    if table.is_empty() {
        return CorrelationMatrix::default();
    }

    let metrics = CorrelationMetric::ordered();
    let columns: Vec<Vec<f64>> = metrics.iter().map(|metric| metric.column(table)).collect();

    let mut correlation_matrix = BTreeMap::new();
    for (row_position, row_metric) in metrics.iter().enumerate() {
        let mut row = BTreeMap::new();
        for (column_position, column_metric) in metrics.iter().enumerate() {
            let value = if row_position == column_position {
                1.0
            } else {
                pearson(&columns[row_position], &columns[column_position])
            };
            row.insert(*column_metric, value);
        }
        correlation_matrix.insert(*row_metric, row);
    }

    CorrelationMatrix {
        metrics: metrics.to_vec(),
        correlation_matrix,
    }
}

/// Pearson coefficient; 0 when either column has zero variance.
pub(crate) fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 || is_constant(&xs[..n]) || is_constant(&ys[..n]) {
        return 0.0;
    }

    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut covariance, mut variance_x, mut variance_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (covariance / denominator).clamp(-1.0, 1.0)
}

fn is_constant(column: &[f64]) -> bool {
    ColumnRange::of(column.iter().copied()).map_or(true, |range| range.is_degenerate())
}
