use std::fmt;

use crate::player_stats::{PlayerSeasonRow, StatColumn};

const VARIANCE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationMatrix {
    values: [[f64; 5]; 5],
    samples: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: StatColumn, b: StatColumn) -> f64 {
        self.values[a.index()][b.index()]
    }

    pub fn values(&self) -> &[[f64; 5]; 5] {
        &self.values
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Off-diagonal pair with the largest absolute coefficient.
    pub fn strongest_pair(&self) -> (StatColumn, StatColumn, f64) {
        let mut best = (StatColumn::Points, StatColumn::Rebounds, self.values[0][1]);
        for (i, a) in StatColumn::ALL.iter().enumerate() {
            for b in StatColumn::ALL.iter().skip(i + 1) {
                let r = self.get(*a, *b);
                if r.abs() > best.2.abs() {
                    best = (*a, *b, r);
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedReason {
    TooFewRows { rows: usize },
    ZeroVariance { column: StatColumn },
    NonFinite { column: StatColumn },
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedReason::TooFewRows { rows } => {
                write!(f, "insufficient data: {rows} row(s), need at least 2")
            }
            UndefinedReason::ZeroVariance { column } => {
                write!(f, "insufficient data: {} has zero variance", column.label())
            }
            UndefinedReason::NonFinite { column } => {
                write!(f, "invalid data: {} holds a non-finite value", column.label())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correlation {
    Defined(CorrelationMatrix),
    Undefined(UndefinedReason),
}

impl Correlation {
    pub fn matrix(&self) -> Option<&CorrelationMatrix> {
        match self {
            Correlation::Defined(m) => Some(m),
            Correlation::Undefined(_) => None,
        }
    }
}

/// Pearson correlation of points, rebounds, assists, steals and blocks over
/// the given rows. Never yields NaN: degenerate inputs are reported as
/// [`Correlation::Undefined`].
pub fn correlation_matrix(rows: &[&PlayerSeasonRow]) -> Correlation {
    let n = rows.len();
    if n < 2 {
        return Correlation::Undefined(UndefinedReason::TooFewRows { rows: n });
    }

    let columns: Vec<Vec<f64>> = StatColumn::ALL
        .iter()
        .map(|col| rows.iter().map(|row| row.stat(*col)).collect())
        .collect();

    for (col, values) in StatColumn::ALL.iter().zip(&columns) {
        if values.iter().any(|v| !v.is_finite()) {
            return Correlation::Undefined(UndefinedReason::NonFinite { column: *col });
        }
    }

    let count = n as f64;
    let means: Vec<f64> = columns
        .iter()
        .map(|values| values.iter().sum::<f64>() / count)
        .collect();
    let centered: Vec<Vec<f64>> = columns
        .iter()
        .zip(&means)
        .map(|(values, mean)| values.iter().map(|v| v - mean).collect())
        .collect();
    let sum_sq: Vec<f64> = centered
        .iter()
        .map(|values| values.iter().map(|v| v * v).sum())
        .collect();

    for (col, ss) in StatColumn::ALL.iter().zip(&sum_sq) {
        if ss / count < VARIANCE_EPSILON {
            return Correlation::Undefined(UndefinedReason::ZeroVariance { column: *col });
        }
    }

    let mut values = [[0.0; 5]; 5];
    for i in 0..5 {
        values[i][i] = 1.0;
        for j in (i + 1)..5 {
            let cross: f64 = centered[i]
                .iter()
                .zip(&centered[j])
                .map(|(a, b)| a * b)
                .sum();
            let r = (cross / (sum_sq[i] * sum_sq[j]).sqrt()).clamp(-1.0, 1.0);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Correlation::Defined(CorrelationMatrix { values, samples: n })
}
