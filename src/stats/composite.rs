//! Composite Table Module
//! Assembles several indicators for one entity and derives the Pearson
//! correlation matrix consumed by the heatmap.

use std::fmt;

use thiserror::Error;

use crate::data::{fmt_value, IndicatorTable, TableError};

#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("a composite table needs at least one indicator")]
    Empty,
    #[error("indicator {0:?} does not share the composite year axis")]
    MisalignedAxis(String),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Several indicators for one entity, as columns aligned by year.
#[derive(Debug, Clone)]
pub struct CompositeTable {
    entity: String,
    row_labels: Vec<String>,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CompositeTable {
    /// Pull `entity`'s row out of each indicator table.
    ///
    /// Every table must share the same year axis; the entity must be
    /// present in all of them.
    pub fn from_indicators(
        entity: &str,
        sources: &[(&str, &IndicatorTable)],
    ) -> Result<Self, CompositeError> {
        let (_, first) = sources.first().ok_or(CompositeError::Empty)?;
        let years = first.column_labels().to_vec();

        let mut columns = Vec::with_capacity(sources.len());
        let mut series: Vec<Vec<f64>> = Vec::with_capacity(sources.len());
        for (label, table) in sources {
            if table.column_labels() != years.as_slice() {
                return Err(CompositeError::MisalignedAxis(label.to_string()));
            }
            series.push(table.row(entity)?.to_vec());
            columns.push(label.to_string());
        }

        let values = (0..years.len())
            .map(|r| series.iter().map(|col| col[r]).collect())
            .collect();

        Ok(Self {
            entity: entity.to_string(),
            row_labels: years,
            columns,
            values,
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn column_values(&self, c: usize) -> Vec<f64> {
        self.values.iter().map(|row| row[c]).collect()
    }

    /// Pairwise-complete Pearson correlation of the columns.
    ///
    /// The diagonal is exactly 1.0 for a column with variance and NaN for a
    /// constant (or near-empty) column.
    pub fn correlation(&self) -> CorrelationMatrix {
        let k = self.columns.len();
        let cols: Vec<Vec<f64>> = (0..k).map(|c| self.column_values(c)).collect();

        let mut values = vec![vec![f64::NAN; k]; k];
        for i in 0..k {
            values[i][i] = if constant_column(&cols[i]) { f64::NAN } else { 1.0 };
            for j in (i + 1)..k {
                let r = pearson(&cols[i], &cols[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        CorrelationMatrix {
            labels: self.columns.clone(),
            values,
        }
    }
}

/// Pearson correlation over the pairs where both sides are present.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in &pairs {
        let dx = x - mx;
        let dy = y - my;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        sxy / denom
    }
}

fn constant_column(values: &[f64]) -> bool {
    let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    finite.len() < 2 || finite.iter().all(|v| *v == finite[0])
}

/// Square, symmetric correlation matrix over a composite table's columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

impl fmt::Display for CompositeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        grid(f, "", &self.row_labels, &self.columns, &self.values)
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        grid(f, "", &self.labels, &self.labels, &self.values)
    }
}

fn grid(
    f: &mut fmt::Formatter<'_>,
    corner: &str,
    row_labels: &[String],
    columns: &[String],
    values: &[Vec<f64>],
) -> fmt::Result {
    let key_width = row_labels
        .iter()
        .map(String::len)
        .chain([corner.len()])
        .max()
        .unwrap_or(0)
        .max(4);
    let widths: Vec<usize> = columns.iter().map(|l| l.len().max(12)).collect();

    write!(f, "{corner:<key_width$}")?;
    for (label, &w) in columns.iter().zip(&widths) {
        write!(f, "  {label:>w$}")?;
    }
    writeln!(f)?;

    for (label, row) in row_labels.iter().zip(values) {
        write!(f, "{label:<key_width$}")?;
        for (&v, &w) in row.iter().zip(&widths) {
            write!(f, "  {:>w$}", fmt_value(v))?;
        }
        writeln!(f)?;
    }
    Ok(())
}
