//! Statistics Calculator Module
//! Descriptive statistics over table columns.

use std::fmt;

use crate::data::{fmt_value, IndicatorTable};

/// `describe()`-style summary of one column.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for a column. NaN cells are dropped.
    pub fn describe(values: &[f64]) -> DescriptiveStats {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = sorted.len();
        if n == 0 {
            return DescriptiveStats::default();
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = sorted.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        DescriptiveStats {
            count: n,
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Percentile over sorted values using linear interpolation.
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Describe every column of a table.
    pub fn describe_table(table: &IndicatorTable) -> DescribeTable {
        let columns = table.column_labels().to_vec();
        let stats = columns
            .iter()
            .map(|label| {
                // labels come from the table itself, so the lookup holds
                let values = table.column(label).unwrap_or_default();
                Self::describe(&values)
            })
            .collect();
        DescribeTable { columns, stats }
    }
}

/// Per-column summaries printed in the stat-rows-by-columns layout.
#[derive(Debug, Clone)]
pub struct DescribeTable {
    columns: Vec<String>,
    stats: Vec<DescriptiveStats>,
}

const STAT_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

impl fmt::Display for DescribeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self.columns.iter().map(|l| l.len().max(12)).collect();

        write!(f, "{:<6}", "")?;
        for (label, &w) in self.columns.iter().zip(&widths) {
            write!(f, "  {label:>w$}")?;
        }
        writeln!(f)?;

        for name in STAT_ROWS {
            write!(f, "{name:<6}")?;
            for (s, &w) in self.stats.iter().zip(&widths) {
                let cell = match name {
                    "count" => s.count.to_string(),
                    "mean" => fmt_value(s.mean),
                    "std" => fmt_value(s.std),
                    "min" => fmt_value(s.min),
                    "25%" => fmt_value(s.q25),
                    "50%" => fmt_value(s.median),
                    "75%" => fmt_value(s.q75),
                    _ => fmt_value(s.max),
                };
                write!(f, "  {cell:>w$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
