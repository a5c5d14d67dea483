//! Indicator Table Module
//! Reshapes a fetched sheet: column projection, key-indexed row selection,
//! and the structural transpose.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::fetch::{Cell, RawTable};

#[derive(Error, Debug)]
pub enum TableError {
    #[error("column {0:?} is not present in the source table")]
    MissingColumn(String),
    #[error("row key {0:?} is not present in the source table")]
    KeyNotFound(String),
    #[error("row key {0:?} appears more than once in the source table")]
    DuplicateKey(String),
    #[error("the column filter must name the key column")]
    EmptyColumnFilter,
}

/// A country-by-year grid with an explicit key-to-row map.
///
/// Row labels keep the order they were requested in; column labels keep the
/// order of the projection. Absent cells are `NaN`.
#[derive(Debug, Clone)]
pub struct IndicatorTable {
    row_axis: String,
    col_axis: String,
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    values: Vec<Vec<f64>>,
    index: HashMap<String, usize>,
}

impl IndicatorTable {
    /// Select `columns` (the key column first, then year labels) from
    /// `source`, then select exactly the `keys` rows in the given order.
    ///
    /// Returns the filtered table together with its transpose. Any key
    /// absent from the projected source fails the whole call; no partial
    /// table is ever produced.
    pub fn load(
        source: &RawTable,
        keys: &[String],
        columns: &[String],
    ) -> Result<(IndicatorTable, IndicatorTable), TableError> {
        let (key_column, year_columns) = columns
            .split_first()
            .ok_or(TableError::EmptyColumnFilter)?;

        // Projection: resolve every requested column before touching rows.
        let key_pos = column_position(source, key_column)?;
        let year_pos = year_columns
            .iter()
            .map(|c| column_position(source, c))
            .collect::<Result<Vec<_>, _>>()?;

        // Index source rows by key. Rows without a text key cannot be
        // addressed and are dropped here.
        let mut by_key: HashMap<&str, &Vec<Cell>> = HashMap::new();
        for row in &source.rows {
            let Some(key) = row.get(key_pos).and_then(Cell::as_text) else {
                continue;
            };
            if by_key.insert(key, row).is_some() {
                return Err(TableError::DuplicateKey(key.to_string()));
            }
        }

        // Row selection: all-or-nothing, in request order.
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let row = by_key
                .get(key.as_str())
                .ok_or_else(|| TableError::KeyNotFound(key.clone()))?;
            values.push(
                year_pos
                    .iter()
                    .map(|&c| row.get(c).and_then(Cell::as_number).unwrap_or(f64::NAN))
                    .collect(),
            );
        }

        let table = IndicatorTable::from_parts(
            key_column.clone(),
            String::new(),
            keys.to_vec(),
            year_columns.to_vec(),
            values,
        );
        let transposed = table.transpose();
        Ok((table, transposed))
    }

    fn from_parts(
        row_axis: String,
        col_axis: String,
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert!(values.iter().all(|row| row.len() == column_labels.len()));
        let index = row_labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        Self {
            row_axis,
            col_axis,
            row_labels,
            column_labels,
            values,
            index,
        }
    }

    /// Pure structural transpose: rows become columns and the axis labels
    /// swap. Never mutated in place; always recomputed from the source.
    pub fn transpose(&self) -> IndicatorTable {
        let values = (0..self.column_labels.len())
            .map(|c| self.values.iter().map(|row| row[c]).collect())
            .collect();
        IndicatorTable::from_parts(
            self.col_axis.clone(),
            self.row_axis.clone(),
            self.column_labels.clone(),
            self.row_labels.clone(),
            values,
        )
    }

    /// Values of one row, addressed by key.
    pub fn row(&self, key: &str) -> Result<&[f64], TableError> {
        self.index
            .get(key)
            .map(|&i| self.values[i].as_slice())
            .ok_or_else(|| TableError::KeyNotFound(key.to_string()))
    }

    /// Values of one column, addressed by label.
    pub fn column(&self, label: &str) -> Result<Vec<f64>, TableError> {
        let c = self
            .column_labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| TableError::MissingColumn(label.to_string()))?;
        Ok(self.values.iter().map(|row| row[c]).collect())
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }
}

fn column_position(source: &RawTable, name: &str) -> Result<usize, TableError> {
    source
        .columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| TableError::MissingColumn(name.to_string()))
}

/// Cell text used by every table `Display` impl. NaN prints as `NaN`.
pub(crate) fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.4}")
    }
}

impl fmt::Display for IndicatorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key_width = self
            .row_labels
            .iter()
            .map(String::len)
            .chain([self.row_axis.len()])
            .max()
            .unwrap_or(0)
            .max(4);
        let widths: Vec<usize> = self
            .column_labels
            .iter()
            .map(|l| l.len().max(12))
            .collect();

        write!(f, "{:<key_width$}", self.row_axis)?;
        for (label, &w) in self.column_labels.iter().zip(&widths) {
            write!(f, "  {label:>w$}")?;
        }
        writeln!(f)?;

        for (label, row) in self.row_labels.iter().zip(&self.values) {
            write!(f, "{label:<key_width$}")?;
            for (&v, &w) in row.iter().zip(&widths) {
                write!(f, "  {:>w$}", fmt_value(v))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> RawTable {
        RawTable {
            columns: vec![
                "Country Name".to_string(),
                "Country Code".to_string(),
                "1990".to_string(),
                "1995".to_string(),
            ],
            rows: vec![
                vec![
                    Cell::Text("Chile".to_string()),
                    Cell::Text("CHL".to_string()),
                    Cell::Number(1.0),
                    Cell::Number(2.0),
                ],
                vec![
                    Cell::Text("Kenya".to_string()),
                    Cell::Text("KEN".to_string()),
                    Cell::Number(3.0),
                    Cell::Empty,
                ],
                vec![
                    Cell::Text("Norway".to_string()),
                    Cell::Text("NOR".to_string()),
                    Cell::Text("..".to_string()),
                    Cell::Number(6.0),
                ],
            ],
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn assert_same(a: &IndicatorTable, b: &IndicatorTable) {
        assert_eq!(a.row_labels(), b.row_labels());
        assert_eq!(a.column_labels(), b.column_labels());
        for key in a.row_labels() {
            let (ra, rb) = (a.row(key).unwrap(), b.row(key).unwrap());
            assert_eq!(ra.len(), rb.len());
            for (x, y) in ra.iter().zip(rb) {
                assert!(x.total_cmp(y).is_eq(), "{key}: {x} != {y}");
            }
        }
    }

    #[test]
    fn selects_rows_in_request_order() {
        let keys = names(&["Norway", "Chile"]);
        let columns = names(&["Country Name", "1990", "1995"]);
        let (table, _) = IndicatorTable::load(&source(), &keys, &columns).unwrap();
        assert_eq!(table.row_labels(), keys.as_slice());
        assert_eq!(table.row("Chile").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn three_rows_two_years_transposes_to_two_by_three() {
        let keys = names(&["Chile", "Kenya", "Norway"]);
        let columns = names(&["Country Name", "1990", "1995"]);
        let (table, transposed) = IndicatorTable::load(&source(), &keys, &columns).unwrap();

        assert_eq!(table.row_labels().len(), 3);
        assert_eq!(table.column_labels().len(), 2);
        assert_eq!(transposed.row_labels(), &["1990", "1995"]);
        assert_eq!(transposed.column_labels(), keys.as_slice());
        assert_eq!(transposed.column("Chile").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn double_transpose_is_identity() {
        let keys = names(&["Chile", "Kenya", "Norway"]);
        let columns = names(&["Country Name", "1990", "1995"]);
        let (table, transposed) = IndicatorTable::load(&source(), &keys, &columns).unwrap();
        assert_same(&table, &transposed.transpose());
    }

    #[test]
    fn non_numeric_cells_become_nan() {
        let keys = names(&["Kenya", "Norway"]);
        let columns = names(&["Country Name", "1990", "1995"]);
        let (table, _) = IndicatorTable::load(&source(), &keys, &columns).unwrap();
        assert!(table.row("Kenya").unwrap()[1].is_nan());
        assert!(table.row("Norway").unwrap()[0].is_nan());
    }

    #[test]
    fn absent_key_fails_loudly() {
        let keys = names(&["Chile", "Wakanda"]);
        let columns = names(&["Country Name", "1990", "1995"]);
        let err = IndicatorTable::load(&source(), &keys, &columns).unwrap_err();
        assert!(matches!(err, TableError::KeyNotFound(key) if key == "Wakanda"));
    }

    #[test]
    fn absent_column_fails_before_row_selection() {
        let keys = names(&["Wakanda"]);
        let columns = names(&["Country Name", "2050"]);
        let err = IndicatorTable::load(&source(), &keys, &columns).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn(col) if col == "2050"));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut dup = source();
        dup.rows.push(dup.rows[0].clone());
        let keys = names(&["Chile"]);
        let columns = names(&["Country Name", "1990"]);
        let err = IndicatorTable::load(&dup, &keys, &columns).unwrap_err();
        assert!(matches!(err, TableError::DuplicateKey(key) if key == "Chile"));
    }

    #[test]
    fn unknown_column_lookup_is_loud() {
        let keys = names(&["Chile"]);
        let columns = names(&["Country Name", "1990"]);
        let (table, _) = IndicatorTable::load(&source(), &keys, &columns).unwrap();
        assert!(matches!(
            table.column("1995"),
            Err(TableError::MissingColumn(_))
        ));
        assert!(matches!(table.row("Kenya"), Err(TableError::KeyNotFound(_))));
    }

    #[test]
    fn display_prints_labels_and_nan() {
        let keys = names(&["Kenya"]);
        let columns = names(&["Country Name", "1990", "1995"]);
        let (table, _) = IndicatorTable::load(&source(), &keys, &columns).unwrap();
        let text = table.to_string();
        assert!(text.contains("Country Name"));
        assert!(text.contains("Kenya"));
        assert!(text.contains("NaN"));
    }
}
