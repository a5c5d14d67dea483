//! Workbook Fetch Module
//! Downloads World Bank indicator spreadsheets and cuts one sheet out of
//! them as a plain row-major table.

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to download {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("sheet has no header row")]
    MissingHeader,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single cell of a fetched sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Numeric view of the cell. Text that parses as a number counts;
    /// placeholders like `..` and blanks do not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Empty => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Row-major sheet contents with named columns.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Fetch a workbook from an `http(s)://` URL or a filesystem path and read
/// the named sheet.
///
/// The first `skip_rows` rows are discarded; the next row becomes the
/// column-name header and everything below it becomes data.
pub fn fetch_table(locator: &str, sheet: &str, skip_rows: usize) -> Result<RawTable, FetchError> {
    let range = if locator.starts_with("http://") || locator.starts_with("https://") {
        let bytes = download(locator)?;
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        workbook.worksheet_range(sheet)?
    } else {
        let mut workbook = open_workbook_auto(locator)?;
        workbook.worksheet_range(sheet)?
    };
    range_to_table(&range, skip_rows)
}

fn download(url: &str) -> Result<Vec<u8>, FetchError> {
    debug!("downloading {url}");
    let response = ureq::get(url).call().map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: Box::new(e),
    })?;
    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;
    debug!("received {} bytes from {url}", bytes.len());
    Ok(bytes)
}

fn range_to_table(range: &Range<Data>, skip_rows: usize) -> Result<RawTable, FetchError> {
    let mut rows = range.rows().skip(skip_rows);
    let header = rows.next().ok_or(FetchError::MissingHeader)?;
    let columns = header.iter().map(cell_label).collect();
    let rows = rows
        .map(|row| row.iter().map(cell_from).collect())
        .collect();
    Ok(RawTable { columns, rows })
}

fn cell_label(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_from(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (3, 2));
        // two preamble rows, then the header, then one data row
        range.set_value((0, 0), Data::String("Data Source".into()));
        range.set_value((1, 0), Data::String("Last Updated".into()));
        range.set_value((2, 0), Data::String("Country Name".into()));
        range.set_value((2, 1), Data::String("1990".into()));
        range.set_value((2, 2), Data::Float(1995.0));
        range.set_value((3, 0), Data::String(" Chile ".into()));
        range.set_value((3, 1), Data::Float(1.5));
        range.set_value((3, 2), Data::String("..".into()));
        range
    }

    #[test]
    fn header_follows_the_skipped_rows() {
        let table = range_to_table(&sample_range(), 2).unwrap();
        assert_eq!(table.columns, vec!["Country Name", "1990", "1995"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], Cell::Text("Chile".to_string()));
        assert_eq!(table.rows[0][1], Cell::Number(1.5));
    }

    #[test]
    fn placeholder_text_is_not_numeric() {
        let table = range_to_table(&sample_range(), 2).unwrap();
        assert_eq!(table.rows[0][2], Cell::Text("..".to_string()));
        assert_eq!(table.rows[0][2].as_number(), None);
        assert_eq!(Cell::Text("12.5".to_string()).as_number(), Some(12.5));
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn skipping_past_the_sheet_is_loud() {
        let err = range_to_table(&sample_range(), 10).unwrap_err();
        assert!(matches!(err, FetchError::MissingHeader));
    }
}
