//! Data module - Workbook fetch and table reshaping

mod fetch;
mod table;

pub use fetch::{fetch_table, Cell, FetchError, RawTable};
pub use table::{IndicatorTable, TableError};

pub(crate) use table::fmt_value;
