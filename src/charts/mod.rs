//! Charts module - Series bundling and chart rendering

mod renderer;
mod series;

pub use renderer::ChartRenderer;
pub use series::{Series, SeriesBundle, COUNTRY_PALETTE};

use thiserror::Error;

/// Errors raised while assembling or rendering charts.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("bundle has {series} series but {labels} labels and {colors} colors")]
    BundleShape {
        series: usize,
        labels: usize,
        colors: usize,
    },
    #[error("series {label:?} has {len} values but the x axis has {expected}")]
    SeriesLength {
        label: String,
        len: usize,
        expected: usize,
    },
    #[error("chart rendering failed: {0}")]
    Render(String),
}
