//! Stats module - Descriptive statistics and correlation

mod calculator;
mod composite;

pub use calculator::{DescribeTable, DescriptiveStats, StatsCalculator};
pub use composite::{CompositeError, CompositeTable, CorrelationMatrix};
