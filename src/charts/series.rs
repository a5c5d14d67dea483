//! Series Bundle Module
//! The render-ready unit every chart consumes: position-aligned
//! label/color/value triples sharing one x axis.

use plotters::style::colors::{BLUE, CYAN, GREEN, MAGENTA, RED, YELLOW};
use plotters::style::full_palette::{BROWN, GREY, INDIGO, LIME, ORANGE, PINK, PURPLE, TEAL};
use plotters::style::RGBColor;

use super::ChartError;

/// Per-country line/marker colors, position-aligned with the country list.
pub const COUNTRY_PALETTE: [RGBColor; 14] = [
    ORANGE,  // South Africa
    PINK,    // China
    CYAN,    // India
    PURPLE,  // United States
    GREEN,   // Germany
    RED,     // France
    BLUE,    // United Kingdom
    YELLOW,  // Japan
    BROWN,   // Mexico
    GREY,    // Indonesia
    TEAL,    // Argentina
    MAGENTA, // Nigeria
    INDIGO,  // Italy
    LIME,    // Pakistan
];

/// One plottable series. Label, color and values share a single position.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub color: RGBColor,
    pub values: Vec<f64>,
}

/// An ordered set of series sharing a common x axis.
#[derive(Debug, Clone)]
pub struct SeriesBundle {
    series: Vec<Series>,
}

impl SeriesBundle {
    /// Zip parallel label/color/value lists into a bundle.
    ///
    /// The three lists must have the same length; a mismatch would silently
    /// shift every series onto the wrong label, so it is rejected here.
    pub fn new(
        labels: Vec<String>,
        colors: Vec<RGBColor>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, ChartError> {
        if labels.len() != values.len() || colors.len() != values.len() {
            return Err(ChartError::BundleShape {
                series: values.len(),
                labels: labels.len(),
                colors: colors.len(),
            });
        }
        let series = labels
            .into_iter()
            .zip(colors)
            .zip(values)
            .map(|((label, color), values)| Series {
                label,
                color,
                values,
            })
            .collect();
        Ok(Self { series })
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Every series must be exactly as long as the x axis.
    pub fn ensure_matches_axis(&self, x_len: usize) -> Result<(), ChartError> {
        for s in &self.series {
            if s.values.len() != x_len {
                return Err(ChartError::SeriesLength {
                    label: s.label.clone(),
                    len: s.values.len(),
                    expected: x_len,
                });
            }
        }
        Ok(())
    }
}
