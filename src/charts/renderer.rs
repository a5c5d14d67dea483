//! Static Chart Renderer
//! Renders the four report charts as SVG files.
//!
//! Layout for the series charts:
//! 1. Title centered over the plot area
//! 2. Plot area with axis labels on the left/bottom
//! 3. Legend strip right of the plot area: colored boxes + series names
//!
//! The heatmap swaps the legend strip for a colorbar.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use super::{ChartError, SeriesBundle};
use crate::stats::{CompositeTable, CorrelationMatrix};

/// Chart surface in pixels.
const CHART_SIZE: (u32, u32) = (1280, 720);
/// Heatmaps get extra height for the rotated tick labels.
const HEATMAP_SIZE: (u32, u32) = (1280, 920);
/// Width of the legend / colorbar strip right of the plot area.
const SIDE_STRIP: u32 = 250;

/// Heat ramp endpoints (dark blue to yellow) and the color of absent cells.
const HEAT_LOW: RGBColor = RGBColor(0, 34, 78);
const HEAT_HIGH: RGBColor = RGBColor(254, 232, 56);
const HEAT_MISSING: RGBColor = RGBColor(130, 130, 130);

/// Creates the report charts. All operations are stateless: render one file
/// and return, holding nothing between calls.
pub struct ChartRenderer;

impl ChartRenderer {
    /// One polyline per series over a shared labeled x axis. Runs of absent
    /// values leave gaps instead of being bridged.
    pub fn multi_line_plot(
        path: &Path,
        x_labels: &[String],
        bundle: &SeriesBundle,
        x_desc: &str,
        y_desc: &str,
        title: &str,
    ) -> Result<(), ChartError> {
        bundle.ensure_matches_axis(x_labels.len())?;

        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(to_render)?;
        let (plot, side) = root.split_horizontally((CHART_SIZE.0 - SIDE_STRIP) as i32);

        let n = x_labels.len();
        let (y_min, y_max) = value_range(bundle);
        let mut chart = ChartBuilder::on(&plot)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 50)
            .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_min..y_max)
            .map_err(to_render)?;

        let formatter = |v: &f64| index_label(x_labels, v);
        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_labels(n)
            .x_label_formatter(&formatter)
            .draw()
            .map_err(to_render)?;

        for s in bundle.series() {
            for run in finite_runs(&s.values) {
                chart
                    .draw_series(LineSeries::new(run, &s.color))
                    .map_err(to_render)?;
            }
        }

        draw_legend(&side, bundle)?;
        root.present().map_err(to_render)
    }

    /// One fixed-size marker set per series; same axis and legend layout as
    /// the line chart.
    pub fn scatter_plot(
        path: &Path,
        x_labels: &[String],
        bundle: &SeriesBundle,
        x_desc: &str,
        y_desc: &str,
        title: &str,
    ) -> Result<(), ChartError> {
        bundle.ensure_matches_axis(x_labels.len())?;

        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(to_render)?;
        let (plot, side) = root.split_horizontally((CHART_SIZE.0 - SIDE_STRIP) as i32);

        let n = x_labels.len();
        let (y_min, y_max) = value_range(bundle);
        let mut chart = ChartBuilder::on(&plot)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 50)
            .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_min..y_max)
            .map_err(to_render)?;

        let formatter = |v: &f64| index_label(x_labels, v);
        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_labels(n)
            .x_label_formatter(&formatter)
            .draw()
            .map_err(to_render)?;

        for s in bundle.series() {
            let color = s.color;
            chart
                .draw_series(
                    s.values
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| v.is_finite())
                        .map(|(i, &v)| Circle::new((i as f64, v), 4, color.filled())),
                )
                .map_err(to_render)?;
        }

        draw_legend(&side, bundle)?;
        root.present().map_err(to_render)
    }

    /// Grouped bars: for each category, series `i` sits at offset `i * width`
    /// from the group's base edge, and the whole group is centered under the
    /// category tick.
    pub fn grouped_bar_plot(
        path: &Path,
        categories: &[String],
        width: f64,
        bundle: &SeriesBundle,
        y_desc: &str,
        title: &str,
        rotate_labels: bool,
    ) -> Result<(), ChartError> {
        bundle.ensure_matches_axis(categories.len())?;

        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(to_render)?;
        let (plot, side) = root.split_horizontally((CHART_SIZE.0 - SIDE_STRIP) as i32);

        let n = categories.len();
        let k = bundle.len();
        let (data_min, data_max) = value_range(bundle);
        let y_min = data_min.min(0.0);

        let mut chart = ChartBuilder::on(&plot)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(
                LabelAreaPosition::Bottom,
                if rotate_labels { 130 } else { 50 },
            )
            .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_min..data_max)
            .map_err(to_render)?;

        let formatter = |v: &f64| index_label(categories, v);
        let mut mesh = chart.configure_mesh();
        mesh.y_desc(y_desc)
            .x_labels(n)
            .x_label_formatter(&formatter)
            .disable_x_mesh();
        if rotate_labels {
            mesh.x_label_style(
                ("sans-serif", 12)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            );
        }
        mesh.draw().map_err(to_render)?;

        for (j, s) in bundle.series().iter().enumerate() {
            let color = s.color;
            chart
                .draw_series(
                    s.values
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| v.is_finite())
                        .map(|(i, &v)| {
                            let (left, right) = bar_span(i as f64, k, width, j);
                            Rectangle::new([(left, 0.0), (right, v)], color.filled())
                        }),
                )
                .map_err(to_render)?;
        }

        draw_legend(&side, bundle)?;
        root.present().map_err(to_render)
    }

    /// Color-mapped correlation matrix with every cell annotated to two
    /// decimal places and axis ticks labeled with the composite's columns.
    pub fn correlation_heatmap(
        path: &Path,
        table: &CompositeTable,
        corr: &CorrelationMatrix,
        title: &str,
    ) -> Result<(), ChartError> {
        let labels = table.columns();
        let n = corr.len();

        let root = SVGBackend::new(path, HEATMAP_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(to_render)?;
        let (plot, side) = root.split_horizontally((HEATMAP_SIZE.0 - SIDE_STRIP) as i32);

        let mut chart = ChartBuilder::on(&plot)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .set_label_area_size(LabelAreaPosition::Left, 220)
            .set_label_area_size(LabelAreaPosition::Bottom, 220)
            .build_cartesian_2d(-0.5..(n as f64 - 0.5), -0.5..(n as f64 - 0.5))
            .map_err(to_render)?;

        // Matrix row 0 is drawn in the top band.
        let x_formatter = |v: &f64| index_label(labels, v);
        let y_formatter = |v: &f64| flipped_label(labels, v);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .draw()
            .map_err(to_render)?;

        for i in 0..n {
            let y = (n - 1 - i) as f64;
            for j in 0..n {
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(j as f64 - 0.5, y - 0.5), (j as f64 + 0.5, y + 0.5)],
                        heat_color(corr.get(i, j)).filled(),
                    )))
                    .map_err(to_render)?;
            }
        }

        // Annotations go on top of the cells.
        let annot = ("sans-serif", 14)
            .into_font()
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));
        for i in 0..n {
            let y = (n - 1 - i) as f64;
            for j in 0..n {
                chart
                    .draw_series(std::iter::once(Text::new(
                        format!("{:.2}", corr.get(i, j)),
                        (j as f64, y),
                        annot.clone(),
                    )))
                    .map_err(to_render)?;
            }
        }

        draw_colorbar(&side)?;
        root.present().map_err(to_render)
    }
}

fn to_render<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

/// Tick label for an index-based axis; off-tick positions stay blank.
fn index_label(labels: &[String], value: &f64) -> String {
    let idx = value.round();
    if idx < 0.0 || (value - idx).abs() > 0.25 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Same as `index_label`, reading the labels from the far end first.
fn flipped_label(labels: &[String], value: &f64) -> String {
    let idx = value.round();
    if idx < 0.0 || (value - idx).abs() > 0.25 {
        return String::new();
    }
    let idx = idx as usize;
    if idx >= labels.len() {
        return String::new();
    }
    labels[labels.len() - 1 - idx].clone()
}

/// Padded value range over every finite value in the bundle.
fn value_range(bundle: &SeriesBundle) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in bundle.series() {
        for &v in &s.values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    if !min.is_finite() {
        return (0.0, 100.0);
    }
    let pad = if max > min { (max - min) * 0.08 } else { 1.0 };
    (min - pad, max + pad)
}

/// Contiguous finite runs of a series as (index, value) points.
fn finite_runs(values: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        if v.is_finite() {
            current.push((i as f64, v));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Horizontal span of series `series_idx` within the group centered on
/// `center`. The group's base edge sits half the group width left of the
/// tick and consecutive series are offset by exactly `width`.
fn bar_span(center: f64, n_series: usize, width: f64, series_idx: usize) -> (f64, f64) {
    let base = center - n_series as f64 * width / 2.0;
    let left = base + series_idx as f64 * width;
    (left, left + width)
}

fn heat_color(r: f64) -> RGBColor {
    if r.is_nan() {
        return HEAT_MISSING;
    }
    let t = ((r + 1.0) / 2.0).clamp(0.0, 1.0);
    blend(HEAT_LOW, HEAT_HIGH, t)
}

fn blend(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let ch = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
    RGBColor(ch(a.0, b.0), ch(a.1, b.1), ch(a.2, b.2))
}

/// Colored boxes and series names, drawn top-down in the side strip.
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    bundle: &SeriesBundle,
) -> Result<(), ChartError> {
    let text = ("sans-serif", 14).into_font();
    let mut y = 40i32;
    for s in bundle.series() {
        area.draw(&Rectangle::new([(12, y), (30, y + 13)], s.color.filled()))
            .map_err(to_render)?;
        area.draw(&Text::new(s.label.clone(), (38, y + 1), text.clone()))
            .map_err(to_render)?;
        y += 22;
    }
    Ok(())
}

/// Vertical ramp from +1 at the top to -1 at the bottom.
fn draw_colorbar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
    const STEPS: i32 = 64;
    let (x0, w, top, h) = (30, 26, 60, 480);
    for s in 0..STEPS {
        let t = 1.0 - (f64::from(s) + 0.5) / f64::from(STEPS);
        let y0 = top + s * h / STEPS;
        let y1 = top + (s + 1) * h / STEPS;
        area.draw(&Rectangle::new(
            [(x0, y0), (x0 + w, y1)],
            blend(HEAT_LOW, HEAT_HIGH, t).filled(),
        ))
        .map_err(to_render)?;
    }

    let text = ("sans-serif", 13).into_font();
    area.draw(&Text::new("1.00", (x0 + w + 8, top - 6), text.clone()))
        .map_err(to_render)?;
    area.draw(&Text::new("0.00", (x0 + w + 8, top + h / 2 - 6), text.clone()))
        .map_err(to_render)?;
    area.draw(&Text::new("-1.00", (x0 + w + 8, top + h - 6), text))
        .map_err(to_render)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Cell, IndicatorTable, RawTable};
    use plotters::style::colors::{BLUE, GREEN, RED};
    use std::path::PathBuf;

    fn temp_svg(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wdi_trends_{}_{}.svg", name, std::process::id()))
    }

    fn x_labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}", 1990 + 5 * i)).collect()
    }

    fn bundle(lens: &[usize]) -> SeriesBundle {
        let labels = (0..lens.len()).map(|i| format!("series {i}")).collect();
        let colors = vec![RED, GREEN, BLUE]
            .into_iter()
            .cycle()
            .take(lens.len())
            .collect();
        let values = lens
            .iter()
            .map(|&len| (0..len).map(|v| v as f64).collect())
            .collect();
        SeriesBundle::new(labels, colors, values).unwrap()
    }

    #[test]
    fn consecutive_series_offset_by_width() {
        let width = 0.2;
        for j in 0..3 {
            let (left_j, right_j) = bar_span(5.0, 4, width, j);
            let (left_next, _) = bar_span(5.0, 4, width, j + 1);
            assert!((right_j - left_j - width).abs() < 1e-12);
            assert!((left_next - left_j - width).abs() < 1e-12);
        }
    }

    #[test]
    fn bar_group_is_centered_on_its_tick() {
        let width = 0.2;
        let (first_left, _) = bar_span(3.0, 4, width, 0);
        let (_, last_right) = bar_span(3.0, 4, width, 3);
        assert!(((first_left + last_right) / 2.0 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn finite_runs_break_at_gaps() {
        let runs = finite_runs(&[1.0, 2.0, f64::NAN, 4.0, 5.0]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![(0.0, 1.0), (1.0, 2.0)]);
        assert_eq!(runs[1], vec![(3.0, 4.0), (4.0, 5.0)]);
    }

    #[test]
    fn heat_ramp_covers_both_endpoints() {
        let low = heat_color(-1.0);
        let high = heat_color(1.0);
        assert_eq!((low.0, low.1, low.2), (HEAT_LOW.0, HEAT_LOW.1, HEAT_LOW.2));
        assert_eq!(
            (high.0, high.1, high.2),
            (HEAT_HIGH.0, HEAT_HIGH.1, HEAT_HIGH.2)
        );
        let missing = heat_color(f64::NAN);
        assert_eq!(missing.0, HEAT_MISSING.0);
    }

    #[test]
    fn value_range_ignores_absent_values() {
        let b = SeriesBundle::new(
            vec!["a".to_string()],
            vec![RED],
            vec![vec![f64::NAN, 2.0, 10.0]],
        )
        .unwrap();
        let (min, max) = value_range(&b);
        assert!(min < 2.0 && min > 0.0);
        assert!(max > 10.0 && max < 12.0);
    }

    #[test]
    fn three_series_of_five_render() {
        let path = temp_svg("lines");
        ChartRenderer::multi_line_plot(
            &path,
            &x_labels(5),
            &bundle(&[5, 5, 5]),
            "Years",
            "Value",
            "Lines",
        )
        .unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn short_series_is_rejected_before_drawing() {
        let path = temp_svg("lines_short");
        let err = ChartRenderer::multi_line_plot(
            &path,
            &x_labels(5),
            &bundle(&[5, 5, 4]),
            "Years",
            "Value",
            "Lines",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ChartError::SeriesLength { len: 4, expected: 5, .. }
        ));
        assert!(!path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn scatter_renders_markers() {
        let path = temp_svg("scatter");
        ChartRenderer::scatter_plot(
            &path,
            &x_labels(4),
            &bundle(&[4, 4]),
            "Years",
            "Value",
            "Scatter",
        )
        .unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn grouped_bars_render() {
        let path = temp_svg("bars");
        let categories: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        ChartRenderer::grouped_bar_plot(
            &path,
            &categories,
            0.2,
            &bundle(&[3, 3]),
            "Value",
            "Bars",
            true,
        )
        .unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn heatmap_renders_with_annotations() {
        let years = ["1990", "1995", "2000"];
        let mut columns = vec!["Country Name".to_string()];
        columns.extend(years.iter().map(|y| y.to_string()));
        let raw = |values: [f64; 3]| RawTable {
            columns: columns.clone(),
            rows: vec![{
                let mut row = vec![Cell::Text("Mexico".to_string())];
                row.extend(values.iter().map(|&v| Cell::Number(v)));
                row
            }],
        };
        let keys = vec!["Mexico".to_string()];
        let (up, _) = IndicatorTable::load(&raw([1.0, 2.0, 3.0]), &keys, &columns).unwrap();
        let (down, _) = IndicatorTable::load(&raw([9.0, 5.0, 1.0]), &keys, &columns).unwrap();
        let composite = crate::stats::CompositeTable::from_indicators(
            "Mexico",
            &[("Up", &up), ("Down", &down)],
        )
        .unwrap();
        let corr = composite.correlation();

        let path = temp_svg("heatmap");
        ChartRenderer::correlation_heatmap(&path, &composite, &corr, "Mexico").unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("1.00"));
        std::fs::remove_file(&path).ok();
    }
}
