//! Plotters-powered chart widgets for Ratatui.
//!
//! Two charts:
//! - `TrendChart`: smoothed price (left axis) and production (right axis) over time
//! - `ScatterChart`: raw production (x) against the selected price (y)
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`. Dates are plotted as day numbers (days from
//! the common era) and formatted back to dates for tick labels.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

const PRICE_COLOR: RGBColor = RGBColor(80, 160, 255);
const PRODUCTION_COLOR: RGBColor = RGBColor(0, 220, 120);
const SCATTER_COLOR: RGBColor = RGBColor(200, 120, 255);

/// Dual-axis time series.
pub struct TrendChart<'a> {
    /// Contiguous runs of `(day, price)`; a missing value ends a run.
    pub price: &'a [Vec<(f64, f64)>],
    pub production: &'a [Vec<(f64, f64)>],
    pub x_bounds: [f64; 2],
    pub price_bounds: [f64; 2],
    pub production_bounds: [f64; 2],
}

/// Production vs price scatter.
pub struct ScatterChart<'a> {
    pub points: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: String,
}

impl<'a> Widget for TrendChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }
        let [x0, x1] = self.x_bounds;
        let [p0, p1] = self.price_bounds;
        let [q0, q1] = self.production_bounds;
        if !(valid(self.x_bounds) && valid(self.price_bounds) && valid(self.production_bounds)) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Right, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, p0..p1)?
                .set_secondary_coord(x0..x1, q0..q1);

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("Date")
                .y_desc("Price (¢/kWh)")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_day(*v))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart
                .configure_secondary_axes()
                .y_desc("Production (MWh)")
                .y_labels(5)
                .y_label_formatter(&|v| fmt_compact(*v))
                .label_style(("sans-serif", 10).into_font().color(&PRODUCTION_COLOR))
                .axis_style(&WHITE)
                .draw()?;

            for run in self.price {
                chart.draw_series(LineSeries::new(run.iter().copied(), &PRICE_COLOR))?;
            }
            for run in self.production {
                chart.draw_secondary_series(LineSeries::new(run.iter().copied(), &PRODUCTION_COLOR))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

impl<'a> Widget for ScatterChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }
        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(valid(self.x_bounds) && valid(self.y_bounds)) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("Production (MWh)")
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_compact(*v))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // `Circle` radii are mis-scaled by the ratatui backend, so points
            // are drawn as single pixels.
            chart.draw_series(
                self.points
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), SCATTER_COLOR)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// When the available area is too small, Plotters may fail to build a chart.
/// In that case, we render a small hint rather than panicking.
fn too_small(area: Rect, buf: &mut Buffer) -> bool {
    if area.width < 20 || area.height < 8 {
        buf.set_string(
            area.x,
            area.y,
            "Chart area too small (resize terminal).",
            Style::default().fg(Color::Yellow),
        );
        return true;
    }
    false
}

fn valid(bounds: [f64; 2]) -> bool {
    bounds[0].is_finite() && bounds[1].is_finite() && bounds[1] > bounds[0]
}

/// Plot coordinate for a date.
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// X bounds for a date span, padded by 5% with at least half a month on
/// each side so a single-day selection still has a readable axis.
pub fn date_bounds(start: NaiveDate, end: NaiveDate) -> [f64; 2] {
    let (lo, hi) = (day_number(start), day_number(end));
    let pad = ((hi - lo) * 0.05).max(15.0);
    [lo - pad, hi + pad]
}

fn fmt_day(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}G", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.1}")
    }
}

/// Split a series with gaps into contiguous runs of present values.
pub fn runs(points: impl IntoIterator<Item = (f64, Option<f64>)>) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (x, y) in points {
        match y {
            Some(y) => current.push((x, y)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Padded `[min, max]` of `values`, or `fallback` when there is nothing
/// finite to bound.
pub fn padded_bounds(values: impl IntoIterator<Item = f64>, fallback: [f64; 2]) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return fallback;
    }
    if hi <= lo {
        let half = (lo.abs() * 0.05).max(0.5);
        return [lo - half, hi + half];
    }
    let pad = (hi - lo) * 0.05;
    [lo - pad, hi + pad]
}
