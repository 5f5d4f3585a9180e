//! Chart geometry engine.
//!
//! Pure functions turning a labeled series into the shapes of a bar, line
//! or pie chart. Nothing here draws; [`crate::chart::svg`] renders the
//! results. Every function returns [`Geometry::NoData`] for input it cannot
//! chart, so callers can tell "nothing to show" apart from "all zeros".

use crate::models::{round1, series_total, SeriesEntry};
use serde::Serialize;

/// Geometry of a chart, or the explicit absence of data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "shapes", rename_all = "snake_case")]
pub enum Geometry<T> {
    NoData,
    Drawn(T),
}

impl<T> Geometry<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Geometry::NoData)
    }

    #[allow(dead_code)] // Convenience accessor for consumers of the geometry
    pub fn drawn(&self) -> Option<&T> {
        match self {
            Geometry::NoData => None,
            Geometry::Drawn(shapes) => Some(shapes),
        }
    }
}

/// Evenly spaced hue for entry `index` of a `len`-entry series.
pub fn hue_color(index: usize, len: usize) -> String {
    let hue = index as f64 * 360.0 / len.max(1) as f64;
    format!("hsl({}, 70%, 50%)", format_number(hue))
}

fn entry_color(entry: &SeriesEntry, index: usize, len: usize) -> String {
    entry
        .color
        .clone()
        .unwrap_or_else(|| hue_color(index, len))
}

/// Format a coordinate with at most three decimals and no negative zero.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0 + 0.0;
    format!("{}", rounded)
}

/// Outer size of a rectangular chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 350.0,
            padding: 60.0,
        }
    }
}

impl ChartFrame {
    /// Drawable width between the paddings.
    pub fn inner_width(&self) -> f64 {
        self.width - 2.0 * self.padding
    }

    pub fn inner_height(&self) -> f64 {
        self.height - 2.0 * self.padding
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Bar height relative to the chart maximum.
    pub height_fraction: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGeometry {
    pub bars: Vec<Bar>,
    pub max_value: f64,
}

/// Bar heights relative to `max_value`, or to the series maximum.
///
/// A zero (or negative) maximum yields zero-height bars.
pub fn bar_geometry(series: &[SeriesEntry], max_value: Option<f64>) -> Geometry<BarGeometry> {
    if series.is_empty() {
        return Geometry::NoData;
    }

    let max_value = max_value
        .unwrap_or_else(|| series.iter().map(|e| e.value).fold(f64::NEG_INFINITY, f64::max));

    let bars = series
        .iter()
        .enumerate()
        .map(|(index, entry)| Bar {
            label: entry.label.clone(),
            value: entry.value,
            height_fraction: if max_value > 0.0 {
                entry.value / max_value
            } else {
                0.0
            },
            color: entry_color(entry, index, series.len()),
        })
        .collect();

    Geometry::Drawn(BarGeometry { bars, max_value })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub value: f64,
}

/// A y-axis label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineGeometry {
    pub frame: ChartFrame,
    pub points: Vec<LinePoint>,
    /// SVG path commands joining the points.
    pub path: String,
    pub y_ticks: Vec<AxisTick>,
    pub min_value: f64,
    pub max_value: f64,
}

const TICK_FRACTIONS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Points of a line chart laid out by index across the frame.
///
/// x runs from `padding` to `width - padding`; a single point sits at
/// `padding`. y maps the value range onto `[height - padding, padding]`,
/// with a flat series treated as a range of 1.
pub fn line_geometry(series: &[SeriesEntry], frame: ChartFrame) -> Geometry<LineGeometry> {
    if series.is_empty() {
        return Geometry::NoData;
    }

    let max_value = series.iter().map(|e| e.value).fold(f64::NEG_INFINITY, f64::max);
    let min_value = series.iter().map(|e| e.value).fold(f64::INFINITY, f64::min);
    let range = if max_value - min_value == 0.0 {
        1.0
    } else {
        max_value - min_value
    };

    let intervals = series.len().saturating_sub(1);
    let baseline = frame.height - frame.padding;

    let points: Vec<LinePoint> = series
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let x = if intervals == 0 {
                frame.padding
            } else {
                frame.padding + (index as f64 / intervals as f64) * frame.inner_width()
            };
            let y = baseline - ((entry.value - min_value) / range) * frame.inner_height();
            LinePoint {
                x,
                y,
                label: entry.label.clone(),
                value: entry.value,
            }
        })
        .collect();

    let path = points
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let command = if index == 0 { "M" } else { "L" };
            format!("{} {} {}", command, format_number(p.x), format_number(p.y))
        })
        .collect::<Vec<_>>()
        .join(" ");

    let y_ticks = TICK_FRACTIONS
        .iter()
        .map(|ratio| AxisTick {
            value: (min_value + ratio * range).round(),
            y: baseline - ratio * frame.inner_height(),
        })
        .collect();

    Geometry::Drawn(LineGeometry {
        frame,
        points,
        path,
        y_ticks,
        min_value,
        max_value,
    })
}

/// Center and radius of a pie in its own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PieFrame {
    pub center: f64,
    pub radius: f64,
}

impl Default for PieFrame {
    fn default() -> Self {
        Self {
            center: 50.0,
            radius: 40.0,
        }
    }
}

impl PieFrame {
    /// Point on the circle at `angle_deg` (0° is 3 o'clock, clockwise).
    fn point_at(&self, angle_deg: f64) -> (f64, f64) {
        let radians = angle_deg.to_radians();
        (
            self.center + self.radius * radians.cos(),
            self.center + self.radius * radians.sin(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
    /// 1 when the slice covers more than half the pie.
    pub large_arc_flag: u8,
    pub path: String,
    pub color: String,
    /// Share of the total, rounded to one decimal.
    pub percentage: f64,
}

impl PieSlice {
    #[allow(dead_code)]
    pub fn span_deg(&self) -> f64 {
        self.end_angle_deg - self.start_angle_deg
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieGeometry {
    pub frame: PieFrame,
    pub slices: Vec<PieSlice>,
    pub total: f64,
}

/// Angle where the first slice starts (12 o'clock).
const PIE_START_DEG: f64 = -90.0;

/// Slices placed clockwise from 12 o'clock, each spanning its share of 360°.
///
/// A series without a positive total has no pie.
pub fn pie_geometry(series: &[SeriesEntry], frame: PieFrame) -> Geometry<PieGeometry> {
    let total = series_total(series);
    if series.is_empty() || total.is_nan() || total <= 0.0 {
        return Geometry::NoData;
    }

    let mut cumulative = 0.0;
    let slices = series
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let percentage = entry.value / total * 100.0;
            let start_angle_deg = PIE_START_DEG + cumulative * 3.6;
            let end_angle_deg = PIE_START_DEG + (cumulative + percentage) * 3.6;
            cumulative += percentage;

            let large_arc_flag = u8::from(percentage > 50.0);
            let path = slice_path(&frame, start_angle_deg, end_angle_deg, large_arc_flag);

            PieSlice {
                label: entry.label.clone(),
                value: entry.value,
                start_angle_deg,
                end_angle_deg,
                large_arc_flag,
                path,
                color: entry_color(entry, index, series.len()),
                percentage: round1(percentage),
            }
        })
        .collect();

    Geometry::Drawn(PieGeometry {
        frame,
        slices,
        total,
    })
}

fn slice_path(frame: &PieFrame, start_deg: f64, end_deg: f64, large_arc_flag: u8) -> String {
    let c = format_number(frame.center);
    let r = format_number(frame.radius);

    // An arc whose endpoints coincide draws nothing, so a full pie is two halves.
    if end_deg - start_deg >= 360.0 - 1e-9 {
        let top = format_number(frame.center - frame.radius);
        let bottom = format_number(frame.center + frame.radius);
        return format!(
            "M {c} {top} A {r} {r} 0 1 1 {c} {bottom} A {r} {r} 0 1 1 {c} {top} Z",
            c = c,
            r = r,
            top = top,
            bottom = bottom
        );
    }

    let (x1, y1) = frame.point_at(start_deg);
    let (x2, y2) = frame.point_at(end_deg);
    format!(
        "M {c} {c} L {} {} A {r} {r} 0 {} 1 {} {} Z",
        format_number(x1),
        format_number(y1),
        large_arc_flag,
        format_number(x2),
        format_number(y2),
        c = c,
        r = r
    )
}
