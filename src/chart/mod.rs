//! Chart geometry and SVG rendering.

pub mod geometry;
pub mod svg;

pub use geometry::*;
pub use svg::*;

use crate::models::Dashboard;

/// One rendered dashboard chart.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    /// File name the chart is written under.
    pub file_name: &'static str,
    pub title: &'static str,
    /// False when the SVG is the "no data" placeholder.
    pub has_data: bool,
    pub svg: String,
}

/// Render the four dashboard charts.
pub fn render_dashboard(dashboard: &Dashboard, frame: ChartFrame, pie: PieFrame) -> Vec<RenderedChart> {
    let segments = pie_geometry(&dashboard.by_segment, pie);
    let months = line_geometry(&dashboard.by_month, frame);
    let regions = bar_geometry(&dashboard.by_region, None);
    let brackets = pie_geometry(&dashboard.by_age_bracket, pie);

    vec![
        RenderedChart {
            file_name: "segments.svg",
            title: "Events by Cultural Segment",
            has_data: !segments.is_no_data(),
            svg: render_pie_chart(&segments),
        },
        RenderedChart {
            file_name: "participants_by_month.svg",
            title: "Participants by Month",
            has_data: !months.is_no_data(),
            svg: render_line_chart(&months, frame),
        },
        RenderedChart {
            file_name: "events_by_region.svg",
            title: "Events by Region",
            has_data: !regions.is_no_data(),
            svg: render_bar_chart(&regions, frame),
        },
        RenderedChart {
            file_name: "age_brackets.svg",
            title: "Audience by Age Bracket",
            has_data: !brackets.is_no_data(),
            svg: render_pie_chart(&brackets),
        },
    ]
}
