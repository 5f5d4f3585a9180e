//! SVG rendering of chart geometry.
//!
//! Each renderer takes the output of [`crate::chart::geometry`] and returns
//! a standalone SVG document. `NoData` renders a placeholder message.

use crate::chart::geometry::{
    format_number, BarGeometry, ChartFrame, Geometry, LineGeometry, PieGeometry,
};

const AXIS_COLOR: &str = "#6b7280";
const LINE_COLOR: &str = "#2563eb";
const NO_DATA_TEXT: &str = "No data available";

/// Escape text for use inside SVG elements and attributes.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn open_svg(width: f64, height: f64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\" width=\"{}\" height=\"{}\">\n",
        format_number(width),
        format_number(height),
        format_number(width),
        format_number(height)
    )
}

/// Placeholder shown instead of a chart when there is nothing to draw.
pub fn no_data_svg(width: f64, height: f64) -> String {
    let mut svg = open_svg(width, height);
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"14\" fill=\"{}\">{}</text>\n",
        format_number(width / 2.0),
        format_number(height / 2.0),
        AXIS_COLOR,
        NO_DATA_TEXT
    ));
    svg.push_str("</svg>\n");
    svg
}

fn axes(frame: &ChartFrame) -> String {
    let left = format_number(frame.padding);
    let top = format_number(frame.padding);
    let right = format_number(frame.width - frame.padding);
    let bottom = format_number(frame.height - frame.padding);

    let mut out = String::new();
    out.push_str(&format!(
        "  <line x1=\"{left}\" y1=\"{top}\" x2=\"{left}\" y2=\"{bottom}\" stroke=\"{AXIS_COLOR}\" stroke-width=\"1\"/>\n"
    ));
    out.push_str(&format!(
        "  <line x1=\"{left}\" y1=\"{bottom}\" x2=\"{right}\" y2=\"{bottom}\" stroke=\"{AXIS_COLOR}\" stroke-width=\"1\"/>\n"
    ));
    out
}

/// Render a bar chart into `frame`.
pub fn render_bar_chart(geometry: &Geometry<BarGeometry>, frame: ChartFrame) -> String {
    let bars = match geometry {
        Geometry::NoData => return no_data_svg(frame.width, frame.height),
        Geometry::Drawn(shapes) => &shapes.bars,
    };

    let mut svg = open_svg(frame.width, frame.height);
    svg.push_str(&axes(&frame));

    let slot = frame.inner_width() / bars.len() as f64;
    let bar_width = slot * 0.7;
    let baseline = frame.height - frame.padding;

    for (index, bar) in bars.iter().enumerate() {
        let height = bar.height_fraction.max(0.0) * frame.inner_height();
        let x = frame.padding + index as f64 * slot + (slot - bar_width) / 2.0;
        let y = baseline - height;
        let center = x + bar_width / 2.0;
        let label = escape_xml(&bar.label);

        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"><title>{}: {}</title></rect>\n",
            format_number(x),
            format_number(y),
            format_number(bar_width),
            format_number(height),
            escape_xml(&bar.color),
            label,
            bar.value
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\">{}</text>\n",
            format_number(center),
            format_number(y - 4.0),
            bar.value
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"{}\">{}</text>\n",
            format_number(center),
            format_number(baseline + 20.0),
            AXIS_COLOR,
            label
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render a line chart. The frame comes from the geometry itself.
pub fn render_line_chart(geometry: &Geometry<LineGeometry>, frame: ChartFrame) -> String {
    let line = match geometry {
        Geometry::NoData => return no_data_svg(frame.width, frame.height),
        Geometry::Drawn(shapes) => shapes,
    };
    let frame = line.frame;

    let mut svg = open_svg(frame.width, frame.height);
    svg.push_str(&axes(&frame));

    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
        line.path, LINE_COLOR
    ));

    for point in &line.points {
        svg.push_str(&format!(
            "  <circle cx=\"{}\" cy=\"{}\" r=\"4\" fill=\"{}\" stroke=\"white\" stroke-width=\"2\"><title>{}: {}</title></circle>\n",
            format_number(point.x),
            format_number(point.y),
            LINE_COLOR,
            escape_xml(&point.label),
            point.value
        ));
    }

    for tick in &line.y_ticks {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"12\" fill=\"{}\">{}</text>\n",
            format_number(frame.padding - 10.0),
            format_number(tick.y + 4.0),
            AXIS_COLOR,
            tick.value
        ));
    }

    for point in &line.points {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"{}\">{}</text>\n",
            format_number(point.x),
            format_number(frame.height - frame.padding + 20.0),
            AXIS_COLOR,
            escape_xml(&point.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render a pie chart with its legend to the right of the circle.
pub fn render_pie_chart(geometry: &Geometry<PieGeometry>) -> String {
    let pie = match geometry {
        Geometry::NoData => return no_data_svg(200.0, 100.0),
        Geometry::Drawn(shapes) => shapes,
    };

    let diameter = pie.frame.center * 2.0;
    let legend_x = diameter + 5.0;
    let height = diameter.max(8.0 * pie.slices.len() as f64 + 10.0);
    let mut svg = open_svg(diameter * 2.0, height);

    for slice in &pie.slices {
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"{}\" stroke=\"white\" stroke-width=\"0.5\"><title>{}: {} ({}%)</title></path>\n",
            slice.path,
            escape_xml(&slice.color),
            escape_xml(&slice.label),
            slice.value,
            slice.percentage
        ));
    }

    for (index, slice) in pie.slices.iter().enumerate() {
        let y = 10.0 + index as f64 * 8.0;
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"4\" height=\"4\" fill=\"{}\"/>\n",
            format_number(legend_x),
            format_number(y - 3.5),
            escape_xml(&slice.color)
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"4\">{} {} ({}%)</text>\n",
            format_number(legend_x + 6.0),
            format_number(y),
            escape_xml(&slice.label),
            slice.value,
            slice.percentage
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::geometry::{bar_geometry, line_geometry, pie_geometry, PieFrame};
    use crate::models::SeriesEntry;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Arte & <Cultura>"), "Arte &amp; &lt;Cultura&gt;");
        assert_eq!(escape_xml("Música"), "Música");
    }

    #[test]
    fn test_no_data_placeholder() {
        let svg = render_bar_chart(&Geometry::NoData, ChartFrame::default());
        assert!(svg.contains(NO_DATA_TEXT));
        assert!(!svg.contains("<rect"));

        let svg = render_pie_chart(&Geometry::NoData);
        assert!(svg.contains(NO_DATA_TEXT));
    }

    #[test]
    fn test_render_bars() {
        let series = vec![SeriesEntry::new("Centro", 2.0), SeriesEntry::new("Sul", 0.0)];
        let svg = render_bar_chart(&bar_geometry(&series, None), ChartFrame::default());

        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("Centro: 2"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_line() {
        let series = vec![
            SeriesEntry::new("2024-01", 5.0),
            SeriesEntry::new("2024-02", 9.0),
        ];
        let geometry = line_geometry(&series, ChartFrame::default());
        let svg = render_line_chart(&geometry, ChartFrame::default());

        assert!(svg.contains("d=\"M 60 290 L 540 60\""));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(">2024-02</text>"));
    }

    #[test]
    fn test_render_pie_with_legend() {
        let series = vec![
            SeriesEntry::new("A & B", 3.0).with_color("#ff0000"),
            SeriesEntry::new("C", 1.0),
        ];
        let svg = render_pie_chart(&pie_geometry(&series, PieFrame::default()));

        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("A &amp; B 3 (75%)"));
        assert!(svg.contains("fill=\"#ff0000\""));
    }
}
