//! Report building and Markdown, JSON and HTML rendering.

use crate::analysis::{aggregate, group_regions, leading_entry, least_entry, top_places, ReportScope};
use crate::chart::{escape_xml, format_number, render_dashboard, ChartFrame, PieFrame};
use crate::models::{
    Dashboard, PlaceRanking, PlaceRecord, RegionSummary, Report, ReportMetadata, Series, Summary,
};
use anyhow::Result;
use chrono::Utc;

/// Rendering options shared by the report formats.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Include series tables (Markdown) and charts (HTML).
    pub include_charts: bool,
    pub frame: ChartFrame,
    pub pie: PieFrame,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_charts: true,
            frame: ChartFrame::default(),
            pie: PieFrame::default(),
        }
    }
}

/// Build a report over the places inside `scope`.
pub fn build_report(
    places: &[PlaceRecord],
    scope: &ReportScope,
    source: &str,
    generated_for: Option<String>,
    top_n: usize,
) -> Report {
    let scoped = scope.apply(places);

    Report {
        metadata: ReportMetadata {
            source: source.to_string(),
            generated_at: Utc::now(),
            generated_for,
            scope: scope.to_string(),
            places_considered: scoped.len(),
        },
        dashboard: aggregate(&scoped),
        top_places: top_places(&scoped, top_n),
        regions: group_regions(&scoped),
    }
}

/// Short findings derived from the dashboard series.
pub fn insights(dashboard: &Dashboard) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some((entry, pct)) = leading_entry(&dashboard.by_segment) {
        lines.push(format!(
            "{} is the leading segment with {} events ({}% of all events).",
            entry.label,
            format_number(entry.value),
            pct
        ));
    }

    if let Some((entry, _)) = leading_entry(&dashboard.by_month) {
        lines.push(format!(
            "{} was the busiest month with {} participants.",
            entry.label,
            format_number(entry.value)
        ));
    }

    if let Some((entry, pct)) = leading_entry(&dashboard.by_age_bracket) {
        lines.push(format!(
            "{} is the largest audience ({}% of participants).",
            entry.label, pct
        ));
    }

    if dashboard.by_region.len() > 1 {
        if let Some(entry) = least_entry(&dashboard.by_region) {
            lines.push(format!(
                "{} has the fewest events ({}).",
                entry.label,
                format_number(entry.value)
            ));
        }
    }

    lines
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# CultureMap Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.dashboard.summary));
    output.push_str(&generate_insights_section(&report.dashboard));

    if options.include_charts {
        let dashboard = &report.dashboard;
        output.push_str("## Series\n\n");
        output.push_str(&generate_series_table("Events by Segment", &dashboard.by_segment));
        output.push_str(&generate_series_table("Participants by Month", &dashboard.by_month));
        output.push_str(&generate_series_table("Events by Region", &dashboard.by_region));
        output.push_str(&generate_series_table(
            "Participants by Age Bracket",
            &dashboard.by_age_bracket,
        ));
    }

    output.push_str(&generate_top_places_section(&report.top_places));
    output.push_str(&generate_regions_section(&report.regions));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ref user) = metadata.generated_for {
        section.push_str(&format!("- **Generated For:** {}\n", user));
    }
    section.push_str(&format!("- **Scope:** {}\n", metadata.scope));
    section.push_str(&format!(
        "- **Places Considered:** {}\n",
        metadata.places_considered
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Events | Participants | Regions | Mean Rating | Participants/Event |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        summary.total_events,
        summary.total_participants,
        summary.total_regions,
        summary.mean_rating_display(),
        summary
            .mean_participants_per_event()
            .map_or_else(|| "N/A".to_string(), |m| format!("{:.1}", m))
    ));

    section
}

fn generate_insights_section(dashboard: &Dashboard) -> String {
    let lines = insights(dashboard);
    if lines.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Insights\n\n");
    for line in lines {
        section.push_str(&format!("- {}\n", line));
    }
    section.push('\n');

    section
}

fn generate_series_table(title: &str, series: &Series) -> String {
    let mut table = String::new();

    table.push_str(&format!("### {}\n\n", title));
    if series.is_empty() {
        table.push_str("_No data available._\n\n");
        return table;
    }

    table.push_str("| Label | Value |\n|:---|---:|\n");
    for entry in series {
        table.push_str(&format!("| {} | {} |\n", entry.label, format_number(entry.value)));
    }
    table.push('\n');

    table
}

fn generate_top_places_section(places: &[PlaceRanking]) -> String {
    if places.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Places by Attendance\n\n");
    section.push_str("| # | Place | Kind | Region | Events | Participants | Rating |\n");
    section.push_str("|---:|:---|:---|:---|---:|---:|---:|\n");
    for (i, place) in places.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:.1} |\n",
            i + 1,
            place.name,
            place.kind,
            place.region,
            place.events,
            place.participants,
            place.rating
        ));
    }
    section.push('\n');

    section
}

fn generate_regions_section(regions: &[RegionSummary]) -> String {
    if regions.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Regions\n\n");
    section.push_str("| Region | Kind | State | Population | Events |\n");
    section.push_str("|:---|:---|:---:|---:|---:|\n");
    for region in regions {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            region.name, region.kind, region.state, region.population, region.total_events
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by CultureMap v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

const HTML_STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2em auto;color:#1f2937}\
table{border-collapse:collapse;width:100%;margin-bottom:1.5em}\
th,td{border:1px solid #e5e7eb;padding:4px 8px;text-align:left}\
.cards{display:flex;gap:1em;margin-bottom:1.5em}\
.card{flex:1;border:1px solid #e5e7eb;border-radius:6px;padding:0.75em}\
.card strong{display:block;font-size:1.5em}\
figure{margin:0 0 1.5em 0}\
@media print{.chart{page-break-inside:avoid}}";

/// Generate a printable HTML report with embedded SVG charts.
pub fn generate_html_report(report: &Report, options: &ReportOptions) -> String {
    let summary = &report.dashboard.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>CultureMap Report</title>\n");
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", HTML_STYLE));
    html.push_str("<h1>CultureMap Report</h1>\n");

    let metadata = &report.metadata;
    html.push_str(&format!(
        "<p>Source: {}<br>Generated: {}<br>Scope: {}",
        escape_xml(&metadata.source),
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        escape_xml(&metadata.scope)
    ));
    if let Some(ref user) = metadata.generated_for {
        html.push_str(&format!("<br>Generated for: {}", escape_xml(user)));
    }
    html.push_str("</p>\n");

    html.push_str("<div class=\"cards\">\n");
    for (label, value) in [
        ("Events", summary.total_events.to_string()),
        ("Participants", summary.total_participants.to_string()),
        ("Regions", summary.total_regions.to_string()),
        ("Mean rating", summary.mean_rating_display()),
    ] {
        html.push_str(&format!(
            "<div class=\"card\">{}<strong>{}</strong></div>\n",
            label, value
        ));
    }
    html.push_str("</div>\n");

    let lines = insights(&report.dashboard);
    if !lines.is_empty() {
        html.push_str("<h2>Insights</h2>\n<ul>\n");
        for line in lines {
            html.push_str(&format!("<li>{}</li>\n", escape_xml(&line)));
        }
        html.push_str("</ul>\n");
    }

    if options.include_charts {
        for chart in render_dashboard(&report.dashboard, options.frame, options.pie) {
            html.push_str(&format!(
                "<figure class=\"chart\">\n<figcaption>{}</figcaption>\n{}</figure>\n",
                chart.title, chart.svg
            ));
        }
    }

    if !report.top_places.is_empty() {
        html.push_str("<h2>Top Places by Attendance</h2>\n<table>\n");
        html.push_str("<tr><th>Place</th><th>Kind</th><th>Region</th><th>Events</th><th>Participants</th><th>Rating</th></tr>\n");
        for place in &report.top_places {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td></tr>\n",
                escape_xml(&place.name),
                escape_xml(&place.kind),
                escape_xml(&place.region),
                place.events,
                place.participants,
                place.rating
            ));
        }
        html.push_str("</table>\n");
    }

    if !report.regions.is_empty() {
        html.push_str("<h2>Regions</h2>\n<table>\n");
        html.push_str("<tr><th>Region</th><th>Kind</th><th>State</th><th>Population</th><th>Events</th></tr>\n");
        for region in &report.regions {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_xml(&region.name),
                region.kind,
                escape_xml(&region.state),
                region.population,
                region.total_events
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EventWindow;
    use crate::models::{Address, EventRecord, Participants};
    use chrono::NaiveDate;

    fn create_place(name: &str, region: &str, segment: &str, date: &str, n: u64) -> PlaceRecord {
        PlaceRecord {
            name: name.to_string(),
            kind: "Museu".to_string(),
            address: Address {
                neighborhood: "Centro".to_string(),
                city: name.to_string(),
                state: "MG".to_string(),
                region: Some(region.to_string()),
                ..Default::default()
            },
            rating: 8.0,
            events: vec![EventRecord {
                segment: Some(segment.to_string()),
                date: date.to_string(),
                participants: Participants::new(0, 0, n, 0),
            }],
            ..Default::default()
        }
    }

    fn create_test_report() -> Report {
        let places = vec![
            create_place("Museu & Arte", "Sudeste", "Música", "05/02/2024", 30),
            create_place("Casa da Cultura", "Sul", "Teatro", "20/03/2024", 15),
            create_place("Museu da Inconfidência", "Sudeste", "Música", "11/03/2024", 20),
        ];
        build_report(
            &places,
            &ReportScope::default(),
            "locais.json",
            Some("Ana".to_string()),
            2,
        )
    }

    #[test]
    fn test_build_report() {
        let report = create_test_report();

        assert_eq!(report.metadata.places_considered, 3);
        assert_eq!(report.dashboard.summary.total_participants, 65);
        assert_eq!(report.top_places.len(), 2);
        assert_eq!(report.top_places[0].name, "Museu & Arte");
        assert_eq!(report.regions.len(), 3);
    }

    #[test]
    fn test_build_report_with_scope() {
        let places = vec![
            create_place("A", "Sudeste", "Música", "05/02/2024", 30),
            create_place("B", "Sul", "Teatro", "20/03/2024", 10),
        ];
        let scope = ReportScope {
            region: Some("sudeste".to_string()),
            segment: None,
            window: EventWindow {
                from: NaiveDate::from_ymd_opt(2024, 3, 1),
                to: None,
            },
        };

        let report = build_report(&places, &scope, "x", None, 10);
        assert_eq!(report.metadata.places_considered, 1);
        assert_eq!(report.dashboard.summary.total_events, 0);
        assert_eq!(report.metadata.scope, "sudeste, all segments, 2024-03-01 to end");
    }

    #[test]
    fn test_insights() {
        let report = create_test_report();
        let lines = insights(&report.dashboard);

        assert_eq!(
            lines[0],
            "Música is the leading segment with 2 events (66.7% of all events)."
        );
        assert!(lines.iter().any(|l| l.starts_with("2024-03 was the busiest month")));
        assert!(lines.iter().any(|l| l.starts_with("Adulto (31-50) is the largest audience (100%")));
        assert!(lines.iter().any(|l| l == "Sul has the fewest events (1)."));
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportOptions::default());

        assert!(markdown.contains("# CultureMap Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("- **Generated For:** Ana"));
        assert!(markdown.contains("| 3 | 65 | 2 | 8.0 | 21.7 |"));
        assert!(markdown.contains("### Participants by Month"));
        assert!(markdown.contains("| 2024-02 | 30 |"));
        assert!(markdown.contains("## Top Places by Attendance"));
        assert!(markdown.contains("## Regions"));
    }

    #[test]
    fn test_markdown_without_charts() {
        let report = create_test_report();
        let options = ReportOptions {
            include_charts: false,
            ..Default::default()
        };
        let markdown = generate_markdown_report(&report, &options);
        assert!(!markdown.contains("## Series"));
    }

    #[test]
    fn test_empty_report() {
        let report = build_report(&[], &ReportScope::default(), "empty.json", None, 10);
        let markdown = generate_markdown_report(&report, &ReportOptions::default());

        assert!(markdown.contains("| 0 | 0 | 0 | N/A | N/A |"));
        assert!(markdown.contains("_No data available._"));
        assert!(!markdown.contains("## Insights"));
        assert!(!markdown.contains("## Top Places"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["generated_for"], "Ana");
        assert_eq!(value["dashboard"]["summary"]["total_events"], 3);
        assert_eq!(value["top_places"][0]["participants"], 30);
    }

    #[test]
    fn test_generate_html_report() {
        let report = create_test_report();
        let html = generate_html_report(&report, &ReportOptions::default());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("<svg").count(), 4);
        assert!(html.contains("Museu &amp; Arte"));
        assert!(html.trim_end().ends_with("</html>"));

        let options = ReportOptions {
            include_charts: false,
            ..Default::default()
        };
        assert!(!generate_html_report(&report, &options).contains("<svg"));
    }
}
