//! CSV export of dashboard series.

use crate::chart::format_number;
use crate::models::{Report, Series, SeriesEntry};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn write_series_rows<W: Write>(
    name: &str,
    series: &[SeriesEntry],
    writer: &mut csv::Writer<W>,
) -> Result<()> {
    for entry in series {
        writer.write_record([name, entry.label.as_str(), format_number(entry.value).as_str()])?;
    }
    Ok(())
}

/// Write every report series as `series,label,value` rows.
pub fn write_report_csv<W: Write>(report: &Report, writer: &mut csv::Writer<W>) -> Result<()> {
    let summary = &report.dashboard.summary;
    let dashboard = &report.dashboard;

    writer.write_record(["series", "label", "value"])?;

    let mut summary_rows: Series = vec![
        SeriesEntry::new("total_events", summary.total_events as f64),
        SeriesEntry::new("total_participants", summary.total_participants as f64),
        SeriesEntry::new("total_regions", summary.total_regions as f64),
    ];
    if let Some(rating) = summary.mean_rating {
        summary_rows.push(SeriesEntry::new("mean_rating", rating));
    }

    write_series_rows("summary", &summary_rows, writer)?;
    write_series_rows("segment", &dashboard.by_segment, writer)?;
    write_series_rows("month", &dashboard.by_month, writer)?;
    write_series_rows("region", &dashboard.by_region, writer)?;
    write_series_rows("age_bracket", &dashboard.by_age_bracket, writer)?;

    writer.flush()?;
    Ok(())
}

/// Generate a CSV report as a string.
pub fn generate_csv_report(report: &Report) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_report_csv(report, &mut writer)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Write a single series as `label,value` rows.
pub fn export_series_csv(series: &[SeriesEntry], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["label", "value"])?;
    for entry in series {
        writer.write_record([entry.label.as_str(), format_number(entry.value).as_str()])?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ReportScope;
    use crate::models::{EventRecord, Participants, PlaceRecord};
    use crate::report::build_report;
    use tempfile::TempDir;

    fn sample_report() -> Report {
        let places = vec![PlaceRecord {
            name: "Centro Cultural Banco do Brasil".to_string(),
            kind: "Centro Cultural".to_string(),
            rating: 9.0,
            events: vec![
                EventRecord {
                    segment: Some("Artes Visuais".to_string()),
                    date: "03/08/2024".to_string(),
                    participants: Participants::new(2, 3, 0, 0),
                },
                EventRecord {
                    segment: Some("Cinema, Vídeo".to_string()),
                    date: "15/08/2024".to_string(),
                    participants: Participants::new(0, 0, 4, 0),
                },
            ],
            ..Default::default()
        }];
        build_report(&places, &ReportScope::default(), "test", None, 5)
    }

    #[test]
    fn test_generate_csv_report() {
        let csv = generate_csv_report(&sample_report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "series,label,value");
        assert!(lines.contains(&"summary,total_participants,9"));
        assert!(lines.contains(&"summary,mean_rating,9"));
        assert!(lines.contains(&"segment,Artes Visuais,1"));
        // labels with commas are quoted
        assert!(lines.contains(&"segment,\"Cinema, Vídeo\",1"));
        assert!(lines.contains(&"month,2024-08,9"));
        assert!(lines.contains(&"age_bracket,Idoso (51+),0"));
    }

    #[test]
    fn test_export_series_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("segments.csv");
        let series = vec![SeriesEntry::new("Música", 3.0), SeriesEntry::new("Teatro", 1.5)];

        export_series_csv(&series, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "label,value\nMúsica,3\nTeatro,1.5\n");
    }
}
