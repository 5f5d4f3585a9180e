//! Dataset aggregation and statistics.
//!
//! This module turns the flat list of places into the summary figures and
//! the labeled series the dashboard charts consume.

use crate::models::{
    label_color, round1, series_total, AgeBracket, Dashboard, MonthKey, PlaceRecord,
    PlaceRanking, SeriesEntry, Summary,
};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tracing::{debug, warn};

/// Running totals keyed by label, remembering first-appearance order.
#[derive(Debug)]
struct Tally<K> {
    order: Vec<K>,
    totals: HashMap<K, u64>,
}

impl<K: Eq + Hash + Clone> Tally<K> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            totals: HashMap::new(),
        }
    }

    fn add(&mut self, key: K, amount: u64) {
        match self.totals.get_mut(&key) {
            Some(total) => *total = total.saturating_add(amount),
            None => {
                self.order.push(key.clone());
                self.totals.insert(key, amount);
            }
        }
    }

    fn into_entries(mut self) -> Vec<(K, u64)> {
        self.order
            .into_iter()
            .map(|key| {
                let total = self.totals.remove(&key).unwrap_or_default();
                (key, total)
            })
            .collect()
    }
}

/// Aggregate a list of places into dashboard statistics and series.
///
/// Events with an unparseable date are left out of the month series only;
/// they still count everywhere else. An empty input yields a summary with
/// no mean rating and four empty series.
pub fn aggregate(places: &[PlaceRecord]) -> Dashboard {
    let mut total_events: u64 = 0;
    let mut total_participants: u64 = 0;
    let mut rating_sum = 0.0;

    let mut segments: Tally<String> = Tally::new();
    let mut months: Tally<MonthKey> = Tally::new();
    let mut regions: Tally<String> = Tally::new();
    let mut brackets = [0u64; 4];
    let mut distinct_regions: HashSet<&str> = HashSet::new();

    for place in places {
        rating_sum += place.rating;
        let region = place.address.region_name();
        distinct_regions.insert(region);

        for event in &place.events {
            total_events += 1;
            segments.add(event.segment_label().to_string(), 1);

            let event_total = event.participants.total();
            match event.parsed_date() {
                Ok(date) => months.add(MonthKey::from(date), event_total),
                Err(e) => warn!("Skipping event of '{}' in month series: {}", place.name, e),
            }

            total_participants = total_participants.saturating_add(event_total);

            for (slot, bracket) in brackets.iter_mut().zip(AgeBracket::ALL) {
                *slot = slot.saturating_add(event.participants.get(bracket));
            }

            regions.add(region.to_string(), 1);
        }
    }

    let mean_rating = if places.is_empty() {
        None
    } else {
        Some(round1(rating_sum / places.len() as f64))
    };

    let summary = Summary {
        total_events,
        total_participants,
        total_regions: distinct_regions.len(),
        mean_rating,
    };

    debug!(
        "Aggregated {} places: {} events, {} participants",
        places.len(),
        total_events,
        total_participants
    );

    let by_segment = segments
        .into_entries()
        .into_iter()
        .map(|(label, count)| {
            let color = label_color(&label);
            SeriesEntry::new(label, count as f64).with_color(color)
        })
        .collect();

    let mut month_entries = months.into_entries();
    month_entries.sort_by_key(|(month, _)| *month);
    let by_month = month_entries
        .into_iter()
        .map(|(month, total)| SeriesEntry::new(month.to_string(), total as f64))
        .collect();

    let by_region = regions
        .into_entries()
        .into_iter()
        .map(|(label, count)| SeriesEntry::new(label, count as f64))
        .collect();

    let by_age_bracket = if places.is_empty() {
        Vec::new()
    } else {
        AgeBracket::ALL
            .iter()
            .zip(brackets)
            .map(|(bracket, total)| {
                SeriesEntry::new(bracket.label(), total as f64).with_color(bracket.color())
            })
            .collect()
    };

    Dashboard {
        summary,
        by_segment,
        by_month,
        by_region,
        by_age_bracket,
    }
}

/// Rank places by total participants (highest first), keeping the top `n`.
pub fn top_places(places: &[PlaceRecord], n: usize) -> Vec<PlaceRanking> {
    let mut ranked: Vec<PlaceRanking> = places
        .iter()
        .map(|p| PlaceRanking {
            name: p.name.clone(),
            kind: p.kind.clone(),
            region: p.address.region_name().to_string(),
            events: p.events.len(),
            participants: p.total_participants(),
            rating: p.rating,
        })
        .collect();

    ranked.sort_by_key(|r| std::cmp::Reverse(r.participants));
    ranked.truncate(n);
    ranked
}

/// The largest entry of a series and its share of the total, in percent.
pub fn leading_entry(series: &[SeriesEntry]) -> Option<(&SeriesEntry, f64)> {
    let total = series_total(series);
    if total <= 0.0 {
        return None;
    }

    series
        .iter()
        .max_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
        .map(|entry| (entry, round1(entry.value / total * 100.0)))
}

/// The smallest entry of a series.
pub fn least_entry(series: &[SeriesEntry]) -> Option<&SeriesEntry> {
    series
        .iter()
        .min_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, EventRecord, Participants, FALLBACK_COLOR};

    fn create_event(segment: &str, date: &str, participants: Participants) -> EventRecord {
        EventRecord {
            segment: Some(segment.to_string()),
            date: date.to_string(),
            participants,
        }
    }

    fn create_place(name: &str, region: &str, rating: f64, events: Vec<EventRecord>) -> PlaceRecord {
        PlaceRecord {
            name: name.to_string(),
            kind: "Teatro".to_string(),
            address: Address {
                region: Some(region.to_string()),
                city: "São Paulo".to_string(),
                ..Default::default()
            },
            rating,
            events,
            ..Default::default()
        }
    }

    fn sample_places() -> Vec<PlaceRecord> {
        vec![
            create_place(
                "Casa A",
                "Centro",
                8.0,
                vec![
                    create_event("Música", "10/01/2024", Participants::new(1, 2, 3, 4)),
                    create_event("Dança", "05/12/2023", Participants::new(0, 5, 0, 0)),
                ],
            ),
            create_place(
                "Casa B",
                "Norte",
                6.5,
                vec![
                    create_event("Música", "20/02/2024", Participants::new(3, 0, 0, 1)),
                    create_event("Teatro", "not a date", Participants::new(0, 0, 7, 0)),
                    create_event("Capoeira", "01/11/2023", Participants::new(2, 2, 2, 2)),
                ],
            ),
            create_place("Casa C", "Norte", 9.0, vec![]),
        ]
    }

    #[test]
    fn test_reference_scenario() {
        let places = vec![create_place(
            "Centro Cultural",
            "Centro",
            8.0,
            vec![
                create_event("Música", "01/03/2024", Participants::new(0, 5, 10, 0)),
                create_event("Teatro", "15/03/2024", Participants::new(3, 0, 0, 0)),
            ],
        )];

        let dashboard = aggregate(&places);

        assert_eq!(dashboard.summary.total_events, 2);
        assert_eq!(dashboard.summary.total_participants, 18);
        assert_eq!(dashboard.summary.total_regions, 1);
        assert_eq!(dashboard.summary.mean_rating, Some(8.0));

        let segments: Vec<_> = dashboard
            .by_segment
            .iter()
            .map(|e| (e.label.as_str(), e.value))
            .collect();
        assert_eq!(segments, vec![("Música", 1.0), ("Teatro", 1.0)]);

        assert_eq!(dashboard.by_month.len(), 1);
        assert_eq!(dashboard.by_month[0].label, "2024-03");
        assert_eq!(dashboard.by_month[0].value, 18.0);

        let ages: Vec<_> = dashboard
            .by_age_bracket
            .iter()
            .map(|e| (e.label.as_str(), e.value))
            .collect();
        assert_eq!(
            ages,
            vec![
                ("Infantil (0-17)", 3.0),
                ("Jovem (18-30)", 5.0),
                ("Adulto (31-50)", 10.0),
                ("Idoso (51+)", 0.0),
            ]
        );
    }

    #[test]
    fn test_empty_input_is_no_data() {
        let dashboard = aggregate(&[]);

        assert_eq!(dashboard.summary.mean_rating, None);
        assert_eq!(dashboard.summary.total_events, 0);
        assert_eq!(dashboard.summary.total_regions, 0);
        assert!(dashboard.by_segment.is_empty());
        assert!(dashboard.by_month.is_empty());
        assert!(dashboard.by_region.is_empty());
        assert!(dashboard.by_age_bracket.is_empty());
    }

    #[test]
    fn test_groupings_count_every_event_once() {
        let dashboard = aggregate(&sample_places());
        let total = dashboard.summary.total_events as f64;

        assert_eq!(total, 5.0);
        assert_eq!(series_total(&dashboard.by_region), total);
        assert_eq!(series_total(&dashboard.by_segment), total);
        assert_eq!(
            series_total(&dashboard.by_age_bracket),
            dashboard.summary.total_participants as f64
        );
    }

    #[test]
    fn test_unparseable_date_only_skips_month_series() {
        let dashboard = aggregate(&sample_places());

        // 7 participants of the undated event are missing from the months only
        assert_eq!(dashboard.summary.total_participants, 34);
        assert_eq!(series_total(&dashboard.by_month), 27.0);
        let theatre = dashboard.by_segment.iter().find(|e| e.label == "Teatro");
        assert_eq!(theatre.map(|e| e.value), Some(1.0));
    }

    #[test]
    fn test_malformed_event_date_keeps_sibling_event() {
        let json = r#"[{
            "local": "Centro Cultural",
            "eventos": [
                {"data": "01/03/2024", "participantes": {"Adulto": 10}},
                {"data": null, "participantes": {"Jovem": 5}}
            ]
        }]"#;
        let places: Vec<PlaceRecord> = serde_json::from_str(json).unwrap();

        let dashboard = aggregate(&places);
        assert_eq!(dashboard.summary.total_events, 2);
        assert_eq!(dashboard.summary.total_participants, 15);
        assert_eq!(dashboard.by_month, vec![SeriesEntry::new("2024-03", 10.0)]);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let places = vec![create_place(
            "Lotado",
            "Centro",
            5.0,
            vec![
                create_event("Música", "01/03/2024", Participants::new(0, 0, u64::MAX, 0)),
                create_event("Música", "02/03/2024", Participants::new(0, 0, u64::MAX, 0)),
            ],
        )];

        let dashboard = aggregate(&places);
        assert_eq!(dashboard.summary.total_participants, u64::MAX);
        assert_eq!(dashboard.by_month, vec![SeriesEntry::new("2024-03", u64::MAX as f64)]);
        assert_eq!(dashboard.by_age_bracket[2].value, u64::MAX as f64);
    }

    #[test]
    fn test_month_series_is_chronological() {
        let dashboard = aggregate(&sample_places());
        let labels: Vec<_> = dashboard.by_month.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_age_series_always_has_four_brackets() {
        let places = vec![create_place("Vazio", "Sul", 5.0, vec![])];
        let dashboard = aggregate(&places);

        assert_eq!(dashboard.by_age_bracket.len(), 4);
        assert!(dashboard.by_age_bracket.iter().all(|e| e.value == 0.0));
        assert_eq!(dashboard.by_age_bracket[0].color.as_deref(), Some("#8B008B"));
    }

    #[test]
    fn test_regions_and_colors() {
        let dashboard = aggregate(&sample_places());

        assert_eq!(dashboard.summary.total_regions, 2);
        let regions: Vec<_> = dashboard
            .by_region
            .iter()
            .map(|e| (e.label.as_str(), e.value))
            .collect();
        assert_eq!(regions, vec![("Centro", 2.0), ("Norte", 3.0)]);

        let capoeira = dashboard
            .by_segment
            .iter()
            .find(|e| e.label == "Capoeira")
            .unwrap();
        assert_eq!(capoeira.color.as_deref(), Some(FALLBACK_COLOR));
        assert!(dashboard.by_region.iter().all(|e| e.color.is_none()));
    }

    #[test]
    fn test_mean_rating_rounding() {
        let dashboard = aggregate(&sample_places());
        // (8.0 + 6.5 + 9.0) / 3 = 7.833...
        assert_eq!(dashboard.summary.mean_rating, Some(7.8));
    }

    #[test]
    fn test_missing_segment_defaults_to_outros() {
        let mut event = create_event("", "01/01/2024", Participants::new(0, 0, 1, 0));
        event.segment = None;
        let dashboard = aggregate(&[create_place("X", "Centro", 7.0, vec![event])]);

        assert_eq!(dashboard.by_segment[0].label, "Outros");
        assert_eq!(dashboard.by_segment[0].color.as_deref(), Some("#84cc16"));
    }

    #[test]
    fn test_top_places() {
        let top = top_places(&sample_places(), 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Casa B");
        assert_eq!(top[0].participants, 19);
        assert_eq!(top[1].name, "Casa A");
    }

    #[test]
    fn test_leading_and_least_entries() {
        let series = vec![
            SeriesEntry::new("Música", 3.0),
            SeriesEntry::new("Teatro", 1.0),
        ];

        let (leader, share) = leading_entry(&series).unwrap();
        assert_eq!(leader.label, "Música");
        assert_eq!(share, 75.0);
        assert_eq!(least_entry(&series).map(|e| e.label.as_str()), Some("Teatro"));

        assert!(leading_entry(&[]).is_none());
        assert!(leading_entry(&[SeriesEntry::new("A", 0.0)]).is_none());
    }
}
