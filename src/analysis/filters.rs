//! Place filtering for the map explorer and report scoping.

use crate::models::{marker_color_for, marker_icon_for, MapMarker, PlaceRecord};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

/// Criteria from the map explorer. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    pub kind: Option<String>,
    pub segment: Option<String>,
    pub min_rating: Option<f64>,
    pub min_participants: Option<u64>,
}

impl PlaceFilter {
    /// Whether any criterion is set.
    pub fn is_active(&self) -> bool {
        self.kind.is_some()
            || self.segment.is_some()
            || self.min_rating.is_some()
            || self.min_participants.is_some()
    }

    pub fn matches(&self, place: &PlaceRecord) -> bool {
        if let Some(ref kind) = self.kind {
            if &place.kind != kind {
                return false;
            }
        }

        if let Some(ref segment) = self.segment {
            if !place.segments.iter().any(|s| s == segment) {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating {
            if place.rating < min_rating {
                return false;
            }
        }

        if let Some(min_participants) = self.min_participants {
            if place.total_participants() < min_participants {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, places: &'a [PlaceRecord]) -> Vec<&'a PlaceRecord> {
        places.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct venue kinds, in first-appearance order.
pub fn available_kinds(places: &[PlaceRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    places
        .iter()
        .filter(|p| seen.insert(p.kind.as_str()))
        .map(|p| p.kind.clone())
        .collect()
}

/// Distinct cultural segments across all places, in first-appearance order.
pub fn available_segments(places: &[PlaceRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    places
        .iter()
        .flat_map(|p| p.segments.iter())
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Project places into map markers. Ids are 1-based positions in `places`.
pub fn map_markers(places: &[PlaceRecord]) -> Vec<MapMarker> {
    places
        .iter()
        .enumerate()
        .map(|(index, place)| MapMarker {
            id: index + 1,
            name: place.name.clone(),
            kind: place.kind.clone(),
            latitude: place.address.latitude,
            longitude: place.address.longitude,
            total_events: place.events.len(),
            participants: place.total_participants(),
            segments: place.segments.clone(),
            rating: place.rating,
            address: place.address.one_line(),
            color: marker_color_for(&place.kind).to_string(),
            icon: marker_icon_for(&place.kind).to_string(),
        })
        .collect()
}

/// Inclusive date range applied to events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl EventWindow {
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Unicode-aware case-insensitive comparison.
fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Region, segment and period restrictions for a report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportScope {
    pub region: Option<String>,
    pub segment: Option<String>,
    pub window: EventWindow,
}

impl ReportScope {
    /// Restrict the dataset to this scope.
    ///
    /// Places outside the region are dropped entirely. Within kept places,
    /// only events of the segment and inside the window remain; once a
    /// window is set, events with unparseable dates are dropped as well.
    pub fn apply(&self, places: &[PlaceRecord]) -> Vec<PlaceRecord> {
        places
            .iter()
            .filter(|p| match self.region {
                Some(ref region) => same_text(p.address.region_name(), region),
                None => true,
            })
            .map(|p| {
                let mut place = p.clone();
                place.events.retain(|e| {
                    let segment_ok = self
                        .segment
                        .as_deref()
                        .map_or(true, |s| same_text(e.segment_label(), s));
                    let date_ok = self.window.is_open()
                        || e.parsed_date().map_or(false, |d| self.window.contains(d));
                    segment_ok && date_ok
                });
                place
            })
            .collect()
    }
}

impl fmt::Display for ReportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = self.region.as_deref().unwrap_or("all regions");
        let segment = self.segment.as_deref().unwrap_or("all segments");
        let from = self
            .window
            .from
            .map_or_else(|| "start".to_string(), |d| d.to_string());
        let to = self
            .window
            .to
            .map_or_else(|| "end".to_string(), |d| d.to_string());
        write!(f, "{}, {}, {} to {}", region, segment, from, to)
    }
}
