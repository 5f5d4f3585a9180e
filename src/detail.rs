//! Detail view of a single place or region.

use crate::models::{marker_icon_for, PlaceRecord, RegionSummary};
use serde::Serialize;

/// One event line in a place detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventLine {
    pub date: String,
    pub segment: String,
    pub participants: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDetail {
    pub name: String,
    pub kind: String,
    pub icon: String,
    pub address: String,
    pub region: String,
    pub rating: f64,
    pub description: String,
    pub segments: Vec<String>,
    pub events: Vec<EventLine>,
    pub total_participants: u64,
}

impl From<&PlaceRecord> for PlaceDetail {
    fn from(place: &PlaceRecord) -> Self {
        Self {
            name: place.name.clone(),
            kind: place.kind.clone(),
            icon: marker_icon_for(&place.kind).to_string(),
            address: place.address.one_line(),
            region: place.address.region_name().to_string(),
            rating: place.rating,
            description: place.description.clone(),
            segments: place.segments.clone(),
            events: place
                .events
                .iter()
                .map(|e| EventLine {
                    date: e.date.clone(),
                    segment: e.segment_label().to_string(),
                    participants: e.participants.total(),
                })
                .collect(),
            total_participants: place.total_participants(),
        }
    }
}

/// The record shown by `show`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "record", rename_all = "lowercase")]
pub enum RecordDetail {
    Place(PlaceDetail),
    Region(RegionSummary),
}

impl RecordDetail {
    pub fn title(&self) -> &str {
        match self {
            RecordDetail::Place(place) => &place.name,
            RecordDetail::Region(region) => &region.name,
        }
    }

    /// Plain-text rendering for the terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();

        match self {
            RecordDetail::Place(place) => {
                out.push_str(&format!("[{}] {} ({})\n", place.icon, place.name, place.kind));
                out.push_str(&format!("   Address: {}\n", place.address));
                out.push_str(&format!("   Region: {}\n", place.region));
                out.push_str(&format!("   Rating: {:.1}/10\n", place.rating));
                if !place.segments.is_empty() {
                    out.push_str(&format!("   Segments: {}\n", place.segments.join(", ")));
                }
                if !place.description.is_empty() {
                    out.push_str(&format!("   {}\n", place.description));
                }
                out.push_str(&format!(
                    "   Events: {} ({} participants)\n",
                    place.events.len(),
                    place.total_participants
                ));
                for event in &place.events {
                    out.push_str(&format!(
                        "     - {} {}: {}\n",
                        event.date, event.segment, event.participants
                    ));
                }
            }
            RecordDetail::Region(region) => {
                out.push_str(&format!("#{} {} ({})\n", region.id, region.name, region.kind));
                out.push_str(&format!("   State: {}\n", region.state));
                out.push_str(&format!("   Population: {}\n", region.population));
                out.push_str(&format!(
                    "   Coordinates: {:.4}, {:.4}\n",
                    region.latitude, region.longitude
                ));
                out.push_str(&format!("   Events: {}\n", region.total_events));
                out.push_str(&format!(
                    "   Status: {}\n",
                    if region.active { "active" } else { "inactive" }
                ));
            }
        }

        out
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Find a place by case-insensitive name.
pub fn find_place(places: &[PlaceRecord], name: &str) -> Option<RecordDetail> {
    places
        .iter()
        .find(|p| same_name(&p.name, name))
        .map(|p| RecordDetail::Place(PlaceDetail::from(p)))
}

/// Find a region by case-insensitive name.
pub fn find_region(regions: &[RegionSummary], name: &str) -> Option<RecordDetail> {
    regions
        .iter()
        .find(|r| same_name(&r.name, name))
        .cloned()
        .map(RecordDetail::Region)
}
