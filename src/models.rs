//! Data models for the cultural dashboard.
//!
//! This module contains the raw venue records as they appear in the
//! dataset, the fixed lookup tables (segments, age brackets, venue
//! kinds) and the derived structures produced by aggregation.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Neutral color used for labels missing from every lookup table.
pub const FALLBACK_COLOR: &str = "#999999";

/// Segment label used when an event has no category.
pub const DEFAULT_SEGMENT: &str = "Outros";

/// Region label used when a place has no region in its address.
pub const UNKNOWN_REGION: &str = "Não informada";

/// Deserialize a field, falling back to its default when the value is
/// null or of the wrong type. Keeps one bad field from rejecting a record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a list item by item, dropping items that do not parse.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!("Expected a list, ignoring {}", other);
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping malformed list item: {}", e);
                None
            }
        })
        .collect())
}

/// Age bracket used to break down event attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    /// 0-17 years
    Infantil,
    /// 18-30 years
    Jovem,
    /// 31-50 years
    Adulto,
    /// 51+ years
    Idoso,
}

impl AgeBracket {
    /// All brackets in display order.
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::Infantil,
        AgeBracket::Jovem,
        AgeBracket::Adulto,
        AgeBracket::Idoso,
    ];

    /// Key used for this bracket in the dataset.
    pub fn key(&self) -> &'static str {
        match self {
            AgeBracket::Infantil => "Infantil",
            AgeBracket::Jovem => "Jovem",
            AgeBracket::Adulto => "Adulto",
            AgeBracket::Idoso => "Idoso",
        }
    }

    /// Display label including the age range.
    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::Infantil => "Infantil (0-17)",
            AgeBracket::Jovem => "Jovem (18-30)",
            AgeBracket::Adulto => "Adulto (31-50)",
            AgeBracket::Idoso => "Idoso (51+)",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AgeBracket::Infantil => "#8B008B",
            AgeBracket::Jovem => "#191970",
            AgeBracket::Adulto => "#00FF00",
            AgeBracket::Idoso => "#f97316",
        }
    }

    /// Look up a bracket by its dataset key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.key() == key)
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Known cultural segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Musica,
    Teatro,
    Danca,
    Literatura,
    ArtesVisuais,
    Cinema,
    Historia,
    Ciencia,
    Fotografia,
    Folclore,
    Pintura,
    Escultura,
    Outros,
}

impl Segment {
    pub const ALL: [Segment; 13] = [
        Segment::Musica,
        Segment::Teatro,
        Segment::Danca,
        Segment::Literatura,
        Segment::ArtesVisuais,
        Segment::Cinema,
        Segment::Historia,
        Segment::Ciencia,
        Segment::Fotografia,
        Segment::Folclore,
        Segment::Pintura,
        Segment::Escultura,
        Segment::Outros,
    ];

    /// Label as written in the dataset.
    pub fn label(&self) -> &'static str {
        match self {
            Segment::Musica => "Música",
            Segment::Teatro => "Teatro",
            Segment::Danca => "Dança",
            Segment::Literatura => "Literatura",
            Segment::ArtesVisuais => "Artes Visuais",
            Segment::Cinema => "Cinema",
            Segment::Historia => "História",
            Segment::Ciencia => "Ciência",
            Segment::Fotografia => "Fotografia",
            Segment::Folclore => "Folclore",
            Segment::Pintura => "Pintura",
            Segment::Escultura => "Escultura",
            Segment::Outros => "Outros",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Segment::Musica => "#191970",
            Segment::Teatro => "#00FF00",
            Segment::Danca => "#FF1493",
            Segment::Literatura => "#8B008B",
            Segment::ArtesVisuais => "#ef4444",
            Segment::Cinema => "#06b6d4",
            Segment::Historia => "#10b981",
            Segment::Ciencia => "#f97316",
            Segment::Fotografia => "#facc15",
            Segment::Folclore => "#C71585",
            Segment::Pintura => "#8b5cf6",
            Segment::Escultura => "#F5DEB3",
            Segment::Outros => "#84cc16",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Color for a series label: segments first, then age-bracket keys,
/// then [`FALLBACK_COLOR`].
pub fn label_color(label: &str) -> &'static str {
    if let Some(segment) = Segment::from_label(label) {
        return segment.color();
    }
    match AgeBracket::from_key(label) {
        Some(bracket) => bracket.color(),
        None => FALLBACK_COLOR,
    }
}

/// Kind of venue a place is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VenueKind {
    CentroCultural,
    Teatro,
    CasaDeCultura,
    EspacoCultural,
    Biblioteca,
    Museu,
    GaleriaDeArte,
    Cinema,
}

impl VenueKind {
    pub const ALL: [VenueKind; 8] = [
        VenueKind::CentroCultural,
        VenueKind::Teatro,
        VenueKind::CasaDeCultura,
        VenueKind::EspacoCultural,
        VenueKind::Biblioteca,
        VenueKind::Museu,
        VenueKind::GaleriaDeArte,
        VenueKind::Cinema,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VenueKind::CentroCultural => "Centro Cultural",
            VenueKind::Teatro => "Teatro",
            VenueKind::CasaDeCultura => "Casa de Cultura",
            VenueKind::EspacoCultural => "Espaço Cultural",
            VenueKind::Biblioteca => "Biblioteca",
            VenueKind::Museu => "Museu",
            VenueKind::GaleriaDeArte => "Galeria de Arte",
            VenueKind::Cinema => "Cinema",
        }
    }

    /// Map marker color.
    pub fn marker_color(&self) -> &'static str {
        match self {
            VenueKind::CentroCultural => "#0ea5e9",
            VenueKind::Teatro => "#10b981",
            VenueKind::CasaDeCultura => "#f97316",
            VenueKind::EspacoCultural => "#8b5cf6",
            VenueKind::Biblioteca => "#ef4444",
            VenueKind::Museu => "#06b6d4",
            VenueKind::GaleriaDeArte => "#facc15",
            VenueKind::Cinema => "#C71585",
        }
    }

    /// Short text drawn inside the map marker.
    pub fn marker_icon(&self) -> &'static str {
        match self {
            VenueKind::CentroCultural => "CC",
            VenueKind::Teatro => "T",
            VenueKind::CasaDeCultura => "CA",
            VenueKind::EspacoCultural => "E",
            VenueKind::Biblioteca => "B",
            VenueKind::Museu => "M",
            VenueKind::GaleriaDeArte => "GA",
            VenueKind::Cinema => "C",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }
}

/// Marker color for a raw venue kind, gray for unknown kinds.
pub fn marker_color_for(kind: &str) -> &'static str {
    VenueKind::from_label(kind).map_or("#6b7280", |k| k.marker_color())
}

/// Marker icon for a raw venue kind, `?` for unknown kinds.
pub fn marker_icon_for(kind: &str) -> &'static str {
    VenueKind::from_label(kind).map_or("?", |k| k.marker_icon())
}

/// Attendance of one event, broken down by age bracket.
///
/// Keys outside the four fixed brackets are kept in `other`: they count
/// towards [`Participants::total`] but never towards a bracket. Counts that
/// are not non-negative integers are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct Participants {
    #[serde(rename = "Infantil", default, skip_serializing_if = "is_zero")]
    pub infantil: u64,
    #[serde(rename = "Jovem", default, skip_serializing_if = "is_zero")]
    pub jovem: u64,
    #[serde(rename = "Adulto", default, skip_serializing_if = "is_zero")]
    pub adulto: u64,
    #[serde(rename = "Idoso", default, skip_serializing_if = "is_zero")]
    pub idoso: u64,
    /// Any other keys found in the record.
    #[serde(flatten)]
    pub other: BTreeMap<String, u64>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl From<BTreeMap<String, Value>> for Participants {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let mut participants = Participants::default();

        for (key, value) in raw {
            let Some(count) = value.as_u64() else {
                warn!("Ignoring participant count {}: {}", key, value);
                continue;
            };

            match AgeBracket::from_key(&key) {
                Some(AgeBracket::Infantil) => participants.infantil = count,
                Some(AgeBracket::Jovem) => participants.jovem = count,
                Some(AgeBracket::Adulto) => participants.adulto = count,
                Some(AgeBracket::Idoso) => participants.idoso = count,
                None => {
                    participants.other.insert(key, count);
                }
            }
        }

        participants
    }
}

impl Participants {
    pub fn new(infantil: u64, jovem: u64, adulto: u64, idoso: u64) -> Self {
        Self {
            infantil,
            jovem,
            adulto,
            idoso,
            other: BTreeMap::new(),
        }
    }

    pub fn get(&self, bracket: AgeBracket) -> u64 {
        match bracket {
            AgeBracket::Infantil => self.infantil,
            AgeBracket::Jovem => self.jovem,
            AgeBracket::Adulto => self.adulto,
            AgeBracket::Idoso => self.idoso,
        }
    }

    /// Sum over every key, including unrecognised ones. Saturates.
    pub fn total(&self) -> u64 {
        [self.infantil, self.jovem, self.adulto, self.idoso]
            .into_iter()
            .chain(self.other.values().copied())
            .fold(0u64, u64::saturating_add)
    }
}

/// Address block of a place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "logradouro", default, deserialize_with = "lenient")]
    pub street: String,
    #[serde(rename = "bairro", default, deserialize_with = "lenient")]
    pub neighborhood: String,
    #[serde(rename = "cidade", default, deserialize_with = "lenient")]
    pub city: String,
    #[serde(rename = "estado", default, deserialize_with = "lenient")]
    pub state: String,
    #[serde(
        rename = "regiao",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub region: Option<String>,
    #[serde(rename = "populacao", default, deserialize_with = "lenient")]
    pub population: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: f64,
}

impl Address {
    /// Region name, or [`UNKNOWN_REGION`] when absent or blank.
    pub fn region_name(&self) -> &str {
        match self.region.as_deref().map(str::trim) {
            Some(region) if !region.is_empty() => region,
            _ => UNKNOWN_REGION,
        }
    }

    /// One-line address: "street, neighborhood - city/state".
    pub fn one_line(&self) -> String {
        format!(
            "{}, {} - {}/{}",
            self.street, self.neighborhood, self.city, self.state
        )
    }
}

/// A single cultural activity held at a place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(
        rename = "segmento",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub segment: Option<String>,
    /// Date as written in the dataset (`DD/MM/YYYY`). Empty when missing
    /// or not a string, so it fails to parse like any other bad date.
    #[serde(rename = "data", default, deserialize_with = "lenient")]
    pub date: String,
    #[serde(rename = "participantes", default, deserialize_with = "lenient")]
    pub participants: Participants,
}

impl EventRecord {
    /// Segment label, or [`DEFAULT_SEGMENT`] when missing or blank.
    pub fn segment_label(&self) -> &str {
        match self.segment.as_deref().map(str::trim) {
            Some(segment) if !segment.is_empty() => segment,
            _ => DEFAULT_SEGMENT,
        }
    }

    pub fn parsed_date(&self) -> Result<NaiveDate, DateError> {
        parse_event_date(&self.date)
    }
}

/// A cultural venue with its events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(rename = "local")]
    pub name: String,
    #[serde(rename = "tipo", default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(rename = "endereco", default, deserialize_with = "lenient")]
    pub address: Address,
    /// Score on a 0-10 scale, 0 when missing or null.
    #[serde(rename = "avaliacao", default, deserialize_with = "lenient")]
    pub rating: f64,
    #[serde(rename = "segmentosCulturais", default, deserialize_with = "lenient_list")]
    pub segments: Vec<String>,
    #[serde(rename = "descricao", default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(rename = "eventos", default, deserialize_with = "lenient_list")]
    pub events: Vec<EventRecord>,
}

impl PlaceRecord {
    /// Participants summed across all events of this place.
    pub fn total_participants(&self) -> u64 {
        self.events
            .iter()
            .map(|e| e.participants.total())
            .fold(0u64, u64::saturating_add)
    }
}

/// Errors from parsing an event date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date '{0}' is not in DD/MM/YYYY form")]
    Format(String),
    #[error("date '{0}' is out of range")]
    OutOfRange(String),
}

/// Parse a `DD/MM/YYYY` event date.
pub fn parse_event_date(raw: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").map_err(|e| match e.kind() {
        chrono::format::ParseErrorKind::OutOfRange => DateError::OutOfRange(raw.to_string()),
        _ => DateError::Format(raw.to_string()),
    })
}

/// Month bucket used by the time series. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One labeled value of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SeriesEntry {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Ordered chart input.
pub type Series = Vec<SeriesEntry>;

/// Sum of all values in a series.
pub fn series_total(series: &[SeriesEntry]) -> f64 {
    series.iter().map(|e| e.value).sum()
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Global statistics over a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_events: u64,
    pub total_participants: u64,
    pub total_regions: usize,
    /// Mean place rating, `None` when there are no places.
    pub mean_rating: Option<f64>,
}

impl Summary {
    /// Average participants per event, rounded to one decimal.
    pub fn mean_participants_per_event(&self) -> Option<f64> {
        if self.total_events == 0 {
            return None;
        }
        Some(round1(
            self.total_participants as f64 / self.total_events as f64,
        ))
    }

    /// Mean rating formatted for display.
    pub fn mean_rating_display(&self) -> String {
        match self.mean_rating {
            Some(rating) => format!("{:.1}", rating),
            None => "N/A".to_string(),
        }
    }
}

/// Everything the dashboard shows, derived from one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub by_segment: Series,
    pub by_month: Series,
    pub by_region: Series,
    pub by_age_bracket: Series,
}

/// Whether a region entry is a neighborhood or a whole city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Bairro,
    Cidade,
}

impl RegionKind {
    pub fn key(&self) -> &'static str {
        match self {
            RegionKind::Bairro => "bairro",
            RegionKind::Cidade => "cidade",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Bairro => write!(f, "Bairro"),
            RegionKind::Cidade => write!(f, "Cidade"),
        }
    }
}

/// A region as listed by the region browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub id: usize,
    pub name: String,
    pub kind: RegionKind,
    pub state: String,
    pub population: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub total_events: usize,
    pub active: bool,
}

/// A place projected for the map explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: usize,
    pub name: String,
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_events: usize,
    pub participants: u64,
    pub segments: Vec<String>,
    pub rating: f64,
    pub address: String,
    pub color: String,
    pub icon: String,
}

/// A place ranked by attendance in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRanking {
    pub name: String,
    pub kind: String,
    pub region: String,
    pub events: usize,
    pub participants: u64,
    pub rating: f64,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the dataset was loaded from.
    pub source: String,
    pub generated_at: DateTime<Utc>,
    /// Name of the signed-in user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_for: Option<String>,
    /// Human-readable description of the applied filters.
    pub scope: String,
    pub places_considered: usize,
}

/// A complete cultural report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub dashboard: Dashboard,
    pub top_places: Vec<PlaceRanking>,
    pub regions: Vec<RegionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_bracket_order() {
        let keys: Vec<_> = AgeBracket::ALL.iter().map(|b| b.key()).collect();
        assert_eq!(keys, vec!["Infantil", "Jovem", "Adulto", "Idoso"]);
        assert_eq!(AgeBracket::Idoso.label(), "Idoso (51+)");
    }

    #[test]
    fn test_label_color_lookup() {
        assert_eq!(label_color("Música"), "#191970");
        assert_eq!(label_color("Outros"), "#84cc16");
        assert_eq!(label_color("Idoso"), "#f97316");
        assert_eq!(label_color("Capoeira"), FALLBACK_COLOR);
        assert_eq!(label_color(""), FALLBACK_COLOR);
    }

    #[test]
    fn test_marker_lookup_fallback() {
        assert_eq!(marker_color_for("Museu"), "#06b6d4");
        assert_eq!(marker_icon_for("Galeria de Arte"), "GA");
        assert_eq!(marker_color_for("Planetário"), "#6b7280");
        assert_eq!(marker_icon_for("Planetário"), "?");
    }

    #[test]
    fn test_participants_extra_keys_count_in_total_only() {
        let json = r#"{"Adulto": 10, "Jovem": 5, "Bebê": 2}"#;
        let participants: Participants = serde_json::from_str(json).unwrap();

        assert_eq!(participants.get(AgeBracket::Adulto), 10);
        assert_eq!(participants.get(AgeBracket::Infantil), 0);
        assert_eq!(participants.other.get("Bebê"), Some(&2));
        assert_eq!(participants.total(), 17);
    }

    #[test]
    fn test_parse_place_record() {
        let json = r#"{
            "local": "Teatro Municipal",
            "tipo": "Teatro",
            "endereco": {
                "logradouro": "Praça Ramos", "bairro": "República", "cidade": "São Paulo",
                "estado": "SP", "populacao": 12000, "latitude": -23.54, "longitude": -46.63
            },
            "avaliacao": 9.1,
            "segmentosCulturais": ["Teatro", "Música"],
            "descricao": "Casa de ópera",
            "eventos": [
                {"segmento": "Música", "data": "01/03/2024", "participantes": {"Adulto": 10}}
            ]
        }"#;

        let place: PlaceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(place.name, "Teatro Municipal");
        assert_eq!(place.address.region_name(), UNKNOWN_REGION);
        assert_eq!(place.address.one_line(), "Praça Ramos, República - São Paulo/SP");
        assert_eq!(place.events.len(), 1);
        assert_eq!(place.total_participants(), 10);
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let json = r#"{
            "local": "Casa sem dados",
            "tipo": null,
            "endereco": null,
            "avaliacao": null,
            "segmentosCulturais": null,
            "eventos": [
                {"data": "01/03/2024", "participantes": {"Adulto": 10}},
                {"data": null, "participantes": {"Jovem": 5}},
                {"segmento": 3, "data": "02/03/2024", "participantes": null},
                "not an event"
            ]
        }"#;

        let place: PlaceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(place.rating, 0.0);
        assert_eq!(place.kind, "");
        assert_eq!(place.address.region_name(), UNKNOWN_REGION);
        assert!(place.segments.is_empty());
        assert_eq!(place.events.len(), 3);
        assert_eq!(place.events[1].date, "");
        assert!(place.events[1].parsed_date().is_err());
        assert_eq!(place.events[2].segment_label(), DEFAULT_SEGMENT);
        assert_eq!(place.total_participants(), 15);
    }

    #[test]
    fn test_participants_ignore_bad_counts() {
        let json = r#"{"Adulto": 10, "Jovem": null, "Idoso": -3, "Bebê": "two"}"#;
        let participants: Participants = serde_json::from_str(json).unwrap();

        assert_eq!(participants.get(AgeBracket::Adulto), 10);
        assert_eq!(participants.get(AgeBracket::Jovem), 0);
        assert_eq!(participants.get(AgeBracket::Idoso), 0);
        assert!(participants.other.is_empty());
        assert_eq!(participants.total(), 10);
    }

    #[test]
    fn test_participant_totals_saturate() {
        let mut participants = Participants::new(u64::MAX, 1, 0, 0);
        participants.other.insert("Bebê".to_string(), 7);
        assert_eq!(participants.total(), u64::MAX);

        let place = PlaceRecord {
            name: "Lotado".to_string(),
            events: vec![
                EventRecord {
                    participants: Participants::new(0, 0, u64::MAX, 0),
                    ..Default::default()
                },
                EventRecord {
                    participants: Participants::new(0, 0, 1, 0),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(place.total_participants(), u64::MAX);
    }

    #[test]
    fn test_event_segment_default() {
        let event = EventRecord {
            segment: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(event.segment_label(), DEFAULT_SEGMENT);
    }

    #[test]
    fn test_parse_event_date() {
        let date = parse_event_date("15/03/2024").unwrap();
        assert_eq!(MonthKey::from(date).to_string(), "2024-03");

        let date = parse_event_date("1/7/2023").unwrap();
        assert_eq!(MonthKey::from(date).to_string(), "2023-07");

        assert!(matches!(parse_event_date("2024-03-15"), Err(DateError::Format(_))));
        assert!(parse_event_date("31/02/2024").is_err());
        assert!(parse_event_date("").is_err());
    }

    #[test]
    fn test_month_key_ordering() {
        let dec = MonthKey { year: 2023, month: 12 };
        let jan = MonthKey { year: 2024, month: 1 };
        let early = MonthKey { year: 999, month: 5 };
        assert!(dec < jan);
        assert!(early < dec);
        assert_eq!(early.to_string(), "0999-05");
    }

    #[test]
    fn test_summary_helpers() {
        let summary = Summary {
            total_events: 3,
            total_participants: 10,
            total_regions: 1,
            mean_rating: None,
        };
        assert_eq!(summary.mean_participants_per_event(), Some(3.3));
        assert_eq!(summary.mean_rating_display(), "N/A");
        assert_eq!(Summary::default().mean_participants_per_event(), None);
    }
}
