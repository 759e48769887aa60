use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-facing search parameters, immutable for the duration of one
/// aggregation call. `max_results` defaults to 20 when deserialized from
/// tool-call arguments that omit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub city: String,
    pub country_code: String,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    20
}

impl SearchCriteria {
    pub fn new(city: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country_code: country_code.into(),
            keywords: None,
            start_date: None,
            max_results: default_max_results(),
        }
    }

    /// Country code as sent on the wire (providers want it uppercased).
    pub fn country_code_upper(&self) -> String {
        self.country_code.trim().to_uppercase()
    }

    pub fn with_max_results(&self, max_results: usize) -> Self {
        Self {
            max_results,
            ..self.clone()
        }
    }
}

/// Provenance tag for a record. Set once during normalization, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "ticketmaster")]
    Ticketmaster,
    #[serde(rename = "google_places")]
    GooglePlaces,
}

impl Source {
    /// Human-readable name, used in `metadata.errors` entries.
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Ticketmaster => "TicketMaster",
            Source::GooglePlaces => "Google Places",
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Source::Ticketmaster => RecordKind::Event,
            Source::GooglePlaces => RecordKind::Venue,
        }
    }
}

/// Whether a record is a confirmed scheduled happening or just a place that
/// may host one. The distinction propagates to the caller so a venue is never
/// presented as a guaranteed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "event")]
    Event,
    #[serde(rename = "venue")]
    Venue,
}

/// Nested venue details on a normalized record. Serializes as an empty
/// object when nothing is known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
}

/// Start/timezone information for a confirmed event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDates {
    #[serde(default)]
    pub start: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// The unified event/venue shape every raw record is mapped into.
/// Source-specific passthrough fields (images, price ranges, place types...)
/// are retained for the caller but never inspected downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub id: Option<String>,
    pub name: String,
    pub source: Source,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<EventDates>,
    pub venue: VenueInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Value>,
    #[serde(rename = "priceRanges", default, skip_serializing_if = "Vec::is_empty")]
    pub price_ranges: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_date: Option<String>,
}

/// Raw, source-specific record as returned by an adapter. Consumed only by
/// the normalizer; nothing downstream looks at source-specific fields.
#[derive(Debug, Clone)]
pub enum RawRecord {
    Ticketmaster(TmEvent),
    GooglePlaces(VenueCandidate),
}

impl RawRecord {
    pub fn source(&self) -> Source {
        match self {
            RawRecord::Ticketmaster(_) => Source::Ticketmaster,
            RawRecord::GooglePlaces(_) => Source::GooglePlaces,
        }
    }
}

/// One event from the TicketMaster Discovery v2 event page.
#[derive(Debug, Clone, Deserialize)]
pub struct TmEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub dates: Option<TmDates>,
    #[serde(default)]
    pub images: Vec<Value>,
    #[serde(rename = "priceRanges", default)]
    pub price_ranges: Vec<Value>,
    #[serde(default)]
    pub classifications: Vec<Value>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<TmEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmDates {
    #[serde(default)]
    pub start: Value,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmEmbedded {
    #[serde(default)]
    pub venues: Vec<TmVenue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmVenue {
    pub name: Option<String>,
    pub address: Option<Value>,
    pub city: Option<Value>,
    pub location: Option<Value>,
}

/// A Google Places hit that survived the event-venue filter, already wrapped
/// with the venue-not-event disclaimer by the adapter.
#[derive(Debug, Clone)]
pub struct VenueCandidate {
    pub place_id: Option<String>,
    pub name: String,
    pub venue: VenueInfo,
    pub rating: Option<f64>,
    pub types: Vec<String>,
    pub note: String,
    pub search_date: Option<String>,
}

/// Aggregation statistics attached to every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationMetadata {
    pub total_results: usize,
    /// Distinct sources present in the truncated output, first-seen order.
    pub sources_used: Vec<Source>,
    pub timestamp: String,
    pub errors: Vec<String>,
}

/// The full response envelope: echoed query, metadata, ranked records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    pub query: SearchCriteria,
    pub metadata: AggregationMetadata,
    pub events: Vec<NormalizedRecord>,
}
