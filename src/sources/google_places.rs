use crate::config::HttpConfig;
use crate::domain::{RawRecord, SearchCriteria, Source, VenueCandidate, VenueInfo};
use crate::error::{AgentError, Result};
use crate::sources::{validate_criteria, EventSource};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

const PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Google Places caps text search results well below TicketMaster's page size.
const MAX_RESULTS_CAP: usize = 60;

/// How many results the aggregator asks this source for at most.
const AGGREGATOR_CAP: usize = 15;

/// Fixed terms appended to the user's keywords so the text search leans
/// toward places that host events.
const VENUE_QUERY_TERMS: [&str; 6] = [
    "events",
    "entertainment",
    "venues",
    "concerts",
    "theaters",
    "halls",
];

/// Place categories considered event-relevant. English-only heuristic kept
/// from the original product behavior; coverage for non-English venue names
/// is known to be degraded.
const EVENT_RELATED_TYPES: [&str; 12] = [
    "night_club",
    "casino",
    "museum",
    "amusement_park",
    "stadium",
    "movie_theater",
    "bowling_alley",
    "art_gallery",
    "zoo",
    "tourist_attraction",
    "establishment",
    "point_of_interest",
];

/// Name substrings that mark a place as event-suggestive even when its
/// category tags don't.
const EVENT_NAME_KEYWORDS: [&str; 8] = [
    "theater", "theatre", "concert", "hall", "center", "venue", "club", "arena",
];

const VENUE_NOTE: &str = "This is a venue that may host events. \
Use Google Events search or venue websites for actual event listings.";

/// Adapter for the Google Places text search API. Places has no native
/// events concept, so this searches for venues likely to host events and
/// tags every hit with a venue-not-event disclaimer.
pub struct GooglePlacesSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    name: String,
    place_id: Option<String>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<Value>,
}

impl GooglePlacesSource {
    pub fn new(api_key: String, http: &HttpConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AgentError::Config(
                "Google Places API key is empty".to_string(),
            ));
        }
        Ok(Self {
            client: http.build_client()?,
            api_key,
            base_url: PLACES_BASE_URL.to_string(),
        })
    }

    /// Reads the API key from `GOOGLE_PLACES_API_KEY`, failing fast if unset.
    pub fn from_env(http: &HttpConfig) -> Result<Self> {
        Self::new(std::env::var("GOOGLE_PLACES_API_KEY")?, http)
    }

    /// User keywords plus event-suggestive terms plus "City, CC".
    fn build_query(criteria: &SearchCriteria) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(keywords) = &criteria.keywords {
            parts.push(keywords.trim().to_string());
        }
        parts.extend(VENUE_QUERY_TERMS.iter().map(|term| term.to_string()));
        parts.push(format!(
            "{}, {}",
            criteria.city.trim(),
            criteria.country_code_upper()
        ));
        parts.join(" ")
    }

    /// Category tags intersect the event-relevant set, or the place name
    /// contains an event-suggestive substring (case-insensitive).
    fn is_event_related(place: &Place) -> bool {
        if place
            .types
            .iter()
            .any(|t| EVENT_RELATED_TYPES.contains(&t.as_str()))
        {
            return true;
        }
        let name_lower = place.name.to_lowercase();
        EVENT_NAME_KEYWORDS
            .iter()
            .any(|keyword| name_lower.contains(keyword))
    }

    fn wrap_candidate(place: Place, start_date: Option<&String>) -> VenueCandidate {
        let location = place.geometry.and_then(|g| g.location);
        VenueCandidate {
            place_id: place.place_id,
            name: format!("Events at {}", place.name),
            venue: VenueInfo {
                name: Some(place.name),
                address: Some(Value::String(place.formatted_address.unwrap_or_default())),
                city: None,
                location,
            },
            rating: place.rating,
            types: place.types,
            note: VENUE_NOTE.to_string(),
            search_date: start_date.cloned(),
        }
    }

    fn filter_candidates(
        places: Vec<Place>,
        start_date: Option<&String>,
        max_results: usize,
    ) -> Vec<VenueCandidate> {
        let mut candidates = Vec::new();
        for place in places {
            if Self::is_event_related(&place) {
                candidates.push(Self::wrap_candidate(place, start_date));
            }
            if candidates.len() >= max_results {
                break;
            }
        }
        candidates
    }
}

#[async_trait::async_trait]
impl EventSource for GooglePlacesSource {
    fn name(&self) -> &'static str {
        Source::GooglePlaces.display_name()
    }

    fn source(&self) -> Source {
        Source::GooglePlaces
    }

    fn result_cap(&self) -> usize {
        AGGREGATOR_CAP
    }

    #[instrument(skip(self), fields(city = %criteria.city))]
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<RawRecord>> {
        validate_criteria(criteria, 1, MAX_RESULTS_CAP)?;

        let url = format!("{}/textsearch/json", self.base_url);
        let query = Self::build_query(criteria);
        let params: Vec<(&str, String)> = vec![
            ("key", self.api_key.clone()),
            ("query", query),
            ("type", "establishment".to_string()),
        ];

        debug!("querying Google Places text search");
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                AgentError::source(format!("Error fetching venues from Google Places: {}", e))
            })?;

        let body: TextSearchResponse = response.json().await.map_err(|e| {
            AgentError::source(format!("Error parsing Google Places response: {}", e))
        })?;

        match body.status.as_str() {
            "OK" => {}
            // "no matches" is an empty success, not a failure
            "ZERO_RESULTS" => return Ok(Vec::new()),
            status => {
                let message = body.error_message.unwrap_or_else(|| status.to_string());
                return Err(AgentError::source(format!(
                    "Google Places API error: {}",
                    message
                )));
            }
        }

        let candidates = Self::filter_candidates(
            body.results,
            criteria.start_date.as_ref(),
            criteria.max_results,
        );
        info!("found {} event-related venues on Google Places", candidates.len());

        Ok(candidates
            .into_iter()
            .map(RawRecord::GooglePlaces)
            .collect())
    }
}
