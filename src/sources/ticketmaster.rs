use crate::config::HttpConfig;
use crate::domain::{RawRecord, SearchCriteria, Source, TmEvent};
use crate::error::{AgentError, Result};
use crate::sources::{validate_criteria, EventSource};
use serde::Deserialize;
use tracing::{debug, info, instrument};

const TICKETMASTER_BASE_URL: &str = "https://app.ticketmaster.com/discovery/v2";

/// TicketMaster Discovery v2 page size limit.
const PAGE_SIZE_CAP: usize = 200;

/// How many results the aggregator asks this source for at most.
const AGGREGATOR_CAP: usize = 20;

/// Adapter for the TicketMaster Discovery API: confirmed, scheduled events
/// with venue, date and pricing metadata.
pub struct TicketmasterSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DiscoveryPage {
    #[serde(rename = "_embedded")]
    embedded: Option<DiscoveryEmbedded>,
}

#[derive(Debug, Deserialize)]
struct DiscoveryEmbedded {
    #[serde(default)]
    events: Vec<TmEvent>,
}

impl TicketmasterSource {
    pub fn new(api_key: String, http: &HttpConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AgentError::Config(
                "TicketMaster API key is empty".to_string(),
            ));
        }
        Ok(Self {
            client: http.build_client()?,
            api_key,
            base_url: TICKETMASTER_BASE_URL.to_string(),
        })
    }

    /// Reads the API key from `TICKETMASTER_API_KEY`, failing fast if unset.
    pub fn from_env(http: &HttpConfig) -> Result<Self> {
        Self::new(std::env::var("TICKETMASTER_API_KEY")?, http)
    }

    fn extract_events(page: DiscoveryPage, max_results: usize) -> Vec<TmEvent> {
        // A page without an `_embedded` block is a confirmed empty result,
        // not a malformed response.
        let mut events = page
            .embedded
            .map(|embedded| embedded.events)
            .unwrap_or_default();
        events.truncate(max_results);
        events
    }
}

#[async_trait::async_trait]
impl EventSource for TicketmasterSource {
    fn name(&self) -> &'static str {
        Source::Ticketmaster.display_name()
    }

    fn source(&self) -> Source {
        Source::Ticketmaster
    }

    fn result_cap(&self) -> usize {
        AGGREGATOR_CAP
    }

    #[instrument(skip(self), fields(city = %criteria.city))]
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<RawRecord>> {
        validate_criteria(criteria, 1, PAGE_SIZE_CAP)?;

        let url = format!("{}/events.json", self.base_url);
        let size = criteria.max_results.min(PAGE_SIZE_CAP);

        let mut params: Vec<(&str, String)> = vec![
            ("apikey", self.api_key.clone()),
            ("city", criteria.city.trim().to_string()),
            ("countryCode", criteria.country_code_upper()),
            ("size", size.to_string()),
        ];
        if let Some(keywords) = &criteria.keywords {
            params.push(("keyword", keywords.trim().to_string()));
        }
        if let Some(start_date) = &criteria.start_date {
            params.push(("startDateTime", start_date.clone()));
        }

        debug!(size, "querying TicketMaster Discovery API");
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                AgentError::source(format!("Error fetching events from Ticketmaster: {}", e))
            })?;

        let page: DiscoveryPage = response.json().await.map_err(|e| {
            AgentError::source(format!("Error parsing Ticketmaster response: {}", e))
        })?;

        let events = Self::extract_events(page, criteria.max_results);
        info!("fetched {} events from TicketMaster", events.len());

        Ok(events.into_iter().map(RawRecord::Ticketmaster).collect())
    }
}
