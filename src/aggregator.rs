use crate::config::Config;
use crate::domain::{
    AggregationMetadata, AggregationResult, NormalizedRecord, SearchCriteria, Source,
};
use crate::error::Result;
use crate::normalize::normalize;
use crate::scoring::score;
use crate::sources::{validate_criteria, EventSource, GooglePlacesSource, TicketmasterSource};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Caller-facing bounds on `max_results`; adapters apply their own tighter
/// ranges on top of this.
pub const MIN_RESULTS: usize = 1;
pub const MAX_RESULTS: usize = 100;

/// Fans one search out to every registered source concurrently, tolerates
/// per-source failure, then normalizes, scores, ranks and truncates the
/// combined results into a single response envelope.
pub struct EventAggregator {
    sources: Vec<Arc<dyn EventSource>>,
}

impl EventAggregator {
    /// Aggregator over an explicit source registry. Sources are queried in
    /// registration order, which is also the score tie-break order.
    pub fn new(sources: Vec<Arc<dyn EventSource>>) -> Self {
        Self { sources }
    }

    /// Standard two-source setup: TicketMaster first, Google Places second.
    /// Fails fast if either API key is missing.
    pub fn from_env(config: &Config) -> Result<Self> {
        Ok(Self::new(vec![
            Arc::new(TicketmasterSource::from_env(&config.http)?),
            Arc::new(GooglePlacesSource::from_env(&config.http)?),
        ]))
    }

    /// Run the full fan-out/merge/rank/truncate pipeline.
    ///
    /// Only caller-level validation failures propagate as errors; adapter
    /// failures are folded into `metadata.errors`, and a response with both
    /// sources failed is still a structurally valid (degraded) success.
    #[instrument(skip(self), fields(city = %criteria.city))]
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<AggregationResult> {
        validate_criteria(criteria, MIN_RESULTS, MAX_RESULTS)?;

        let mut handles = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let source = Arc::clone(source);
            let limit = criteria.max_results.min(source.result_cap());
            let source_criteria = criteria.with_max_results(limit);
            handles.push((
                source.source(),
                tokio::spawn(async move { source.search(&source_criteria).await }),
            ));
        }

        let mut errors: Vec<String> = Vec::new();
        let mut records: Vec<NormalizedRecord> = Vec::new();

        // Join in registration order so ranking ties keep source-submission
        // order. A failed source contributes zero records, never aborting
        // the others.
        for (source, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    warn!("source task for {} panicked: {}", source.display_name(), join_err);
                    errors.push(format!("{} error: {}", source.display_name(), join_err));
                    continue;
                }
            };
            match outcome {
                Ok(raw_records) => {
                    records.extend(raw_records.into_iter().map(normalize));
                }
                Err(e) => {
                    warn!("source {} failed: {}", source.display_name(), e);
                    errors.push(format!("{} error: {}", source.display_name(), e));
                }
            }
        }

        let keywords = criteria.keywords.as_deref();
        let mut scored: Vec<(f64, NormalizedRecord)> = records
            .into_iter()
            .map(|record| (score(&record, keywords), record))
            .collect();

        // Stable sort: equal scores keep submission order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(criteria.max_results);

        let events: Vec<NormalizedRecord> =
            scored.into_iter().map(|(_, record)| record).collect();

        // Distinct sources actually present in the truncated output, not the
        // set of sources queried.
        let mut sources_used: Vec<Source> = Vec::new();
        for event in &events {
            if !sources_used.contains(&event.source) {
                sources_used.push(event.source);
            }
        }

        info!(
            total = events.len(),
            errors = errors.len(),
            "aggregation complete"
        );

        Ok(AggregationResult {
            query: criteria.clone(),
            metadata: AggregationMetadata {
                total_results: events.len(),
                sources_used,
                timestamp: chrono::Utc::now().to_rfc3339(),
                errors,
            },
            events,
        })
    }

    /// Aggregation result rendered as pretty-printed JSON, the shape handed
    /// to the LLM as a tool result.
    pub async fn search_json(&self, criteria: &SearchCriteria) -> Result<String> {
        let result = self.search(criteria).await?;
        Ok(serde_json::to_string_pretty(&result)?)
    }

    /// OpenAI function-calling descriptor for the aggregated event search.
    pub fn descriptor() -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": "get_events",
                "description": "Search for events and entertainment venues in a specified city using multiple data sources. \
                    Aggregates and ranks results from TicketMaster and Google Places to provide comprehensive event listings \
                    with intelligent scoring.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "The city to search for events in (e.g., 'Austin', 'Los Angeles', 'Seattle', 'New York'). Supports major international cities."
                        },
                        "country_code": {
                            "type": "string",
                            "description": "Two-letter ISO 3166-1 alpha-2 country code (e.g., 'US', 'CA', 'GB', 'AU')",
                            "pattern": "^[A-Z]{2}$",
                            "minLength": 2,
                            "maxLength": 2
                        },
                        "keywords": {
                            "type": "string",
                            "description": "Optional keywords to filter events by category, genre, or type (e.g., 'music', 'comedy', 'sports', 'theater', 'concerts', 'festivals')"
                        },
                        "start_date": {
                            "type": "string",
                            "description": "Optional start date filter in ISO 8601 format (e.g., '2025-08-10T00:00:00Z') to find events occurring on or after this date",
                            "format": "date-time"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of results to return from aggregation",
                            "minimum": 1,
                            "maximum": 100,
                            "default": 20
                        }
                    },
                    "required": ["city", "country_code"],
                    "additionalProperties": false
                }
            }
        })
    }
}
