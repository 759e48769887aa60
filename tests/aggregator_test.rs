use adventure_agent::aggregator::EventAggregator;
use adventure_agent::domain::{RawRecord, SearchCriteria, Source, TmEvent, VenueCandidate, VenueInfo};
use adventure_agent::error::{AgentError, Result};
use adventure_agent::sources::EventSource;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Test double for one external catalog: canned records or a canned failure,
/// with a call counter to assert fail-fast behavior.
struct StubSource {
    source: Source,
    cap: usize,
    records: Vec<RawRecord>,
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    fn events(events: Vec<RawRecord>) -> Self {
        Self {
            source: Source::Ticketmaster,
            cap: 20,
            records: events,
            failure: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn venues(venues: Vec<RawRecord>) -> Self {
        Self {
            source: Source::GooglePlaces,
            cap: 15,
            records: venues,
            failure: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing(source: Source, message: &str) -> Self {
        Self {
            source,
            cap: 20,
            records: Vec::new(),
            failure: Some(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl EventSource for StubSource {
    fn name(&self) -> &'static str {
        self.source.display_name()
    }

    fn source(&self) -> Source {
        self.source
    }

    fn result_cap(&self) -> usize {
        self.cap
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<RawRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(AgentError::source(message.clone()));
        }
        let mut records = self.records.clone();
        records.truncate(criteria.max_results);
        Ok(records)
    }
}

fn tm_event(id: &str, name: &str) -> RawRecord {
    let event: TmEvent = serde_json::from_value(json!({
        "id": id,
        "name": name,
        "dates": { "start": { "localDate": "2025-09-12" }, "timezone": "America/Chicago" },
        "_embedded": { "venues": [{ "name": "Riverside Hall" }] }
    }))
    .unwrap();
    RawRecord::Ticketmaster(event)
}

fn venue_candidate(id: &str, venue_name: &str, rating: f64) -> RawRecord {
    RawRecord::GooglePlaces(VenueCandidate {
        place_id: Some(id.to_string()),
        name: format!("Events at {}", venue_name),
        venue: VenueInfo {
            name: Some(venue_name.to_string()),
            ..VenueInfo::default()
        },
        rating: Some(rating),
        types: vec!["establishment".to_string()],
        note: "This is a venue that may host events.".to_string(),
        search_date: None,
    })
}

fn criteria(max_results: usize) -> SearchCriteria {
    let mut c = SearchCriteria::new("Austin", "US");
    c.max_results = max_results;
    c
}

#[tokio::test]
async fn results_are_bounded_by_max_results() {
    let events = (0..10).map(|i| tm_event(&format!("e{i}"), "Show")).collect();
    let aggregator = EventAggregator::new(vec![
        Arc::new(StubSource::events(events)),
        Arc::new(StubSource::venues(vec![venue_candidate("p1", "Paramount Theatre", 4.2)])),
    ]);

    let result = aggregator.search(&criteria(3)).await.unwrap();

    assert_eq!(result.events.len(), 3);
    assert_eq!(result.metadata.total_results, 3);
    assert!(result.metadata.errors.is_empty());
}

#[tokio::test]
async fn sources_used_reflects_truncated_output_only() {
    // Venues always rank below confirmed events, so with max_results equal
    // to the event count the venue source is crowded out entirely.
    let events = (0..3).map(|i| tm_event(&format!("e{i}"), "Show")).collect();
    let aggregator = EventAggregator::new(vec![
        Arc::new(StubSource::events(events)),
        Arc::new(StubSource::venues(vec![venue_candidate("p1", "Paramount Theatre", 5.0)])),
    ]);

    let result = aggregator.search(&criteria(3)).await.unwrap();

    assert_eq!(result.metadata.sources_used, vec![Source::Ticketmaster]);
    assert!(result.events.iter().all(|e| e.source == Source::Ticketmaster));
}

#[tokio::test]
async fn ranking_is_descending_and_ties_keep_submission_order() {
    // Three identical-scoring events plus one venue: events first in their
    // original order, venue last.
    let aggregator = EventAggregator::new(vec![
        Arc::new(StubSource::events(vec![
            tm_event("e1", "First Show"),
            tm_event("e2", "Second Show"),
            tm_event("e3", "Third Show"),
        ])),
        Arc::new(StubSource::venues(vec![venue_candidate("p1", "Moody Center", 4.8)])),
    ]);

    let result = aggregator.search(&criteria(10)).await.unwrap();

    let ids: Vec<_> = result.events.iter().map(|e| e.id.as_deref().unwrap()).collect();
    assert_eq!(ids, vec!["e1", "e2", "e3", "p1"]);

    let scores: Vec<f64> = result
        .events
        .iter()
        .map(|e| adventure_agent::scoring::score(e, None))
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn keyword_relevance_reorders_across_sources() {
    let aggregator = EventAggregator::new(vec![
        Arc::new(StubSource::events(vec![
            tm_event("e1", "Monster Truck Rally"),
            tm_event("e2", "Jazz Night"),
        ])),
        Arc::new(StubSource::venues(vec![venue_candidate("p1", "Jazz Alley", 4.5)])),
    ]);

    let mut c = criteria(10);
    c.keywords = Some("jazz".to_string());
    let result = aggregator.search(&c).await.unwrap();

    // The matching event outranks the non-matching one; the venue still
    // trails both events on its lower base score.
    let ids: Vec<_> = result.events.iter().map(|e| e.id.as_deref().unwrap()).collect();
    assert_eq!(ids, vec!["e2", "e1", "p1"]);
}

#[tokio::test]
async fn one_failed_source_still_yields_the_other() {
    let failing = StubSource::failing(Source::Ticketmaster, "quota exceeded");
    let ok = StubSource::venues(vec![
        venue_candidate("p1", "Paramount Theatre", 4.2),
        venue_candidate("p2", "Moody Center", 4.8),
    ]);
    let aggregator = EventAggregator::new(vec![Arc::new(failing), Arc::new(ok)]);

    let result = aggregator.search(&criteria(10)).await.unwrap();

    assert_eq!(result.events.len(), 2);
    assert!(result.events.iter().all(|e| e.source == Source::GooglePlaces));
    assert_eq!(result.metadata.errors.len(), 1);
    assert_eq!(
        result.metadata.errors[0],
        "TicketMaster error: quota exceeded"
    );
    assert_eq!(result.metadata.sources_used, vec![Source::GooglePlaces]);
}

#[tokio::test]
async fn both_sources_failing_is_degraded_success() {
    let aggregator = EventAggregator::new(vec![
        Arc::new(StubSource::failing(Source::Ticketmaster, "auth failed")),
        Arc::new(StubSource::failing(Source::GooglePlaces, "network down")),
    ]);

    let result = aggregator.search(&criteria(10)).await.unwrap();

    assert!(result.events.is_empty());
    assert_eq!(result.metadata.total_results, 0);
    assert!(result.metadata.sources_used.is_empty());
    assert_eq!(result.metadata.errors.len(), 2);
    assert!(result.metadata.errors[0].starts_with("TicketMaster error:"));
    assert!(result.metadata.errors[1].starts_with("Google Places error:"));
}

#[tokio::test]
async fn empty_results_from_both_sources_is_plain_success() {
    let aggregator = EventAggregator::new(vec![
        Arc::new(StubSource::events(Vec::new())),
        Arc::new(StubSource::venues(Vec::new())),
    ]);

    let result = aggregator.search(&criteria(10)).await.unwrap();

    assert_eq!(result.metadata.total_results, 0);
    assert!(result.events.is_empty());
    assert!(result.metadata.errors.is_empty());
    assert!(result.metadata.sources_used.is_empty());
}

#[tokio::test]
async fn invalid_criteria_fail_fast_without_any_source_call() {
    let tm = StubSource::events(vec![tm_event("e1", "Show")]);
    let gp = StubSource::venues(vec![venue_candidate("p1", "Paramount Theatre", 4.0)]);
    let tm_calls = Arc::clone(&tm.calls);
    let gp_calls = Arc::clone(&gp.calls);
    let aggregator = EventAggregator::new(vec![Arc::new(tm), Arc::new(gp)]);

    let empty_city = SearchCriteria::new("   ", "US");
    let bad_country = SearchCriteria::new("Austin", "USA");
    let zero_results = criteria(0);
    let oversized = criteria(101);

    for bad in [empty_city, bad_country, zero_results, oversized] {
        let err = aggregator.search(&bad).await.unwrap_err();
        assert!(err.is_invalid_argument(), "expected InvalidArgument for {:?}", bad);
    }

    assert_eq!(tm_calls.load(Ordering::SeqCst), 0);
    assert_eq!(gp_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn per_source_limit_is_clamped_to_the_adapter_cap() {
    // 30 events available, aggregator-side cap of 20 for the events source:
    // a max_results of 100 must not pull more than 20 from it.
    let events = (0..30).map(|i| tm_event(&format!("e{i}"), "Show")).collect();
    let aggregator = EventAggregator::new(vec![Arc::new(StubSource::events(events))]);

    let result = aggregator.search(&criteria(100)).await.unwrap();

    assert_eq!(result.events.len(), 20);
}

#[tokio::test]
async fn query_and_timestamp_are_echoed_in_the_envelope() {
    let aggregator = EventAggregator::new(vec![Arc::new(StubSource::events(vec![
        tm_event("e1", "Show"),
    ]))]);

    let mut c = criteria(5);
    c.keywords = Some("music".to_string());
    let result = aggregator.search(&c).await.unwrap();

    assert_eq!(result.query.city, "Austin");
    assert_eq!(result.query.keywords.as_deref(), Some("music"));
    assert_eq!(result.query.max_results, 5);
    // RFC 3339 parses back cleanly
    assert!(chrono::DateTime::parse_from_rfc3339(&result.metadata.timestamp).is_ok());
}
