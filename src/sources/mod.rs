use crate::domain::{RawRecord, SearchCriteria, Source};
use crate::error::{AgentError, Result};

pub mod google_places;
pub mod ticketmaster;

pub use google_places::GooglePlacesSource;
pub use ticketmaster::TicketmasterSource;

/// Uniform search capability over one external catalog. The aggregator only
/// ever talks to this trait, so additional sources plug in without touching
/// the orchestration logic.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Human-readable source name for logs and error entries.
    fn name(&self) -> &'static str;

    /// Provenance tag stamped onto this source's records during normalization.
    fn source(&self) -> Source;

    /// Per-source cap the aggregator clamps `max_results` to before fan-out.
    fn result_cap(&self) -> usize;

    /// Fetch up to `criteria.max_results` raw records. A confirmed
    /// zero-results response is `Ok(vec![])`, never an error.
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<RawRecord>>;
}

/// Criteria validation shared by every adapter. Each adapter calls this with
/// its own supported `max_results` range before issuing any network request;
/// the aggregator applies the same checks with the caller-facing [1,100]
/// range, so invalid input is rejected identically at both layers.
pub fn validate_criteria(
    criteria: &SearchCriteria,
    min_results: usize,
    max_results: usize,
) -> Result<()> {
    if criteria.max_results < min_results || criteria.max_results > max_results {
        return Err(AgentError::invalid_argument(format!(
            "max_results must be between {} and {}",
            min_results, max_results
        )));
    }

    if criteria.city.trim().is_empty() {
        return Err(AgentError::invalid_argument(
            "City parameter cannot be empty",
        ));
    }

    if criteria.country_code.len() != 2 {
        return Err(AgentError::invalid_argument(
            "Country code must be a 2-letter code (e.g., 'US', 'CA')",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(city: &str, country: &str, max: usize) -> SearchCriteria {
        let mut c = SearchCriteria::new(city, country);
        c.max_results = max;
        c
    }

    #[test]
    fn accepts_valid_criteria() {
        assert!(validate_criteria(&criteria("Austin", "US", 20), 1, 100).is_ok());
    }

    #[test]
    fn rejects_empty_city() {
        let err = validate_criteria(&criteria("   ", "US", 20), 1, 100).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn rejects_three_letter_country() {
        let err = validate_criteria(&criteria("Austin", "USA", 20), 1, 100).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn enforces_adapter_specific_ranges() {
        // 150 is fine for the confirmed-events range but not venue-directory
        assert!(validate_criteria(&criteria("Austin", "US", 150), 1, 200).is_ok());
        assert!(validate_criteria(&criteria("Austin", "US", 150), 1, 60).is_err());
        assert!(validate_criteria(&criteria("Austin", "US", 0), 1, 100).is_err());
    }
}
