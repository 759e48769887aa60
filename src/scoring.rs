use crate::domain::{NormalizedRecord, Source};

// Ranking weights. Hardcoded heuristics inherited from the product's tuning;
// configuration candidates, kept fixed for behavioral compatibility.
pub const CONFIRMED_EVENT_BASE: f64 = 10.0;
pub const VENUE_BASE: f64 = 5.0;
pub const KEYWORD_MATCH_BONUS: f64 = 2.0;
pub const RATING_WEIGHT: f64 = 0.5;
pub const RATING_BONUS_CAP: f64 = 2.5;
pub const DATE_BONUS: f64 = 1.0;
pub const VENUE_NAME_BONUS: f64 = 0.5;

/// Minimum venue-name length (exclusive) for the venue-quality bonus.
const VENUE_NAME_MIN_LEN: usize = 5;

/// Relevance/quality score for one normalized record. Pure and additive:
/// source prior, per-token keyword matches against name + venue name,
/// capped rating bonus, temporal bonus, venue-name bonus.
pub fn score(record: &NormalizedRecord, keywords: Option<&str>) -> f64 {
    let mut score = match record.source {
        Source::Ticketmaster => CONFIRMED_EVENT_BASE,
        Source::GooglePlaces => VENUE_BASE,
    };

    if let Some(keywords) = keywords {
        let venue_name = record.venue.name.as_deref().unwrap_or_default();
        let record_text = format!("{} {}", record.name, venue_name).to_lowercase();
        for token in keywords.to_lowercase().split_whitespace() {
            if record_text.contains(token) {
                score += KEYWORD_MATCH_BONUS;
            }
        }
    }

    if let Some(rating) = record.rating {
        score += (rating * RATING_WEIGHT).min(RATING_BONUS_CAP);
    }

    // Confirmed events always carry a dates block; venues qualify only when
    // a search date was echoed back.
    if record.dates.is_some() || record.search_date.is_some() {
        score += DATE_BONUS;
    }

    if let Some(venue_name) = &record.venue.name {
        if venue_name.len() > VENUE_NAME_MIN_LEN {
            score += VENUE_NAME_BONUS;
        }
    }

    score
}
