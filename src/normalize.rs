use crate::domain::{
    EventDates, NormalizedRecord, RawRecord, RecordKind, Source, TmEvent, VenueCandidate,
    VenueInfo,
};

/// Map a raw source record into the unified shape. Total function: missing
/// fields are defaulted, never rejected.
pub fn normalize(raw: RawRecord) -> NormalizedRecord {
    match raw {
        RawRecord::Ticketmaster(event) => normalize_ticketmaster(event),
        RawRecord::GooglePlaces(candidate) => normalize_google_places(candidate),
    }
}

fn normalize_ticketmaster(event: TmEvent) -> NormalizedRecord {
    let dates = event.dates.unwrap_or_default();

    // Venue info comes from the first embedded venue, else stays empty.
    let venue = event
        .embedded
        .and_then(|embedded| embedded.venues.into_iter().next())
        .map(|v| VenueInfo {
            name: v.name,
            address: v.address,
            city: v.city,
            location: v.location,
        })
        .unwrap_or_default();

    NormalizedRecord {
        id: event.id,
        name: event.name.unwrap_or_else(|| "Unknown Event".to_string()),
        source: Source::Ticketmaster,
        kind: RecordKind::Event,
        url: event.url,
        dates: Some(EventDates {
            start: dates.start,
            timezone: dates.timezone,
        }),
        venue,
        rating: None,
        images: event.images,
        price_ranges: event.price_ranges,
        classifications: event.classifications,
        types: Vec::new(),
        note: None,
        search_date: None,
    }
}

fn normalize_google_places(candidate: VenueCandidate) -> NormalizedRecord {
    let name = if candidate.name.is_empty() {
        "Unknown Venue".to_string()
    } else {
        candidate.name
    };

    NormalizedRecord {
        id: candidate.place_id,
        name,
        source: Source::GooglePlaces,
        kind: RecordKind::Venue,
        url: None,
        dates: None,
        venue: candidate.venue,
        rating: candidate.rating,
        images: Vec::new(),
        price_ranges: Vec::new(),
        classifications: Vec::new(),
        types: candidate.types,
        note: Some(candidate.note),
        search_date: candidate.search_date,
    }
}
