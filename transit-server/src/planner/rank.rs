//! Itinerary deduplication and ranking.

use std::collections::HashSet;

use crate::domain::Itinerary;

/// Remove itineraries with identical `(line, from, to)` triple sequences,
/// keeping the first occurrence of each signature.
///
/// Two itineraries that visit the same stations via different line paths
/// have different signatures and both survive.
pub fn deduplicate(itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    let mut seen = HashSet::new();
    itineraries
        .into_iter()
        .filter(|it| seen.insert(it.signature()))
        .collect()
}

/// Sort ascending by `(transfers, total stops)`.
///
/// The sort is stable, so ties keep the order in which candidates were
/// generated - which is itself deterministic because the search iterates
/// lines and shared-station sets in ascending-id order.
pub fn rank_itineraries(mut itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    itineraries.sort_by_key(|it| (it.transfers(), it.total_stops()));
    itineraries
}
