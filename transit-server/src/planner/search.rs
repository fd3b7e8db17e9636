//! Multi-transfer route search.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::domain::{Itinerary, LineId, Segment, StationId};
use crate::network::NetworkIndex;

use super::config::SearchConfig;
use super::rank::{deduplicate, rank_itineraries};

/// Error from route search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The start or end reference did not resolve to a station.
    #[error("station \"{0}\" not found")]
    StationNotFound(String),
}

/// Counts down the transfer-station combinations a query may expand.
struct Budget {
    remaining: usize,
}

impl Budget {
    fn take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Route planner over a network index.
///
/// Pure in-memory computation; never blocks.
pub struct Planner<'a> {
    network: &'a NetworkIndex,
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    pub fn new(network: &'a NetworkIndex, config: &'a SearchConfig) -> Self {
        Self { network, config }
    }

    /// Find itineraries from `start_ref` to `end_ref` using at most
    /// `max_transfers` transfers, ranked by (transfers, total stops).
    ///
    /// An empty result means no itinerary exists within the budget.
    pub fn find_routes(
        &self,
        start_ref: &str,
        end_ref: &str,
        max_transfers: usize,
    ) -> Result<Vec<Itinerary>, SearchError> {
        let start = self
            .network
            .resolve_station(start_ref)
            .ok_or_else(|| SearchError::StationNotFound(start_ref.trim().to_string()))?;
        let end = self
            .network
            .resolve_station(end_ref)
            .ok_or_else(|| SearchError::StationNotFound(end_ref.trim().to_string()))?;

        // Degenerate but valid: you are already there.
        if start == end {
            return Ok(vec![Itinerary::degenerate()]);
        }

        let mut candidates = Vec::new();
        self.direct_candidates(start, end, &mut candidates);
        if max_transfers >= 1 {
            self.transfer_candidates(start, end, max_transfers, &mut candidates);
        }

        let ranked = rank_itineraries(deduplicate(candidates));
        debug!(
            start = %start,
            end = %end,
            max_transfers,
            results = ranked.len(),
            "route search complete"
        );
        Ok(ranked)
    }

    /// One candidate per line whose stop sequence contains both stations.
    fn direct_candidates(&self, start: StationId, end: StationId, out: &mut Vec<Itinerary>) {
        for line in self.network.lines() {
            if !(line.contains(start) && line.contains(end)) {
                continue;
            }
            if let Some(segment) = Segment::along(line, start, end) {
                if let Ok(itinerary) = Itinerary::from_segments(vec![segment]) {
                    out.push(itinerary);
                }
            }
        }
    }

    /// Enumerate line paths of length 2..=max_transfers+1 and expand each
    /// into concrete itineraries.
    fn transfer_candidates(
        &self,
        start: StationId,
        end: StationId,
        max_transfers: usize,
        out: &mut Vec<Itinerary>,
    ) {
        let start_lines = self.network.lines_for(start);
        let end_lines: BTreeSet<LineId> = self.network.lines_for(end).into_iter().collect();
        if start_lines.is_empty() || end_lines.is_empty() {
            return;
        }

        let mut budget = Budget {
            remaining: self.config.max_combinations,
        };

        for path_len in 2..=max_transfers + 1 {
            for &first in &start_lines {
                let mut path = vec![first];
                self.extend_path(&mut path, path_len, start, end, &end_lines, &mut budget, out);
                if budget.is_exhausted() {
                    debug!(
                        cap = self.config.max_combinations,
                        "combination cap reached; returning candidates collected so far"
                    );
                    return;
                }
            }
        }
    }

    /// Depth-first extension of a simple path through the line graph.
    #[allow(clippy::too_many_arguments)]
    fn extend_path(
        &self,
        path: &mut Vec<LineId>,
        path_len: usize,
        start: StationId,
        end: StationId,
        end_lines: &BTreeSet<LineId>,
        budget: &mut Budget,
        out: &mut Vec<Itinerary>,
    ) {
        let Some(&last) = path.last() else {
            return;
        };

        if path.len() == path_len {
            if end_lines.contains(&last) {
                self.expand_combinations(path, start, end, budget, out);
            }
            return;
        }

        let Some(line) = self.network.line(last) else {
            return;
        };

        // Neighbours: every line sharing at least one station with the
        // current last line, visited in ascending-id order.
        let mut neighbours: BTreeSet<LineId> = BTreeSet::new();
        for &stop in &line.stops {
            neighbours.extend(self.network.lines_for(stop));
        }

        for next in neighbours {
            if path.contains(&next) {
                continue;
            }
            path.push(next);
            self.extend_path(path, path_len, start, end, end_lines, budget, out);
            path.pop();
            if budget.is_exhausted() {
                return;
            }
        }
    }

    /// Expand an accepted line path into one itinerary per choice of
    /// transfer station at every boundary between consecutive lines.
    fn expand_combinations(
        &self,
        path: &[LineId],
        start: StationId,
        end: StationId,
        budget: &mut Budget,
        out: &mut Vec<Itinerary>,
    ) {
        let mut boundaries: Vec<Vec<StationId>> = Vec::with_capacity(path.len() - 1);
        for pair in path.windows(2) {
            let shared = self.shared_stations(pair[0], pair[1]);
            if shared.is_empty() {
                // Adjacency implied a shared station; stale path otherwise.
                return;
            }
            boundaries.push(shared);
        }

        trace!(?path, combinations = boundaries.iter().map(Vec::len).product::<usize>(), "expanding line path");

        // Walk the cartesian product with a mixed-radix counter, the last
        // boundary varying fastest.
        let mut counters = vec![0usize; boundaries.len()];
        loop {
            if !budget.take() {
                return;
            }

            let transfer_points: Vec<StationId> = counters
                .iter()
                .zip(&boundaries)
                .map(|(&i, boundary)| boundary[i])
                .collect();
            if let Some(itinerary) = self.build_itinerary(path, start, end, &transfer_points) {
                out.push(itinerary);
            }

            let mut i = boundaries.len();
            loop {
                if i == 0 {
                    return;
                }
                i -= 1;
                counters[i] += 1;
                if counters[i] < boundaries[i].len() {
                    break;
                }
                counters[i] = 0;
            }
        }
    }

    /// Stations common to both lines' stop sequences, ascending by id.
    fn shared_stations(&self, a: LineId, b: LineId) -> Vec<StationId> {
        let (Some(line_a), Some(line_b)) = (self.network.line(a), self.network.line(b)) else {
            return Vec::new();
        };
        let stops_b: BTreeSet<StationId> = line_b.stops.iter().copied().collect();
        let mut shared: Vec<StationId> = line_a
            .stops
            .iter()
            .copied()
            .filter(|s| stops_b.contains(s))
            .collect();
        shared.sort();
        shared
    }

    /// Build one concrete itinerary for a line path and a choice of
    /// transfer points. `None` when any required stop position cannot be
    /// found in its line's sequence.
    fn build_itinerary(
        &self,
        path: &[LineId],
        start: StationId,
        end: StationId,
        transfer_points: &[StationId],
    ) -> Option<Itinerary> {
        let mut points = Vec::with_capacity(path.len() + 1);
        points.push(start);
        points.extend_from_slice(transfer_points);
        points.push(end);

        let mut segments = Vec::with_capacity(path.len());
        for (i, &line_id) in path.iter().enumerate() {
            let line = self.network.line(line_id)?;
            segments.push(Segment::along(line, points[i], points[i + 1])?);
        }
        Itinerary::from_segments(segments).ok()
    }
}
