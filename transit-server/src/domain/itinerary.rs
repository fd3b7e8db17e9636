//! Itineraries: the results of route search.
//!
//! An itinerary is an ordered list of segments, one per line used.
//! The transfer count is always `segments - 1` (or zero for the
//! degenerate start-equals-end itinerary), and the total stop count is
//! the sum of the per-segment stop counts. Both are computed at
//! construction so they can never drift from the segments.

use super::{Line, LineId, StationId};

/// Error from itinerary construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItineraryError {
    /// Consecutive segments don't meet at a shared station.
    #[error("segment {0} does not start where segment {1} ends")]
    Disconnected(usize, usize),
}

/// One ride along a single line, from one stop to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub line: LineId,
    pub line_name: String,
    pub from: StationId,
    pub to: StationId,
    /// Every station passed, endpoints included, oriented from -> to.
    pub stations: Vec<StationId>,
    /// Number of stops travelled: |pos(to) - pos(from)|.
    pub stops: usize,
}

impl Segment {
    /// Build the segment of `line` spanning `from` to `to`.
    ///
    /// The sub-sequence is oriented from -> to regardless of which
    /// position is numerically larger. Returns `None` when either station
    /// is not on the line.
    pub fn along(line: &Line, from: StationId, to: StationId) -> Option<Self> {
        let i = line.position_of(from)?;
        let j = line.position_of(to)?;

        let stations: Vec<StationId> = if i <= j {
            line.stops[i..=j].to_vec()
        } else {
            line.stops[j..=i].iter().rev().copied().collect()
        };

        Some(Self {
            line: line.id,
            line_name: line.name.clone(),
            from,
            to,
            stations,
            stops: i.abs_diff(j),
        })
    }
}

/// A complete journey plan from a start station to an end station.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    segments: Vec<Segment>,
    transfers: usize,
    total_stops: usize,
}

impl Itinerary {
    /// Build an itinerary from its segments.
    ///
    /// Consecutive segments must chain: each segment starts at the station
    /// where the previous one ended.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, ItineraryError> {
        for (i, pair) in segments.windows(2).enumerate() {
            if pair[0].to != pair[1].from {
                return Err(ItineraryError::Disconnected(i + 1, i));
            }
        }

        let transfers = segments.len().saturating_sub(1);
        let total_stops = segments.iter().map(|s| s.stops).sum();

        Ok(Self {
            segments,
            transfers,
            total_stops,
        })
    }

    /// The degenerate itinerary for a query where start equals end:
    /// no segments, no transfers, no stops.
    pub fn degenerate() -> Self {
        Self {
            segments: Vec::new(),
            transfers: 0,
            total_stops: 0,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn transfers(&self) -> usize {
        self.transfers
    }

    pub fn total_stops(&self) -> usize {
        self.total_stops
    }

    /// Identity used for deduplication: the ordered sequence of
    /// (line, from, to) triples.
    pub fn signature(&self) -> Vec<(LineId, StationId, StationId)> {
        self.segments
            .iter()
            .map(|s| (s.line, s.from, s.to))
            .collect()
    }
}
