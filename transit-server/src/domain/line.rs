//! Line identity and stop sequences.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::StationId;

/// Identifier of a line.
///
/// Like station ids, line ids are positive integers; zero is rejected at
/// the mutation boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LineId(pub u32);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transit line: schedule metadata plus an ordered stop sequence.
///
/// `stops` is the travel order of the line. Position in the vector is the
/// 0-based form of the 1-based sequence number stored by the persistence
/// layer. The order reflects travel order, not ascending station id.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    /// Short direction label (e.g. "N", "inbound").
    pub direction: String,
    /// Time of the first departure of the day.
    pub first_departure: NaiveTime,
    /// Time of the last departure of the day.
    pub last_departure: NaiveTime,
    /// Minutes between consecutive departures.
    pub headway_mins: u32,
    /// Ordered stop sequence.
    pub stops: Vec<StationId>,
}

impl Line {
    /// 0-based position of a station in the stop sequence.
    pub fn position_of(&self, station: StationId) -> Option<usize> {
        self.stops.iter().position(|&s| s == station)
    }

    /// Whether the line calls at the given station.
    pub fn contains(&self, station: StationId) -> bool {
        self.position_of(station).is_some()
    }
}
