//! Station/line maps and the derived reverse index.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::domain::{Line, LineId, Station, StationId};
use crate::store::Snapshot;

/// A station belongs to at most this many lines.
pub const MAX_LINES_PER_STATION: usize = 6;

/// Error from building an index out of a store snapshot.
///
/// Bulk load is full-replace and fails loudly: a snapshot that violates
/// any network invariant is rejected outright rather than loaded with
/// offending rows skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("duplicate station id {0}")]
    DuplicateStationId(StationId),

    #[error("duplicate station name \"{0}\"")]
    DuplicateStationName(String),

    #[error("duplicate line id {0}")]
    DuplicateLineId(LineId),

    #[error("duplicate line name \"{0}\"")]
    DuplicateLineName(String),

    #[error("membership references unknown line {0}")]
    UnknownLine(LineId),

    #[error("line {line} references unknown station {station}")]
    UnknownStation { line: LineId, station: StationId },

    #[error("line {line} lists station {station} more than once")]
    DuplicateStop { line: LineId, station: StationId },

    #[error("station {0} belongs to more than {MAX_LINES_PER_STATION} lines")]
    CapacityExceeded(StationId),
}

/// The in-memory model of the whole network.
///
/// The reverse index is maintained incrementally by the mutation
/// primitives below; every mutation path updates the forward and reverse
/// structures together, so the reverse index always equals what a scan of
/// all lines' stop sequences would reconstruct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkIndex {
    stations: BTreeMap<StationId, Station>,
    lines: BTreeMap<LineId, Line>,
    lines_by_station: BTreeMap<StationId, BTreeSet<LineId>>,
}

impl NetworkIndex {
    /// Build an index from a store snapshot, validating every invariant.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        let mut index = Self::default();

        let mut station_names = BTreeSet::new();
        for record in snapshot.stations {
            if index.stations.contains_key(&record.id) {
                return Err(SnapshotError::DuplicateStationId(record.id));
            }
            if !station_names.insert(record.name.clone()) {
                return Err(SnapshotError::DuplicateStationName(record.name));
            }
            index.stations.insert(
                record.id,
                Station {
                    id: record.id,
                    name: record.name,
                    longitude: record.longitude,
                    latitude: record.latitude,
                },
            );
        }

        let mut line_names = BTreeSet::new();
        for record in snapshot.lines {
            if index.lines.contains_key(&record.id) {
                return Err(SnapshotError::DuplicateLineId(record.id));
            }
            if !line_names.insert(record.name.clone()) {
                return Err(SnapshotError::DuplicateLineName(record.name));
            }
            index.lines.insert(
                record.id,
                Line {
                    id: record.id,
                    name: record.name,
                    direction: record.direction,
                    first_departure: record.first_departure,
                    last_departure: record.last_departure,
                    headway_mins: record.headway_mins,
                    stops: Vec::new(),
                },
            );
        }

        // Memberships are expected ordered by (line, sequence) but sorting
        // here keeps stop order right even if the store is sloppy.
        let mut memberships = snapshot.memberships;
        memberships.sort_by_key(|m| (m.line_id, m.sequence_no));

        for record in memberships {
            if !index.stations.contains_key(&record.station_id) {
                return Err(SnapshotError::UnknownStation {
                    line: record.line_id,
                    station: record.station_id,
                });
            }
            let Some(line) = index.lines.get_mut(&record.line_id) else {
                return Err(SnapshotError::UnknownLine(record.line_id));
            };
            if line.stops.contains(&record.station_id) {
                return Err(SnapshotError::DuplicateStop {
                    line: record.line_id,
                    station: record.station_id,
                });
            }
            line.stops.push(record.station_id);

            let serving = index
                .lines_by_station
                .entry(record.station_id)
                .or_default();
            serving.insert(record.line_id);
            if serving.len() > MAX_LINES_PER_STATION {
                return Err(SnapshotError::CapacityExceeded(record.station_id));
            }
        }

        debug!(
            stations = index.stations.len(),
            lines = index.lines.len(),
            "network index loaded from snapshot"
        );
        Ok(index)
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(&id)
    }

    /// All stations in ascending-id order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    /// All lines in ascending-id order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Ids of the lines serving a station, ascending. Empty when the
    /// station is unknown or serves no line.
    pub fn lines_for(&self, station: StationId) -> Vec<LineId> {
        self.lines_by_station
            .get(&station)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of lines currently serving a station.
    pub fn line_count_for(&self, station: StationId) -> usize {
        self.lines_by_station
            .get(&station)
            .map_or(0, BTreeSet::len)
    }

    // ---- Mutation primitives -------------------------------------------
    //
    // These assume the admin service has already validated the operation.
    // Each one updates the forward maps and the reverse index together.

    pub(crate) fn insert_station(&mut self, station: Station) {
        self.stations.insert(station.id, station);
    }

    /// Remove a station, cascading through every line's stop sequence and
    /// the reverse index. Returns the removed station.
    pub(crate) fn remove_station(&mut self, id: StationId) -> Option<Station> {
        let station = self.stations.remove(&id)?;
        if let Some(serving) = self.lines_by_station.remove(&id) {
            for line_id in serving {
                if let Some(line) = self.lines.get_mut(&line_id) {
                    line.stops.retain(|&s| s != id);
                }
            }
        }
        Some(station)
    }

    pub(crate) fn insert_line(&mut self, line: Line) {
        for &stop in &line.stops {
            self.lines_by_station.entry(stop).or_default().insert(line.id);
        }
        self.lines.insert(line.id, line);
    }

    /// Remove a line and prune the reverse index for every former member.
    pub(crate) fn remove_line(&mut self, id: LineId) -> Option<Line> {
        let line = self.lines.remove(&id)?;
        for &stop in &line.stops {
            if let Some(serving) = self.lines_by_station.get_mut(&stop) {
                serving.remove(&id);
                if serving.is_empty() {
                    self.lines_by_station.remove(&stop);
                }
            }
        }
        Some(line)
    }

    /// Insert a station into a line's stop sequence at the 1-based
    /// position, appending when the position is past the end.
    pub(crate) fn attach_station(
        &mut self,
        line_id: LineId,
        station: StationId,
        sequence_no: u32,
    ) {
        let Some(line) = self.lines.get_mut(&line_id) else {
            debug_assert!(false, "attach_station on unknown line");
            return;
        };
        let position = (sequence_no as usize - 1).min(line.stops.len());
        line.stops.insert(position, station);
        self.lines_by_station
            .entry(station)
            .or_default()
            .insert(line_id);
    }

    /// Recompute the reverse index from the forward structure and check
    /// every invariant. Test support.
    #[cfg(test)]
    pub(crate) fn verify_invariants(&self) -> Result<(), String> {
        let mut names = BTreeSet::new();
        for station in self.stations.values() {
            if !names.insert(&station.name) {
                return Err(format!("duplicate station name {}", station.name));
            }
        }
        let mut line_names = BTreeSet::new();
        for line in self.lines.values() {
            if !line_names.insert(&line.name) {
                return Err(format!("duplicate line name {}", line.name));
            }
            let unique: BTreeSet<_> = line.stops.iter().collect();
            if unique.len() != line.stops.len() {
                return Err(format!("line {} has a duplicate stop", line.id));
            }
            for stop in &line.stops {
                if !self.stations.contains_key(stop) {
                    return Err(format!("line {} references unknown station {stop}", line.id));
                }
            }
        }

        let mut rebuilt: BTreeMap<StationId, BTreeSet<LineId>> = BTreeMap::new();
        for line in self.lines.values() {
            for &stop in &line.stops {
                rebuilt.entry(stop).or_default().insert(line.id);
            }
        }
        if rebuilt != self.lines_by_station {
            return Err("reverse index does not match forward structure".to_string());
        }
        for (station, serving) in &rebuilt {
            if serving.len() > MAX_LINES_PER_STATION {
                return Err(format!("station {station} exceeds the line cap"));
            }
        }
        Ok(())
    }
}
