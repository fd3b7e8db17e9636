//! Administrative mutation of the network.
//!
//! Every operation validates fully against the in-memory index, then
//! writes to the persistent store, and only after the store acknowledges
//! applies the identical change to the index. A persistence failure
//! therefore never leaves the in-memory model ahead of storage.
//!
//! Line creation writes one line row plus N membership rows; those writes
//! are not atomic against a mid-sequence store failure. Closing that gap
//! needs a store-side transaction, which the `TransitStore` contract does
//! not currently expose.

use chrono::NaiveTime;
use tracing::info;

use crate::domain::{Line, LineId, Station, StationId};
use crate::network::{MAX_LINES_PER_STATION, NetworkIndex};
use crate::store::{LineRecord, MembershipRecord, StationRecord, StoreError, TransitStore};

/// Error from a mutation operation.
///
/// Three families: not-found (a reference did not resolve), validation
/// (the input violates a network invariant), and persistence (the store
/// rejected or could not complete a write). All are reported to the
/// caller, never thrown past it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("station \"{0}\" not found")]
    StationNotFound(String),

    #[error("line \"{0}\" not found")]
    LineNotFound(String),

    #[error("{0} id must be a positive integer")]
    InvalidId(&'static str),

    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error("station id {0} is already in use")]
    DuplicateStationId(StationId),

    #[error("station name \"{0}\" is already in use")]
    DuplicateStationName(String),

    #[error("line id {0} is already in use")]
    DuplicateLineId(LineId),

    #[error("line name \"{0}\" is already in use")]
    DuplicateLineName(String),

    #[error("stop sequence must not be empty")]
    EmptyStops,

    #[error("station {0} appears more than once in the stop sequence")]
    DuplicateStop(StationId),

    #[error("station {0} does not exist")]
    UnknownStation(StationId),

    #[error("station {0} already serves {MAX_LINES_PER_STATION} lines")]
    CapacityExceeded(StationId),

    #[error("station {station} is already on line {line}")]
    AlreadyOnLine { station: StationId, line: LineId },

    #[error("sequence number must be a positive integer")]
    InvalidSequence,

    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

/// Everything needed to create a line.
#[derive(Debug, Clone)]
pub struct LineSpec {
    pub id: u32,
    pub name: String,
    pub direction: String,
    pub first_departure: NaiveTime,
    pub last_departure: NaiveTime,
    pub headway_mins: u32,
    pub stations: Vec<StationId>,
}

/// A full replacement definition for an existing line.
#[derive(Debug, Clone)]
pub struct LineUpdate {
    pub name: String,
    pub direction: String,
    pub first_departure: NaiveTime,
    pub last_departure: NaiveTime,
    pub headway_mins: u32,
    pub stations: Vec<StationId>,
}

/// Membership rows for a stop sequence, numbered 1..=len.
fn renumbered(line_id: LineId, stops: &[StationId]) -> Vec<MembershipRecord> {
    stops
        .iter()
        .enumerate()
        .map(|(i, &station_id)| MembershipRecord {
            line_id,
            station_id,
            sequence_no: (i + 1) as u32,
        })
        .collect()
}

/// The mutation service.
///
/// Holds only the store handle; the index to mutate is passed per call so
/// the caller controls the locking discipline around it.
pub struct Admin<'a, S: TransitStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: TransitStore + ?Sized> Admin<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create a station. Coordinates start unset; the store is free to
    /// backfill them out of band.
    pub fn add_station(
        &self,
        net: &mut NetworkIndex,
        id: u32,
        name: &str,
    ) -> Result<String, MutationError> {
        if id == 0 {
            return Err(MutationError::InvalidId("station"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(MutationError::EmptyName("station"));
        }
        let id = StationId(id);
        if net.station(id).is_some() {
            return Err(MutationError::DuplicateStationId(id));
        }
        if net.stations().any(|s| s.name == name) {
            return Err(MutationError::DuplicateStationName(name.to_string()));
        }

        self.store.insert_station(&StationRecord {
            id,
            name: name.to_string(),
            longitude: None,
            latitude: None,
        })?;
        net.insert_station(Station::new(id, name));

        info!(%id, name, "station added");
        Ok(format!("station {id} \"{name}\" added"))
    }

    /// Rename a station, keeping its coordinates.
    pub fn update_station(
        &self,
        net: &mut NetworkIndex,
        station_ref: &str,
        name: &str,
    ) -> Result<String, MutationError> {
        let id = net
            .resolve_station(station_ref)
            .ok_or_else(|| MutationError::StationNotFound(station_ref.trim().to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(MutationError::EmptyName("station"));
        }
        if net.stations().any(|s| s.name == name && s.id != id) {
            return Err(MutationError::DuplicateStationName(name.to_string()));
        }
        let Some(current) = net.station(id) else {
            return Err(MutationError::StationNotFound(station_ref.trim().to_string()));
        };
        let updated = Station {
            id,
            name: name.to_string(),
            longitude: current.longitude,
            latitude: current.latitude,
        };

        self.store.update_station(&StationRecord {
            id,
            name: updated.name.clone(),
            longitude: updated.longitude,
            latitude: updated.latitude,
        })?;
        net.insert_station(updated);

        info!(%id, name, "station renamed");
        Ok(format!("station {id} renamed to \"{name}\""))
    }

    /// Delete a station, cascading through every line that stops at it.
    pub fn delete_station(
        &self,
        net: &mut NetworkIndex,
        station_ref: &str,
    ) -> Result<String, MutationError> {
        let id = net
            .resolve_station(station_ref)
            .ok_or_else(|| MutationError::StationNotFound(station_ref.trim().to_string()))?;

        self.store.delete_station(id)?;
        // Resolution succeeded, so the station is present.
        let name = net
            .remove_station(id)
            .map(|s| s.name)
            .unwrap_or_default();

        info!(%id, name, "station deleted");
        Ok(format!("station {id} \"{name}\" and its memberships deleted"))
    }

    /// Create a line with its full stop sequence.
    ///
    /// All validation happens before the first store write, so a
    /// validation failure is always all-or-nothing.
    pub fn add_line(
        &self,
        net: &mut NetworkIndex,
        spec: LineSpec,
    ) -> Result<String, MutationError> {
        if spec.id == 0 {
            return Err(MutationError::InvalidId("line"));
        }
        let name = spec.name.trim().to_string();
        if name.is_empty() {
            return Err(MutationError::EmptyName("line"));
        }
        let id = LineId(spec.id);
        if net.line(id).is_some() {
            return Err(MutationError::DuplicateLineId(id));
        }
        if net.lines().any(|l| l.name == name) {
            return Err(MutationError::DuplicateLineName(name));
        }
        if spec.stations.is_empty() {
            return Err(MutationError::EmptyStops);
        }
        for (i, &station) in spec.stations.iter().enumerate() {
            if spec.stations[..i].contains(&station) {
                return Err(MutationError::DuplicateStop(station));
            }
            if net.station(station).is_none() {
                return Err(MutationError::UnknownStation(station));
            }
            if net.line_count_for(station) >= MAX_LINES_PER_STATION {
                return Err(MutationError::CapacityExceeded(station));
            }
        }

        self.store.insert_line(&LineRecord {
            id,
            name: name.clone(),
            direction: spec.direction.clone(),
            first_departure: spec.first_departure,
            last_departure: spec.last_departure,
            headway_mins: spec.headway_mins,
        })?;
        for (i, &station) in spec.stations.iter().enumerate() {
            self.store.insert_membership(&MembershipRecord {
                line_id: id,
                station_id: station,
                sequence_no: (i + 1) as u32,
            })?;
        }

        let stop_count = spec.stations.len();
        net.insert_line(Line {
            id,
            name: name.clone(),
            direction: spec.direction,
            first_departure: spec.first_departure,
            last_departure: spec.last_departure,
            headway_mins: spec.headway_mins,
            stops: spec.stations,
        });

        info!(%id, name, stop_count, "line added");
        Ok(format!("line {id} \"{name}\" added with {stop_count} stops"))
    }

    /// Replace an existing line's definition and stop sequence.
    ///
    /// The stop list is validated like `add_line`'s, except the capacity
    /// check only counts stations the line does not already serve. The
    /// old memberships are rewritten wholesale in storage.
    pub fn update_line(
        &self,
        net: &mut NetworkIndex,
        line_ref: &str,
        update: LineUpdate,
    ) -> Result<String, MutationError> {
        let id = net
            .resolve_line(line_ref)
            .ok_or_else(|| MutationError::LineNotFound(line_ref.trim().to_string()))?;
        let name = update.name.trim().to_string();
        if name.is_empty() {
            return Err(MutationError::EmptyName("line"));
        }
        if net.lines().any(|l| l.name == name && l.id != id) {
            return Err(MutationError::DuplicateLineName(name));
        }
        if update.stations.is_empty() {
            return Err(MutationError::EmptyStops);
        }
        for (i, &station) in update.stations.iter().enumerate() {
            if update.stations[..i].contains(&station) {
                return Err(MutationError::DuplicateStop(station));
            }
            if net.station(station).is_none() {
                return Err(MutationError::UnknownStation(station));
            }
            let already_member = net.line(id).is_some_and(|l| l.contains(station));
            if !already_member && net.line_count_for(station) >= MAX_LINES_PER_STATION {
                return Err(MutationError::CapacityExceeded(station));
            }
        }

        self.store.update_line(&LineRecord {
            id,
            name: name.clone(),
            direction: update.direction.clone(),
            first_departure: update.first_departure,
            last_departure: update.last_departure,
            headway_mins: update.headway_mins,
        })?;
        self.store
            .replace_memberships(id, &renumbered(id, &update.stations))?;

        let stop_count = update.stations.len();
        net.remove_line(id);
        net.insert_line(Line {
            id,
            name: name.clone(),
            direction: update.direction,
            first_departure: update.first_departure,
            last_departure: update.last_departure,
            headway_mins: update.headway_mins,
            stops: update.stations,
        });

        info!(%id, name, stop_count, "line updated");
        Ok(format!("line {id} \"{name}\" updated with {stop_count} stops"))
    }

    /// Delete a line and all its memberships.
    pub fn delete_line(
        &self,
        net: &mut NetworkIndex,
        line_ref: &str,
    ) -> Result<String, MutationError> {
        let id = net
            .resolve_line(line_ref)
            .ok_or_else(|| MutationError::LineNotFound(line_ref.trim().to_string()))?;

        self.store.delete_line(id)?;
        let name = net.remove_line(id).map(|l| l.name).unwrap_or_default();

        info!(%id, name, "line deleted");
        Ok(format!("line {id} \"{name}\" and its memberships deleted"))
    }

    /// Insert a station into an existing line's stop sequence at the
    /// 1-based position, appending when the position is past the end.
    pub fn add_station_to_line(
        &self,
        net: &mut NetworkIndex,
        line_ref: &str,
        station_ref: &str,
        sequence_no: u32,
    ) -> Result<String, MutationError> {
        let line_id = net
            .resolve_line(line_ref)
            .ok_or_else(|| MutationError::LineNotFound(line_ref.trim().to_string()))?;
        let station_id = net
            .resolve_station(station_ref)
            .ok_or_else(|| MutationError::StationNotFound(station_ref.trim().to_string()))?;

        let already_member = net
            .line(line_id)
            .is_some_and(|l| l.contains(station_id));
        if already_member {
            return Err(MutationError::AlreadyOnLine {
                station: station_id,
                line: line_id,
            });
        }
        if net.line_count_for(station_id) >= MAX_LINES_PER_STATION {
            return Err(MutationError::CapacityExceeded(station_id));
        }
        if sequence_no == 0 {
            return Err(MutationError::InvalidSequence);
        }

        // A mid-sequence insert shifts every later stop, so storage gets
        // the line's membership rows rewritten with fresh sequence
        // numbers rather than a single new row.
        let Some(line) = net.line(line_id) else {
            return Err(MutationError::LineNotFound(line_ref.trim().to_string()));
        };
        let mut stops = line.stops.clone();
        let position = (sequence_no as usize - 1).min(stops.len());
        stops.insert(position, station_id);

        self.store
            .replace_memberships(line_id, &renumbered(line_id, &stops))?;
        net.attach_station(line_id, station_id, sequence_no);

        info!(line = %line_id, station = %station_id, sequence_no, "station attached to line");
        Ok(format!(
            "station {station_id} added to line {line_id} at position {sequence_no}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, sample_store};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn loaded(store: &MemoryStore) -> NetworkIndex {
        NetworkIndex::from_snapshot(store.load_snapshot().unwrap()).unwrap()
    }

    fn spec(id: u32, name: &str, stations: &[u32]) -> LineSpec {
        LineSpec {
            id,
            name: name.to_string(),
            direction: "N".to_string(),
            first_departure: t(6, 0),
            last_departure: t(23, 0),
            headway_mins: 10,
            stations: stations.iter().map(|&s| StationId(s)).collect(),
        }
    }

    /// Memory state always matches a fresh load from the store.
    fn assert_in_sync(net: &NetworkIndex, store: &MemoryStore) {
        net.verify_invariants().unwrap();
        let reloaded = loaded(store);
        assert_eq!(net.station_count(), reloaded.station_count());
        assert_eq!(net.line_count(), reloaded.line_count());
        for line in net.lines() {
            assert_eq!(
                line.stops,
                reloaded.line(line.id).unwrap().stops,
                "line {} stops diverge from store",
                line.id
            );
        }
    }

    #[test]
    fn add_station_success_and_duplicates() {
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        admin.add_station(&mut net, 1, "Central").unwrap();
        assert_eq!(net.station(StationId(1)).unwrap().name, "Central");

        assert_eq!(
            admin.add_station(&mut net, 1, "Other"),
            Err(MutationError::DuplicateStationId(StationId(1)))
        );
        assert_eq!(
            admin.add_station(&mut net, 2, "Central"),
            Err(MutationError::DuplicateStationName("Central".to_string()))
        );
        assert_eq!(
            admin.add_station(&mut net, 0, "Zero"),
            Err(MutationError::InvalidId("station"))
        );
        assert_eq!(
            admin.add_station(&mut net, 3, "   "),
            Err(MutationError::EmptyName("station"))
        );
        assert_in_sync(&net, &store);
    }

    #[test]
    fn delete_station_cascades_and_breaks_routes() {
        // Worked example from the testable properties: deleting the
        // shared station disconnects the two lines.
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        admin.add_station(&mut net, 1, "A").unwrap();
        admin.add_station(&mut net, 2, "B").unwrap();
        admin.add_station(&mut net, 3, "C").unwrap();
        admin.add_line(&mut net, spec(100, "L01", &[1, 2])).unwrap();
        admin.add_line(&mut net, spec(200, "L02", &[2, 3])).unwrap();

        let config = crate::planner::SearchConfig::default();
        let routes = crate::planner::Planner::new(&net, &config)
            .find_routes("1", "3", 1)
            .unwrap();
        assert_eq!(routes.len(), 1);

        admin.delete_station(&mut net, "2").unwrap();
        assert!(net.station(StationId(2)).is_none());
        assert_eq!(net.line(LineId(100)).unwrap().stops, vec![StationId(1)]);
        assert_eq!(net.line(LineId(200)).unwrap().stops, vec![StationId(3)]);

        let routes = crate::planner::Planner::new(&net, &config)
            .find_routes("1", "3", 1)
            .unwrap();
        assert!(routes.is_empty());
        assert_in_sync(&net, &store);
    }

    #[test]
    fn delete_station_by_name() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        admin.delete_station(&mut net, "Harbour").unwrap();
        assert!(net.resolve_station("Harbour").is_none());
        assert_in_sync(&net, &store);
    }

    #[test]
    fn delete_station_not_found() {
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        assert_eq!(
            admin.delete_station(&mut net, "ghost"),
            Err(MutationError::StationNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn add_line_validation() {
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        admin.add_station(&mut net, 1, "A").unwrap();
        admin.add_station(&mut net, 2, "B").unwrap();
        admin.add_line(&mut net, spec(100, "L01", &[1, 2])).unwrap();

        assert_eq!(
            admin.add_line(&mut net, spec(100, "Other", &[1])),
            Err(MutationError::DuplicateLineId(LineId(100)))
        );
        assert_eq!(
            admin.add_line(&mut net, spec(300, "L01", &[1])),
            Err(MutationError::DuplicateLineName("L01".to_string()))
        );
        assert_eq!(
            admin.add_line(&mut net, spec(300, "L03", &[])),
            Err(MutationError::EmptyStops)
        );
        assert_eq!(
            admin.add_line(&mut net, spec(300, "L03", &[1, 9])),
            Err(MutationError::UnknownStation(StationId(9)))
        );
        assert_eq!(
            admin.add_line(&mut net, spec(300, "L03", &[1, 2, 1])),
            Err(MutationError::DuplicateStop(StationId(1)))
        );
        assert_eq!(
            admin.add_line(&mut net, spec(0, "L00", &[1])),
            Err(MutationError::InvalidId("line"))
        );
        // Nothing was written for any failed attempt.
        assert_eq!(net.line_count(), 1);
        assert_in_sync(&net, &store);
    }

    #[test]
    fn add_line_rejects_capacity_violation_before_any_write() {
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        admin.add_station(&mut net, 1, "Hub").unwrap();
        admin.add_station(&mut net, 2, "Spoke").unwrap();
        for i in 1..=6u32 {
            admin
                .add_line(&mut net, spec(i * 100, &format!("L{i:02}"), &[1]))
                .unwrap();
        }

        assert_eq!(
            admin.add_line(&mut net, spec(700, "L07", &[2, 1])),
            Err(MutationError::CapacityExceeded(StationId(1)))
        );
        // Validation is all-or-nothing: station 2 gained no line either.
        assert!(net.lines_for(StationId(2)).is_empty());
        assert_eq!(net.line_count(), 6);
        assert_in_sync(&net, &store);
    }

    #[test]
    fn delete_line_prunes_reverse_index() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        admin.delete_line(&mut net, "L02").unwrap();
        assert!(net.resolve_line("L02").is_none());
        assert!(!net.lines_for(StationId(5)).contains(&LineId(200)));
        assert_in_sync(&net, &store);
    }

    #[test]
    fn delete_line_not_found() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        assert_eq!(
            admin.delete_line(&mut net, "L99"),
            Err(MutationError::LineNotFound("L99".to_string()))
        );
    }

    #[test]
    fn add_station_to_line_inserts_and_appends() {
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        admin.add_station(&mut net, 1, "A").unwrap();
        admin.add_station(&mut net, 2, "B").unwrap();
        admin.add_station(&mut net, 3, "C").unwrap();
        admin.add_line(&mut net, spec(100, "L01", &[1, 2])).unwrap();

        admin
            .add_station_to_line(&mut net, "100", "3", 2)
            .unwrap();
        assert_eq!(
            net.line(LineId(100)).unwrap().stops,
            vec![StationId(1), StationId(3), StationId(2)]
        );
        assert!(net.lines_for(StationId(3)).contains(&LineId(100)));
        assert_in_sync(&net, &store);
    }

    #[test]
    fn add_station_to_line_appends_past_end() {
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        admin.add_station(&mut net, 1, "A").unwrap();
        admin.add_station(&mut net, 2, "B").unwrap();
        admin.add_line(&mut net, spec(100, "L01", &[1])).unwrap();

        admin
            .add_station_to_line(&mut net, "L01", "B", 99)
            .unwrap();
        assert_eq!(
            net.line(LineId(100)).unwrap().stops,
            vec![StationId(1), StationId(2)]
        );
        assert_in_sync(&net, &store);
    }

    #[test]
    fn mid_sequence_insert_persists_in_order() {
        // Inserting into the middle of a line shifts every later stop;
        // the store must come back with the same order and distinct,
        // contiguous sequence numbers.
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        admin.add_station(&mut net, 9, "Stadium").unwrap();
        admin
            .add_line(&mut net, spec(500, "L05", &[9, 1, 6]))
            .unwrap();
        admin.add_station_to_line(&mut net, "L05", "8", 2).unwrap();

        let expected = vec![StationId(9), StationId(8), StationId(1), StationId(6)];
        assert_eq!(net.line(LineId(500)).unwrap().stops, expected);

        let reloaded = loaded(&store);
        assert_eq!(reloaded.line(LineId(500)).unwrap().stops, expected);

        let snapshot = store.load_snapshot().unwrap();
        let seqs: Vec<u32> = snapshot
            .memberships
            .iter()
            .filter(|m| m.line_id == LineId(500))
            .map(|m| m.sequence_no)
            .collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn update_station_renames_everywhere() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        admin
            .update_station(&mut net, "Harbour", "Harbour East")
            .unwrap();
        assert_eq!(net.station(StationId(6)).unwrap().name, "Harbour East");
        assert!(net.resolve_station("Harbour East").is_some());

        let reloaded = loaded(&store);
        assert_eq!(reloaded.station(StationId(6)).unwrap().name, "Harbour East");
        assert_in_sync(&net, &store);
    }

    #[test]
    fn update_station_rejections() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        assert_eq!(
            admin.update_station(&mut net, "ghost", "Anything"),
            Err(MutationError::StationNotFound("ghost".to_string()))
        );
        assert_eq!(
            admin.update_station(&mut net, "Harbour", "Museum"),
            Err(MutationError::DuplicateStationName("Museum".to_string()))
        );
        assert_eq!(
            admin.update_station(&mut net, "Harbour", "  "),
            Err(MutationError::EmptyName("station"))
        );
        // Renaming to the current name is a no-op, not a duplicate.
        assert!(admin.update_station(&mut net, "6", "Harbour").is_ok());
        assert_in_sync(&net, &store);
    }

    #[test]
    fn update_line_replaces_definition_and_stops() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        // L03 was 4 -> 6 -> 7.
        let update = LineUpdate {
            name: "L03X".to_string(),
            direction: "SE".to_string(),
            first_departure: t(7, 0),
            last_departure: t(21, 0),
            headway_mins: 5,
            stations: vec![StationId(7), StationId(4)],
        };
        admin.update_line(&mut net, "L03", update).unwrap();

        let line = net.line(LineId(300)).unwrap();
        assert_eq!(line.name, "L03X");
        assert_eq!(line.stops, vec![StationId(7), StationId(4)]);
        assert_eq!(line.headway_mins, 5);
        // Station 6 dropped off the line; the reverse index follows.
        assert!(!net.lines_for(StationId(6)).contains(&LineId(300)));
        assert!(net.lines_for(StationId(7)).contains(&LineId(300)));
        assert_in_sync(&net, &store);
    }

    #[test]
    fn update_line_rejections() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        let update = |name: &str, stations: Vec<u32>| LineUpdate {
            name: name.to_string(),
            direction: "N".to_string(),
            first_departure: t(6, 0),
            last_departure: t(23, 0),
            headway_mins: 10,
            stations: stations.into_iter().map(StationId).collect(),
        };

        assert_eq!(
            admin.update_line(&mut net, "L99", update("X", vec![1])),
            Err(MutationError::LineNotFound("L99".to_string()))
        );
        assert_eq!(
            admin.update_line(&mut net, "L02", update("L01", vec![2, 5])),
            Err(MutationError::DuplicateLineName("L01".to_string()))
        );
        assert_eq!(
            admin.update_line(&mut net, "L02", update("L02", vec![])),
            Err(MutationError::EmptyStops)
        );
        assert_eq!(
            admin.update_line(&mut net, "L02", update("L02", vec![2, 99])),
            Err(MutationError::UnknownStation(StationId(99)))
        );
        assert_eq!(
            admin.update_line(&mut net, "L02", update("L02", vec![2, 5, 2])),
            Err(MutationError::DuplicateStop(StationId(2)))
        );
        // Keeping its own name is fine.
        assert!(admin
            .update_line(&mut net, "L02", update("L02", vec![2, 5]))
            .is_ok());
        assert_in_sync(&net, &store);
    }

    #[test]
    fn update_line_capacity_counts_only_new_stations() {
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        admin.add_station(&mut net, 1, "Hub").unwrap();
        admin.add_station(&mut net, 2, "Other").unwrap();
        for i in 1..=6u32 {
            admin
                .add_line(&mut net, spec(i * 100, &format!("L{i:02}"), &[1]))
                .unwrap();
        }
        admin.add_line(&mut net, spec(700, "L07", &[2])).unwrap();

        // The hub is at the cap, but line 100 already serves it.
        let keep = LineUpdate {
            name: "L01".to_string(),
            direction: "N".to_string(),
            first_departure: t(6, 0),
            last_departure: t(23, 0),
            headway_mins: 10,
            stations: vec![StationId(1), StationId(2)],
        };
        admin.update_line(&mut net, "100", keep).unwrap();

        // A seventh line picking up the hub is still rejected.
        let grab = LineUpdate {
            name: "L07".to_string(),
            direction: "N".to_string(),
            first_departure: t(6, 0),
            last_departure: t(23, 0),
            headway_mins: 10,
            stations: vec![StationId(2), StationId(1)],
        };
        assert_eq!(
            admin.update_line(&mut net, "700", grab),
            Err(MutationError::CapacityExceeded(StationId(1)))
        );
        assert_in_sync(&net, &store);
    }

    #[test]
    fn update_failures_leave_memory_untouched() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        store.set_fail_writes(true);
        let err = admin
            .update_station(&mut net, "Harbour", "Harbour East")
            .unwrap_err();
        assert!(matches!(err, MutationError::Store(_)));
        assert_eq!(net.station(StationId(6)).unwrap().name, "Harbour");

        store.set_fail_writes(false);
        assert_in_sync(&net, &store);
    }

    #[test]
    fn add_station_to_line_rejections() {
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        admin.add_station(&mut net, 1, "A").unwrap();
        admin.add_station(&mut net, 2, "B").unwrap();
        admin.add_line(&mut net, spec(100, "L01", &[1])).unwrap();

        assert_eq!(
            admin.add_station_to_line(&mut net, "999", "2", 1),
            Err(MutationError::LineNotFound("999".to_string()))
        );
        assert_eq!(
            admin.add_station_to_line(&mut net, "100", "ghost", 1),
            Err(MutationError::StationNotFound("ghost".to_string()))
        );
        assert_eq!(
            admin.add_station_to_line(&mut net, "100", "1", 1),
            Err(MutationError::AlreadyOnLine {
                station: StationId(1),
                line: LineId(100),
            })
        );
        assert_eq!(
            admin.add_station_to_line(&mut net, "100", "2", 0),
            Err(MutationError::InvalidSequence)
        );
        assert_in_sync(&net, &store);
    }

    #[test]
    fn capacity_cap_leaves_line_unchanged() {
        // Station at the 6-line cap: attaching it to a seventh line fails
        // and the line's stop sequence is untouched.
        let store = MemoryStore::new();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);
        admin.add_station(&mut net, 1, "Hub").unwrap();
        admin.add_station(&mut net, 2, "Other").unwrap();
        for i in 1..=6u32 {
            admin
                .add_line(&mut net, spec(i * 100, &format!("L{i:02}"), &[1]))
                .unwrap();
        }
        admin.add_line(&mut net, spec(700, "L07", &[2])).unwrap();

        let before = net.line(LineId(700)).unwrap().stops.clone();
        let err = admin
            .add_station_to_line(&mut net, "700", "1", 2)
            .unwrap_err();
        assert_eq!(err, MutationError::CapacityExceeded(StationId(1)));
        assert_eq!(net.line(LineId(700)).unwrap().stops, before);
        assert_in_sync(&net, &store);
    }

    #[test]
    fn store_failure_leaves_memory_untouched() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        store.set_fail_writes(true);
        let stations_before = net.station_count();
        let err = admin.add_station(&mut net, 50, "New Stop").unwrap_err();
        assert!(matches!(err, MutationError::Store(StoreError::Unavailable(_))));
        assert_eq!(net.station_count(), stations_before);

        let err = admin.delete_station(&mut net, "Harbour").unwrap_err();
        assert!(matches!(err, MutationError::Store(_)));
        assert!(net.resolve_station("Harbour").is_some());

        store.set_fail_writes(false);
        assert_in_sync(&net, &store);
    }

    #[test]
    fn store_failure_message_is_surfaced_verbatim() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        store.set_fail_writes(true);
        let err = admin.add_station(&mut net, 50, "New Stop").unwrap_err();
        assert_eq!(
            err.to_string(),
            "persistence failed: store unavailable: write rejected by test switch"
        );
    }

    #[test]
    fn invariants_hold_after_mixed_mutation_sequence() {
        let store = sample_store();
        let mut net = loaded(&store);
        let admin = Admin::new(&store);

        admin.add_station(&mut net, 9, "Stadium").unwrap();
        admin
            .add_line(&mut net, spec(500, "L05", &[9, 1, 6]))
            .unwrap();
        admin.add_station_to_line(&mut net, "L05", "8", 2).unwrap();
        admin.delete_station(&mut net, "Riverside").unwrap();
        admin.delete_line(&mut net, "L02").unwrap();

        assert_in_sync(&net, &store);
    }
}
