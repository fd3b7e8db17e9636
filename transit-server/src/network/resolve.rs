//! Identifier resolution.
//!
//! User-supplied references are loose: a station may be named by its
//! numeric id (possibly as a string) or by a fragment of its name; a line
//! by its numeric id or its exact name. Resolution is deterministic
//! because the index iterates stations and lines in ascending-id order,
//! so "first match" always means the match with the smallest id.

use crate::domain::{LineId, Station, StationId};

use super::NetworkIndex;

impl NetworkIndex {
    /// Resolve a station reference to its canonical id.
    ///
    /// A digit-only reference is treated as an id and resolves only if
    /// that id exists; the id reading takes priority over any name
    /// reading. Anything else is matched case-insensitively as a
    /// substring of station names, smallest id first.
    pub fn resolve_station(&self, query: &str) -> Option<StationId> {
        let q = query.trim();
        if q.is_empty() {
            return None;
        }

        if q.chars().all(|c| c.is_ascii_digit()) {
            let id = StationId(q.parse().ok()?);
            return self.station(id).map(|s| s.id);
        }

        let needle = q.to_lowercase();
        self.stations()
            .find(|s| s.name.to_lowercase().contains(&needle))
            .map(|s| s.id)
    }

    /// All stations matching a reference, for enumeration use-cases.
    ///
    /// An empty query matches everything. A digit-only query returns the
    /// station with that id when it exists, and otherwise falls back to
    /// name matching (a digit can legitimately occur in a station name).
    pub fn search_stations(&self, query: &str) -> Vec<&Station> {
        let q = query.trim();
        if q.is_empty() {
            return self.stations().collect();
        }

        if q.chars().all(|c| c.is_ascii_digit()) {
            if let Some(station) = q.parse().ok().and_then(|id| self.station(StationId(id))) {
                return vec![station];
            }
        }

        let needle = q.to_lowercase();
        self.stations()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Resolve a line reference to its canonical id.
    ///
    /// A digit-only reference is an id lookup; anything else must equal a
    /// line name exactly (no fuzzy matching for lines), first match in
    /// ascending-id order.
    pub fn resolve_line(&self, query: &str) -> Option<LineId> {
        let q = query.trim();
        if q.is_empty() {
            return None;
        }

        if q.chars().all(|c| c.is_ascii_digit()) {
            let id = LineId(q.parse().ok()?);
            return self.line(id).map(|l| l.id);
        }

        self.lines().find(|l| l.name == q).map(|l| l.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LineRecord, MembershipRecord, Snapshot, StationRecord};
    use chrono::NaiveTime;

    fn network() -> NetworkIndex {
        let stations = [
            (1, "Central Station"),
            (2, "Civic Square"),
            (7, "Gate 7 Plaza"),
            (10, "North Central"),
        ];
        let snapshot = Snapshot {
            stations: stations
                .into_iter()
                .map(|(id, name)| StationRecord {
                    id: StationId(id),
                    name: name.to_string(),
                    longitude: None,
                    latitude: None,
                })
                .collect(),
            lines: vec![LineRecord {
                id: LineId(100),
                name: "L01".to_string(),
                direction: "N".to_string(),
                first_departure: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
                last_departure: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
                headway_mins: 10,
            }],
            memberships: vec![
                MembershipRecord {
                    line_id: LineId(100),
                    station_id: StationId(1),
                    sequence_no: 1,
                },
                MembershipRecord {
                    line_id: LineId(100),
                    station_id: StationId(2),
                    sequence_no: 2,
                },
            ],
        };
        NetworkIndex::from_snapshot(snapshot).unwrap()
    }

    #[test]
    fn numeric_reference_is_an_id() {
        let net = network();
        assert_eq!(net.resolve_station("1"), Some(StationId(1)));
        assert_eq!(net.resolve_station(" 10 "), Some(StationId(10)));
        assert_eq!(net.resolve_station("999"), None);
    }

    #[test]
    fn id_reading_beats_name_reading() {
        // "7" is both an id and a substring of "Gate 7 Plaza"; the id wins.
        let net = network();
        assert_eq!(net.resolve_station("7"), Some(StationId(7)));
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let net = network();
        assert_eq!(net.resolve_station("civic"), Some(StationId(2)));
        assert_eq!(net.resolve_station("SQUARE"), Some(StationId(2)));
        assert_eq!(net.resolve_station("nowhere"), None);
    }

    #[test]
    fn first_match_is_smallest_id() {
        // "Central" occurs in station 1 and station 10.
        let net = network();
        assert_eq!(net.resolve_station("Central"), Some(StationId(1)));
    }

    #[test]
    fn empty_reference_resolves_to_nothing() {
        let net = network();
        assert_eq!(net.resolve_station(""), None);
        assert_eq!(net.resolve_station("   "), None);
        assert_eq!(net.resolve_line(""), None);
    }

    #[test]
    fn search_returns_all_matches_in_id_order() {
        let net = network();
        let hits: Vec<StationId> = net
            .search_stations("central")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(hits, vec![StationId(1), StationId(10)]);
    }

    #[test]
    fn search_with_empty_query_lists_everything() {
        let net = network();
        assert_eq!(net.search_stations("").len(), 4);
    }

    #[test]
    fn search_numeric_falls_back_to_names_when_id_is_absent() {
        let net = network();
        // Id 7 exists: exact hit only.
        let hits: Vec<StationId> = net
            .search_stations("7")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(hits, vec![StationId(7)]);

        // Id 77 does not exist and no name contains "77".
        assert!(net.search_stations("77").is_empty());
    }

    #[test]
    fn resolve_line_by_id_or_exact_name() {
        let net = network();
        assert_eq!(net.resolve_line("100"), Some(LineId(100)));
        assert_eq!(net.resolve_line("L01"), Some(LineId(100)));
        // Lines are not fuzzy-matched.
        assert_eq!(net.resolve_line("L0"), None);
        assert_eq!(net.resolve_line("l01"), None);
        assert_eq!(net.resolve_line("999"), None);
    }

    #[test]
    fn oversized_numeric_reference_is_not_found() {
        let net = network();
        assert_eq!(net.resolve_station("99999999999999999999"), None);
    }
}
