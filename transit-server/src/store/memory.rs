//! In-memory store implementation.
//!
//! Backs the demo server and the test suite without needing a database.
//! Tables are plain ordered maps guarded by a mutex; key constraints and
//! cascading deletes mirror what the SQL schema would enforce.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveTime;

use crate::domain::{LineId, StationId};

use super::{LineRecord, MembershipRecord, Snapshot, StationRecord, StoreError, TransitStore};

#[derive(Debug, Default)]
struct Tables {
    stations: BTreeMap<StationId, StationRecord>,
    lines: BTreeMap<LineId, LineRecord>,
    /// Keyed by (line, station): a station appears at most once per line.
    memberships: BTreeMap<(LineId, StationId), MembershipRecord>,
}

/// Mutex-guarded in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `StoreError::Unavailable`.
    ///
    /// Lets tests exercise the persistence-failure path of the mutation
    /// service. Reads are unaffected.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(
                "write rejected by test switch".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A poisoned mutex means a panic mid-write; tests would have
        // already failed, so propagate the panic.
        self.tables.lock().unwrap()
    }
}

impl TransitStore for MemoryStore {
    fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        let tables = self.lock();

        let mut memberships: Vec<MembershipRecord> =
            tables.memberships.values().cloned().collect();
        memberships.sort_by_key(|m| (m.line_id, m.sequence_no));

        Ok(Snapshot {
            stations: tables.stations.values().cloned().collect(),
            lines: tables.lines.values().cloned().collect(),
            memberships,
        })
    }

    fn insert_station(&self, record: &StationRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut tables = self.lock();
        if tables.stations.contains_key(&record.id) {
            return Err(StoreError::DuplicateKey(format!("station {}", record.id)));
        }
        tables.stations.insert(record.id, record.clone());
        Ok(())
    }

    fn update_station(&self, record: &StationRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut tables = self.lock();
        let Some(existing) = tables.stations.get_mut(&record.id) else {
            return Err(StoreError::MissingKey(format!("station {}", record.id)));
        };
        *existing = record.clone();
        Ok(())
    }

    fn delete_station(&self, id: StationId) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut tables = self.lock();
        if tables.stations.remove(&id).is_none() {
            return Err(StoreError::MissingKey(format!("station {id}")));
        }
        tables.memberships.retain(|&(_, sid), _| sid != id);
        Ok(())
    }

    fn insert_line(&self, record: &LineRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut tables = self.lock();
        if tables.lines.contains_key(&record.id) {
            return Err(StoreError::DuplicateKey(format!("line {}", record.id)));
        }
        tables.lines.insert(record.id, record.clone());
        Ok(())
    }

    fn update_line(&self, record: &LineRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut tables = self.lock();
        let Some(existing) = tables.lines.get_mut(&record.id) else {
            return Err(StoreError::MissingKey(format!("line {}", record.id)));
        };
        *existing = record.clone();
        Ok(())
    }

    fn delete_line(&self, id: LineId) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut tables = self.lock();
        if tables.lines.remove(&id).is_none() {
            return Err(StoreError::MissingKey(format!("line {id}")));
        }
        tables.memberships.retain(|&(lid, _), _| lid != id);
        Ok(())
    }

    fn insert_membership(&self, record: &MembershipRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut tables = self.lock();
        if !tables.stations.contains_key(&record.station_id) {
            return Err(StoreError::MissingKey(format!(
                "station {}",
                record.station_id
            )));
        }
        if !tables.lines.contains_key(&record.line_id) {
            return Err(StoreError::MissingKey(format!("line {}", record.line_id)));
        }
        let key = (record.line_id, record.station_id);
        if tables.memberships.contains_key(&key) {
            return Err(StoreError::DuplicateKey(format!(
                "membership ({}, {})",
                record.line_id, record.station_id
            )));
        }
        tables.memberships.insert(key, record.clone());
        Ok(())
    }

    fn replace_memberships(
        &self,
        line: LineId,
        records: &[MembershipRecord],
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut tables = self.lock();
        if !tables.lines.contains_key(&line) {
            return Err(StoreError::MissingKey(format!("line {line}")));
        }
        for record in records {
            if !tables.stations.contains_key(&record.station_id) {
                return Err(StoreError::MissingKey(format!(
                    "station {}",
                    record.station_id
                )));
            }
        }
        tables.memberships.retain(|&(lid, _), _| lid != line);
        for record in records {
            tables
                .memberships
                .insert((line, record.station_id), record.clone());
        }
        Ok(())
    }
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time literal")
}

/// Create a store seeded with a small demo network.
///
/// Four lines over eight stations, connected enough for transfer queries
/// to have interesting answers.
pub fn sample_store() -> MemoryStore {
    let store = MemoryStore::new();

    let stations = [
        (1, "Central Station"),
        (2, "Civic Square"),
        (3, "Museum"),
        (4, "Riverside"),
        (5, "University"),
        (6, "Harbour"),
        (7, "Airport"),
        (8, "Market Street"),
    ];
    for (id, name) in stations {
        store
            .insert_station(&StationRecord {
                id: StationId(id),
                name: name.to_string(),
                longitude: None,
                latitude: None,
            })
            .expect("seed station");
    }

    let lines: [(u32, &str, &str, NaiveTime, NaiveTime, u32, &[u32]); 4] = [
        (100, "L01", "N", t(6, 0), t(23, 0), 10, &[1, 2, 3, 4]),
        (200, "L02", "E", t(5, 30), t(22, 30), 12, &[2, 5, 6]),
        (300, "L03", "S", t(6, 30), t(22, 0), 15, &[4, 6, 7]),
        (400, "L04", "W", t(7, 0), t(21, 0), 20, &[8, 3, 5]),
    ];
    for (id, name, direction, first, last, headway, stops) in lines {
        store
            .insert_line(&LineRecord {
                id: LineId(id),
                name: name.to_string(),
                direction: direction.to_string(),
                first_departure: first,
                last_departure: last,
                headway_mins: headway,
            })
            .expect("seed line");
        for (i, &sid) in stops.iter().enumerate() {
            store
                .insert_membership(&MembershipRecord {
                    line_id: LineId(id),
                    station_id: StationId(sid),
                    sequence_no: (i + 1) as u32,
                })
                .expect("seed membership");
        }
    }

    store
}
