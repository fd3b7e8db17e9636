//! Persistent store boundary.
//!
//! The external store is the authoritative copy of the network; the
//! in-memory index is a read-optimized cache of it. This module defines
//! the contract the core needs from any backing store (SQL, files, RPC -
//! a choice of the surrounding system) together with the plain record
//! types exchanged across that boundary.
//!
//! The mutation service always writes to the store *before* touching the
//! in-memory index, so a store failure can never leave memory ahead of
//! storage.

mod memory;

pub use memory::{MemoryStore, sample_store};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::{LineId, StationId};

/// Error from a store operation.
///
/// The mutation service treats any of these as "persistence failed" and
/// surfaces the message verbatim in the outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A write conflicted with an existing primary key.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A delete or reference targeted a key that does not exist.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// The store could not be reached or rejected the operation outright.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A station row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: StationId,
    pub name: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// A line row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: LineId,
    pub name: String,
    pub direction: String,
    pub first_departure: NaiveTime,
    pub last_departure: NaiveTime,
    pub headway_mins: u32,
}

/// A membership row: one station's position in one line's stop sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub line_id: LineId,
    pub station_id: StationId,
    /// 1-based position within the line.
    pub sequence_no: u32,
}

/// The full network as read from the store at bootstrap.
///
/// `memberships` is ordered by `(line_id, sequence_no)` ascending.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub stations: Vec<StationRecord>,
    pub lines: Vec<LineRecord>,
    pub memberships: Vec<MembershipRecord>,
}

/// Contract the core requires from the persistent store.
///
/// Implementations enforce their own key constraints; deletes cascade to
/// membership rows in storage.
pub trait TransitStore: Send + Sync {
    /// Read the entire network. The core replaces its in-memory state
    /// from the result.
    fn load_snapshot(&self) -> Result<Snapshot, StoreError>;

    fn insert_station(&self, record: &StationRecord) -> Result<(), StoreError>;

    /// Replace an existing station row.
    fn update_station(&self, record: &StationRecord) -> Result<(), StoreError>;

    /// Delete a station and every membership row referencing it.
    fn delete_station(&self, id: StationId) -> Result<(), StoreError>;

    fn insert_line(&self, record: &LineRecord) -> Result<(), StoreError>;

    /// Replace an existing line row. Membership rows are untouched.
    fn update_line(&self, record: &LineRecord) -> Result<(), StoreError>;

    /// Delete a line and every membership row referencing it.
    fn delete_line(&self, id: LineId) -> Result<(), StoreError>;

    fn insert_membership(&self, record: &MembershipRecord) -> Result<(), StoreError>;

    /// Replace a line's membership rows wholesale.
    ///
    /// Any change to a stop sequence that shifts positions goes through
    /// here rather than row-by-row inserts, so sequence numbers in storage
    /// stay distinct and a reload reconstructs exactly the given order.
    fn replace_memberships(
        &self,
        line: LineId,
        records: &[MembershipRecord],
    ) -> Result<(), StoreError>;
}
