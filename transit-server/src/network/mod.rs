//! The in-memory network index.
//!
//! Holds the station and line maps plus the derived station-to-lines
//! reverse index. Populated wholesale from a store snapshot at bootstrap
//! and mutated incrementally by the admin service afterwards; the
//! resolver and the route planner only ever read it.
//!
//! All containers are ordered (`BTreeMap`/`BTreeSet`) so that every
//! iteration that feeds resolver first-match choice or search candidate
//! generation is ascending-by-id and therefore reproducible.

mod index;
mod resolve;

pub use index::{MAX_LINES_PER_STATION, NetworkIndex, SnapshotError};
