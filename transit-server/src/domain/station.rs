//! Station identity and attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a station.
///
/// Station ids are positive integers assigned by the network operator.
/// Zero is rejected at the mutation boundary, not here, so that ids read
/// from the authoritative store round-trip unchanged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single stop in the network.
///
/// Names are unique across all stations; coordinates are optional because
/// historical rows in the store may predate geocoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl Station {
    /// Create a station without coordinates.
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            longitude: None,
            latitude: None,
        }
    }
}
