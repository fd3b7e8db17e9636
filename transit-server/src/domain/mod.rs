//! Domain types for the transit network.
//!
//! This module contains the core model types that represent validated
//! network data: stations, lines with their ordered stop sequences, and
//! the itineraries produced by route search. Types enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod itinerary;
mod line;
mod station;

pub use itinerary::{Itinerary, ItineraryError, Segment};
pub use line::{Line, LineId};
pub use station::{Station, StationId};
