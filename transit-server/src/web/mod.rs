//! HTTP layer: router, handlers, wire types, and shared state.

mod dto;
mod routes;
mod state;

pub use dto::{ItineraryDto, LineDto, MutationOutcome, SegmentDto, StationDto};
pub use routes::router;
pub use state::AppState;
