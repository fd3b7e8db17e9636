//! Route search over the line-adjacency graph.
//!
//! This module implements the core query the server exists to answer:
//! "how do I get from station A to station B with at most N transfers?"
//!
//! Candidates come from two sources: direct rides on a single line, and
//! depth-first enumeration of simple paths through the graph whose nodes
//! are lines and whose edges are shared stations. Each line path expands
//! into one concrete itinerary per choice of transfer station at every
//! line boundary.

mod config;
mod rank;
mod search;

pub use config::SearchConfig;
pub use rank::{deduplicate, rank_itineraries};
pub use search::{Planner, SearchError};
