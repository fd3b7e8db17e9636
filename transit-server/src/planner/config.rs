//! Search configuration.

/// Configuration parameters for route search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Transfer budget applied when the caller does not supply one.
    pub default_max_transfers: usize,

    /// Cap on the number of concrete transfer-station combinations
    /// expanded per query.
    ///
    /// Step 5 of the search is a full cartesian product of shared-station
    /// options per line path, which degrades combinatorially on dense
    /// networks. When the cap is reached, enumeration stops and the
    /// candidates collected so far are still ranked and returned.
    pub max_combinations: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_transfers: 2,
            max_combinations: 10_000,
        }
    }
}
