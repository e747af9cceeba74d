//! Response-time aggregation
//!
//! Pure projections of reaction tuples into delay tables. Every tuple
//! contributes exactly one row to each table.

use crate::types::{ReactionTuple, ResponseRow, ResponseTimes};

/// Delay between each follower and the vehicle directly ahead
pub fn leader_follower_deltas(tuple: &ReactionTuple) -> ResponseRow {
    let t = tuple.instants();
    ResponseRow(std::array::from_fn(|i| t[i + 1] - t[i]))
}

/// Delay between each follower and the leader
pub fn head_follower_deltas(tuple: &ReactionTuple) -> ResponseRow {
    let t = tuple.instants();
    ResponseRow(std::array::from_fn(|i| t[i + 1] - t[0]))
}

impl ResponseTimes {
    /// Build both tables from a list of reaction tuples
    pub fn from_tuples(tuples: &[ReactionTuple]) -> Self {
        Self {
            leader_follower: tuples.iter().map(leader_follower_deltas).collect(),
            head_follower: tuples.iter().map(head_follower_deltas).collect(),
        }
    }
}
