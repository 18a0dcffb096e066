//! Counts of records removed by a cascading delete.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Number of records removed per kind by one delete operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeSummary {
    /// Endpoints removed.
    pub endpoints: usize,
    /// Algorithms removed.
    pub algorithms: usize,
    /// Algorithm statuses removed.
    pub statuses: usize,
    /// Inference requests removed.
    pub requests: usize,
}

impl CascadeSummary {
    /// Returns the total number of removed records.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.endpoints + self.algorithms + self.statuses + self.requests
    }
}

impl AddAssign for CascadeSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.endpoints += rhs.endpoints;
        self.algorithms += rhs.algorithms;
        self.statuses += rhs.statuses;
        self.requests += rhs.requests;
    }
}
