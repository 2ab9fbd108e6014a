//! Street label candidates
//!
//! One candidate per street name: the centroid of the longest qualifying
//! segment seen with that name. A candidate is replaced only by a strictly
//! longer segment, so the result does not depend on processing order.

use crate::core_types::Meters;
use crate::grid::GridCell;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Where and how to draw a street name
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelCandidate {
    /// Centroid of the source segment in grid coordinates
    pub cell: GridCell,
    /// Text rotation in degrees; labels are always drawn horizontally
    pub angle_deg: f32,
    /// Length of the segment the label was taken from
    pub length: Meters,
}

/// Longest-segment label per street name
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: FxHashMap<String, LabelCandidate>,
}

impl LabelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate; kept only if it is the first for `name` or strictly
    /// longer than the current one. Returns `true` if it was kept.
    pub fn offer(&mut self, name: &str, candidate: LabelCandidate) -> bool {
        match self.labels.get_mut(name) {
            Some(current) if candidate.length <= current.length => false,
            Some(current) => {
                *current = candidate;
                true
            }
            None => {
                self.labels.insert(name.to_string(), candidate);
                true
            }
        }
    }

    /// Fold another set into this one under the same longest-wins rule
    pub fn merge(&mut self, other: LabelSet) {
        for (name, candidate) in other.labels {
            self.offer(&name, candidate);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LabelCandidate> {
        self.labels.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelCandidate)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Labels long enough to be worth drawing, sorted by name
    #[must_use]
    pub fn displayable(&self, min_length: Meters) -> Vec<(&str, &LabelCandidate)> {
        let mut out: Vec<_> = self.iter().filter(|(_, c)| c.length > min_length).collect();
        out.sort_unstable_by(|a, b| a.0.cmp(b.0));
        out
    }
}
