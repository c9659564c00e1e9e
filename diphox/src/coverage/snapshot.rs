use ndarray::Array2;
use serde::Serialize;

use crate::phones::Diphone;

/// Frozen export of a [`CoverageAccumulator`](super::CoverageAccumulator).
///
/// Analysis and rendering only ever read this, never the live accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageSnapshot {
    /// Phone labels, in inventory order; rows and columns of `adjacency`
    pub phones: Vec<String>,
    /// Every inventory diphone with its count, in inventory order
    pub counts: Vec<(Diphone, u64)>,
    pub adjacency: Array2<u64>,
    /// Unrecognised diphones, most frequent first
    pub bad: Vec<(Diphone, u64)>,
    pub records: usize,
}

impl CoverageSnapshot {
    /// Number of inventory diphones seen at least once.
    pub fn covered(&self) -> usize {
        self.counts.iter().filter(|(_, c)| *c > 0).count()
    }

    pub fn inventory_size(&self) -> usize {
        self.counts.len()
    }

    pub fn total_occurrences(&self) -> u64 {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn bad_occurrences(&self) -> u64 {
        self.bad.iter().map(|(_, c)| c).sum()
    }

    pub fn summary(&self) -> CoverageSummary {
        CoverageSummary {
            records: self.records,
            inventory: self.inventory_size(),
            covered: self.covered(),
            missing: self.inventory_size() - self.covered(),
            coverage: if self.counts.is_empty() {
                0.0
            } else {
                self.covered() as f64 / self.inventory_size() as f64
            },
            occurrences: self.total_occurrences(),
            bad_diphones: self.bad.len(),
            bad_occurrences: self.bad_occurrences(),
        }
    }
}

/// Headline numbers of a snapshot, for reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub records: usize,
    pub inventory: usize,
    pub covered: usize,
    pub missing: usize,
    pub coverage: f64,
    pub occurrences: u64,
    pub bad_diphones: usize,
    pub bad_occurrences: u64,
}
