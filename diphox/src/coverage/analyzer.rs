use std::collections::HashSet;

use crate::corpus::PronunciationDictionary;
use crate::coverage::snapshot::CoverageSnapshot;
use crate::phones::{extract_word, Diphone};

/// Missing diphones split by whether an external dictionary could fill them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReference {
    /// Missing from the corpus but present in the dictionary
    pub in_dictionary: Vec<Diphone>,
    /// Missing from both
    pub nowhere: Vec<Diphone>,
}

/// Read-only queries over a coverage snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CoverageAnalyzer<'s> {
    snapshot: &'s CoverageSnapshot,
}

impl<'s> CoverageAnalyzer<'s> {
    pub fn new(snapshot: &'s CoverageSnapshot) -> Self {
        Self { snapshot }
    }

    /// Fraction of inventory diphones seen at least once, in `[0, 1]`.
    pub fn coverage_ratio(&self) -> f64 {
        if self.snapshot.counts.is_empty() {
            return 0.0;
        }
        self.snapshot.covered() as f64 / self.snapshot.inventory_size() as f64
    }

    /// Inventory diphones never seen, in inventory order.
    pub fn missing_diphones(&self) -> Vec<Diphone> {
        self.filter_counts(|c| c == 0)
    }

    /// Inventory diphones seen at least once, in inventory order.
    pub fn covered_diphones(&self) -> Vec<Diphone> {
        self.filter_counts(|c| c > 0)
    }

    fn filter_counts(&self, keep: impl Fn(u64) -> bool) -> Vec<Diphone> {
        self.snapshot
            .counts
            .iter()
            .filter(|(_, c)| keep(*c))
            .map(|(d, _)| d.clone())
            .collect()
    }

    /// Inventory diphones by descending count; ties keep inventory order.
    pub fn ranked_counts(&self) -> Vec<(Diphone, u64)> {
        let mut ranked = self.snapshot.counts.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Splits [`missing_diphones`](Self::missing_diphones) by whether any
    /// dictionary pronunciation contains them. Only membership matters, and
    /// each dictionary entry is treated as a single word.
    pub fn cross_reference(&self, dictionary: &PronunciationDictionary) -> CrossReference {
        let known: HashSet<Diphone> = dictionary
            .entries
            .iter()
            .flat_map(|(_, phones)| extract_word(phones))
            .collect();

        let (in_dictionary, nowhere): (Vec<Diphone>, Vec<Diphone>) = self
            .missing_diphones()
            .into_iter()
            .partition(|d| known.contains(d));

        CrossReference {
            in_dictionary,
            nowhere,
        }
    }
}
