use std::collections::HashMap;

use crate::corpus::TokenRecord;
use crate::phones::{extract_word, Diphone, PhoneInventory};

/// Corpus-wide diphone frequencies, the first pass of rarity scoring.
///
/// Seeded with every ordered pair of distinct phones in the alphabet, which
/// is wider than the curated coverage inventory. Diphones observed outside
/// that closure (repeated phones, unknown symbols) are tallied too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<Diphone, u64>,
}

impl FrequencyTable {
    /// Counts word-level diphones of every phone string of every record,
    /// duplicates included. Word boundaries are never crossed here.
    pub fn build<'r>(
        inventory: &PhoneInventory,
        records: impl IntoIterator<Item = &'r TokenRecord>,
    ) -> Self {
        let mut counts: HashMap<Diphone, u64> =
            inventory.ordered_pair_closure().map(|d| (d, 0)).collect();

        for record in records {
            for phone_string in &record.phone_strings {
                for diphone in extract_word(phone_string) {
                    *counts.entry(diphone).or_insert(0) += 1;
                }
            }
        }
        Self { counts }
    }

    pub fn from_counts<I, D>(counts: I) -> Self
    where
        I: IntoIterator<Item = (D, u64)>,
        D: Into<Diphone>,
    {
        Self {
            counts: counts.into_iter().map(|(d, c)| (d.into(), c)).collect(),
        }
    }

    /// Frequency of `diphone`; `None` if it was never part of the table.
    pub fn get(&self, diphone: &Diphone) -> Option<u64> {
        self.counts.get(diphone).copied()
    }

    /// Number of distinct diphones in the table, zero counts included.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total diphone occurrences counted.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Diphones with a non-zero count.
    pub fn observed(&self) -> usize {
        self.counts.values().filter(|&&c| c > 0).count()
    }
}
