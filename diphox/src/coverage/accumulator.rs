use std::collections::HashMap;

use ndarray::Array2;
use tracing::{debug, info};

use crate::corpus::TokenRecord;
use crate::coverage::snapshot::CoverageSnapshot;
use crate::error::{DiphoneError, Result};
use crate::phones::{Diphone, PhoneInventory};
use crate::utils::parallel::parallel_map;

/// Running diphone counts over an ingested corpus.
///
/// Every inventory diphone starts at zero and the set of counted keys never
/// grows. Diphones outside the inventory go to a separate "bad" table, so a
/// diphone is either known (possibly rare) or not in the vocabulary at all.
/// The phone×phone adjacency matrix is allocated up front and updated in
/// lock-step with the counts.
#[derive(Debug, Clone)]
pub struct CoverageAccumulator<'a> {
    inventory: &'a PhoneInventory,
    counts: Vec<u64>,
    // (row, col) in the adjacency matrix for each inventory diphone
    cells: Vec<(usize, usize)>,
    adjacency: Array2<u64>,
    bad: HashMap<Diphone, u64>,
    records: usize,
}

impl<'a> CoverageAccumulator<'a> {
    pub fn new(inventory: &'a PhoneInventory) -> Self {
        let cells = inventory
            .enumerate_diphones()
            .iter()
            .map(|d| {
                // inventory loading guarantees both phones are in the alphabet
                let row = inventory.phone_index(&d.first).unwrap_or_default();
                let col = inventory.phone_index(&d.second).unwrap_or_default();
                (row, col)
            })
            .collect();
        let phones = inventory.phonemes().len();

        Self {
            inventory,
            counts: vec![0; inventory.len()],
            cells,
            adjacency: Array2::zeros((phones, phones)),
            bad: HashMap::new(),
            records: 0,
        }
    }

    /// Counts every token-level diphone of `record`, cross-word ones included.
    pub fn ingest(&mut self, record: &TokenRecord) {
        for diphone in record.diphones() {
            self.count_diphone(diphone);
        }
        self.records += 1;
    }

    pub fn ingest_all<'r>(&mut self, records: impl IntoIterator<Item = &'r TokenRecord>) {
        for record in records {
            self.ingest(record);
        }
    }

    fn count_diphone(&mut self, diphone: Diphone) {
        match self.inventory.diphone_index(&diphone) {
            Some(idx) => {
                let cell = self.cells[idx];
                self.counts[idx] += 1;
                self.adjacency[cell] += 1;
            }
            None => *self.bad.entry(diphone).or_insert(0) += 1,
        }
    }

    /// Adds the counts of `other` into `self`, key by key.
    ///
    /// Both accumulators must have been built over the same inventory.
    pub fn merge(&mut self, other: CoverageAccumulator<'a>) -> Result<()> {
        if !std::ptr::eq(self.inventory, other.inventory) {
            return Err(DiphoneError::configuration(
                "cannot merge coverage built over different inventories",
            ));
        }
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            *mine += theirs;
        }
        self.adjacency += &other.adjacency;
        for (diphone, count) in other.bad {
            *self.bad.entry(diphone).or_insert(0) += count;
        }
        self.records += other.records;
        Ok(())
    }

    /// Ingests `records` on `workers` threads. Each worker fills its own
    /// accumulator over a contiguous partition; the partials are summed at
    /// the end.
    pub fn ingest_parallel(
        inventory: &'a PhoneInventory,
        records: &[TokenRecord],
        workers: usize,
    ) -> Result<Self> {
        let workers = workers.max(1);
        let chunk = records.len().div_ceil(workers).max(1);
        let partitions: Vec<&[TokenRecord]> = records.chunks(chunk).collect();
        debug!(partitions = partitions.len(), "ingesting corpus in parallel");

        let partials = parallel_map(&partitions, workers, |part| {
            let mut acc = CoverageAccumulator::new(inventory);
            acc.ingest_all(part.iter());
            Ok::<_, DiphoneError>(acc)
        });

        let mut total = CoverageAccumulator::new(inventory);
        for partial in partials {
            total.merge(partial?)?;
        }
        info!(
            records = total.records,
            covered = total.covered(),
            inventory = inventory.len(),
            "corpus ingested"
        );
        Ok(total)
    }

    /// Occurrences of `diphone`; zero for anything outside the inventory.
    pub fn count(&self, diphone: &Diphone) -> u64 {
        self.inventory
            .diphone_index(diphone)
            .map(|idx| self.counts[idx])
            .unwrap_or(0)
    }

    /// Occurrences of a diphone the inventory does not recognise.
    pub fn bad_count(&self, diphone: &Diphone) -> u64 {
        self.bad.get(diphone).copied().unwrap_or(0)
    }

    /// Adjacency cell for `first` followed by `second`, zero when either
    /// phone is unknown.
    pub fn adjacency(&self, first: &str, second: &str) -> u64 {
        match (
            self.inventory.phone_index(first),
            self.inventory.phone_index(second),
        ) {
            (Some(row), Some(col)) => self.adjacency[(row, col)],
            _ => 0,
        }
    }

    fn covered(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn records_ingested(&self) -> usize {
        self.records
    }

    /// Freezes the current state into an owned export.
    pub fn snapshot(&self) -> CoverageSnapshot {
        let counts = self
            .inventory
            .enumerate_diphones()
            .iter()
            .cloned()
            .zip(self.counts.iter().copied())
            .collect();

        let mut bad: Vec<(Diphone, u64)> =
            self.bad.iter().map(|(d, c)| (d.clone(), *c)).collect();
        bad.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        CoverageSnapshot {
            phones: self.inventory.phonemes().to_vec(),
            counts,
            adjacency: self.adjacency.clone(),
            bad,
            records: self.records,
        }
    }
}
