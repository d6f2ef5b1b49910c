//! Dataset merger: concatenate per-source collections, stamp the period key
//! and classify the result.

use ledgerflow_core::{Source, Transaction, YearMonth};
use std::collections::BTreeMap;

use crate::classifier::Classifier;

/// Parsed transactions grouped by the platform they came from
#[derive(Debug, Clone, Default)]
pub struct SourceBatches {
    batches: BTreeMap<Source, Vec<Transaction>>,
}

impl SourceBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch; repeated sources are concatenated.
    pub fn push(&mut self, source: Source, txns: Vec<Transaction>) {
        self.batches.entry(source).or_default().extend(txns);
    }

    pub fn total(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }
}

/// Merge all batches into one classified collection.
pub fn merge_sources(batches: SourceBatches, classifier: &Classifier) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = batches.batches.into_values().flatten().collect();
    for txn in merged.iter_mut() {
        txn.month = Some(YearMonth::from(txn.date));
    }
    classifier.classify(&mut merged);
    merged
}
