//! Expense aggregation: monthly, per-category and per-counterparty totals.

use ledgerflow_core::{Transaction, YearMonth, IGNORE_CATEGORY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scope applied uniformly to every aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    /// Count `ignore`-category expense records in the totals. When set, the
    /// monthly total includes them and `ignore` shows up as a category key.
    #[serde(default = "default_include_ignored")]
    pub include_ignored: bool,
}

fn default_include_ignored() -> bool {
    true
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            include_ignored: default_include_ignored(),
        }
    }
}

/// Summed expense amounts. Groups with no expenses are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub monthly: BTreeMap<YearMonth, f64>,
    pub by_category: BTreeMap<String, f64>,
    pub by_counterparty: BTreeMap<String, f64>,
}

impl Summary {
    /// Category totals without the `ignore` bucket, for presentation
    pub fn spending_categories(&self) -> impl Iterator<Item = (&str, f64)> {
        self.by_category
            .iter()
            .filter(|(k, _)| k.as_str() != IGNORE_CATEGORY)
            .map(|(k, v)| (k.as_str(), *v))
    }

    pub fn total(&self) -> f64 {
        self.monthly.values().sum()
    }

    /// Counterparties sorted by spend, largest first
    pub fn top_counterparties(&self, limit: usize) -> Vec<(&str, f64)> {
        let mut v: Vec<(&str, f64)> = self.by_counterparty.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        v.sort_by(|a, b| b.1.total_cmp(&a.1));
        v.truncate(limit);
        v
    }
}

/// Compute the three expense aggregates over a classified collection.
pub fn aggregate(txns: &[Transaction], opts: &AggregateOptions) -> Summary {
    let mut summary = Summary::default();

    let expenses = txns
        .iter()
        .filter(|t| t.amount != 0.0)
        .filter(|t| t.is_expense())
        .filter(|t| opts.include_ignored || !t.is_ignored());

    for txn in expenses {
        *summary.monthly.entry(txn.period()).or_insert(0.0) += txn.amount;
        *summary.by_category.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
        *summary.by_counterparty.entry(txn.counterparty.clone()).or_insert(0.0) += txn.amount;
    }

    summary
}
