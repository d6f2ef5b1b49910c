//! Two-layer classifier: keyword rules, then the exclusion overlay.

use ledgerflow_core::Transaction;
use tracing::debug;

use crate::category_rules::{CategoryRules, RulePrecedence};
use crate::exclusion::{apply_exclusions, FamilyAccounts};

/// Immutable classification configuration, loaded once per run
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: CategoryRules,
    family: FamilyAccounts,
    precedence: RulePrecedence,
}

impl Classifier {
    pub fn new(rules: CategoryRules, family: FamilyAccounts, precedence: RulePrecedence) -> Self {
        Self {
            rules,
            family,
            precedence,
        }
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    /// Assign final categories in place.
    pub fn classify(&self, txns: &mut [Transaction]) {
        let matched = self.rules.apply(txns, self.precedence);
        let excluded = apply_exclusions(txns, &self.family);
        debug!(
            total = txns.len(),
            matched,
            excluded = excluded.values().sum::<usize>(),
            "classified transactions"
        );
        for (reason, count) in &excluded {
            debug!(?reason, count, "excluded");
        }
    }
}
