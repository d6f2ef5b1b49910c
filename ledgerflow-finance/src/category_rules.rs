//! Keyword rules mapping a transaction's `counterparty_description` key to a
//! spending category.
//!
//! Rules come from a plain text file, one `category:pattern` per line, where
//! the pattern is a regex searched anywhere in the key. File order matters:
//! with the default [`RulePrecedence::LastMatch`] a later matching rule
//! overwrites an earlier one, so broad patterns belong near the top and
//! specific ones near the bottom.

use anyhow::{bail, Context, Result};
use ledgerflow_core::Transaction;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How overlapping rules are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RulePrecedence {
    /// The last matching rule in file order wins
    #[default]
    LastMatch,
    /// The first matching rule in file order wins
    FirstMatch,
}

#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: String,
    pub pattern: Regex,
}

/// Ordered keyword rules
#[derive(Debug, Clone, Default)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading category rules {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing category rules {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for (i, line) in text.trim_start_matches('\u{feff}').lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((category, pattern)) = line.split_once(':') else {
                bail!("line {}: expected '<category>:<pattern>', got '{}'", i + 1, line);
            };
            let category = category.trim();
            if category.is_empty() {
                bail!("line {}: empty category name", i + 1);
            }
            // only the category is trimmed; spaces in a pattern are literal
            let pattern = Regex::new(pattern)
                .with_context(|| format!("line {}: invalid pattern for '{}'", i + 1, category))?;
            rules.push(CategoryRule {
                category: category.to_string(),
                pattern,
            });
        }
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn contains_category(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.category == name)
    }

    /// Category the rules assign to `key`, if any rule matches.
    pub fn categorize(&self, key: &str, precedence: RulePrecedence) -> Option<&str> {
        let mut matching = self.rules.iter().filter(|r| r.pattern.is_match(key));
        let hit = match precedence {
            RulePrecedence::FirstMatch => matching.next(),
            RulePrecedence::LastMatch => matching.last(),
        };
        hit.map(|r| r.category.as_str())
    }

    /// Keyword pass over a collection. Unmatched records keep their category.
    ///
    /// Returns how many records a rule claimed.
    pub fn apply(&self, txns: &mut [Transaction], precedence: RulePrecedence) -> usize {
        let mut matched = 0;
        for txn in txns.iter_mut() {
            if let Some(category) = self.categorize(&txn.detained(), precedence) {
                txn.category = category.to_string();
                matched += 1;
            }
        }
        matched
    }
}
