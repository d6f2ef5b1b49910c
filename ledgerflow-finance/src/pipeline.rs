//! End-to-end pipeline: load configuration once, then merge, classify and
//! aggregate any number of source batches.

use anyhow::{Context, Result};
use ledgerflow_core::{Source, Transaction};
use ledgerflow_ingest::{read_source_dir, IngestOptions};
use std::path::PathBuf;
use tracing::info;

use crate::aggregate::{aggregate, AggregateOptions, Summary};
use crate::category_rules::{CategoryRules, RulePrecedence};
use crate::classifier::Classifier;
use crate::exclusion::FamilyAccounts;
use crate::merge::{merge_sources, SourceBatches};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub rules_path: PathBuf,
    pub family_path: PathBuf,
    pub precedence: RulePrecedence,
    pub aggregate: AggregateOptions,
}

/// Classified records plus their aggregates
#[derive(Debug, Clone)]
pub struct Analysis {
    pub records: Vec<Transaction>,
    pub summary: Summary,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: Classifier,
    aggregate: AggregateOptions,
}

impl Pipeline {
    /// Read the rules and family files. Either missing is fatal.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        let rules = CategoryRules::load(&config.rules_path)?;
        let family = FamilyAccounts::load(&config.family_path)?;
        info!(rules = rules.len(), family = family.len(), "loaded classification config");
        Ok(Self::new(Classifier::new(rules, family, config.precedence), config.aggregate))
    }

    pub fn new(classifier: Classifier, aggregate: AggregateOptions) -> Self {
        Self { classifier, aggregate }
    }

    pub fn run(&self, batches: SourceBatches) -> Analysis {
        let records = merge_sources(batches, &self.classifier);
        let summary = aggregate(&records, &self.aggregate);
        info!(
            records = records.len(),
            ignored = records.iter().filter(|t| t.is_ignored()).count(),
            months = summary.monthly.len(),
            total = summary.total(),
            "analysis complete"
        );
        Analysis { records, summary }
    }
}

/// Scan each source's input directory into batches.
pub fn read_batches(dirs: &[(Source, PathBuf)], opts: &IngestOptions) -> Result<SourceBatches> {
    let mut batches = SourceBatches::new();
    for (source, dir) in dirs {
        let txns = read_source_dir(dir, *source, opts).with_context(|| format!("reading {} exports", source))?;
        info!(source = %source, count = txns.len(), "ingested");
        batches.push(*source, txns);
    }
    Ok(batches)
}
