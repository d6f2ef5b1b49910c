//! ledgerflow-finance: keyword classification, exclusion overlay, dataset
//! merging, expense aggregation and report output.

pub mod aggregate;
pub mod category_rules;
pub mod classifier;
pub mod exclusion;
pub mod merge;
pub mod pipeline;
pub mod report;

pub use aggregate::{aggregate, AggregateOptions, Summary};
pub use category_rules::{CategoryRules, RulePrecedence};
pub use classifier::Classifier;
pub use exclusion::{ExclusionReason, FamilyAccounts};
pub use merge::{merge_sources, SourceBatches};
pub use pipeline::{read_batches, Analysis, Pipeline, PipelineConfig};
pub use report::{CsvReportSink, ReportSink};
