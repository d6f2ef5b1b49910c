//! Report sinks consuming the classified records and their summary.

use anyhow::{Context, Result};
use ledgerflow_core::{Transaction, YearMonth};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::aggregate::Summary;

/// Label written next to group totals
pub const TOTAL_LABEL: &str = "总计";

pub trait ReportSink {
    fn write(&mut self, records: &[Transaction], summary: &Summary) -> Result<()>;
}

/// Writes a directory of CSV files:
/// `summary.csv`, one `month-YYYY-MM.csv` and `category-<name>.csv` per
/// group of non-ignored expenses, and `ignore.csv` for excluded records.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

#[derive(Serialize)]
struct RecordRow<'a> {
    date: String,
    month: String,
    #[serde(rename = "type")]
    kind: &'a str,
    amount: String,
    counterparty: &'a str,
    description: &'a str,
    payment_method: &'a str,
    status: &'a str,
    source: &'a str,
    category: &'a str,
}

impl<'a> From<&'a Transaction> for RecordRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            date: t.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            month: t.period().to_string(),
            kind: &t.kind,
            amount: format!("{:.2}", t.amount),
            counterparty: &t.counterparty,
            description: &t.description,
            payment_method: &t.payment_method,
            status: &t.status,
            source: t.source.label(),
            category: &t.category,
        }
    }
}

impl CsvReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files produced by the last `write`
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_summary(&mut self, summary: &Summary) -> Result<()> {
        let path = summary_path(&self.dir);
        let mut w = csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
        w.write_record(["Month", "Expense"])?;
        for (month, amount) in &summary.monthly {
            w.write_record([month.to_string(), format!("{amount:.2}")])?;
        }
        w.write_record(["", ""])?;
        w.write_record(["Category", "Expense"])?;
        for (category, amount) in summary.spending_categories() {
            w.write_record([category.to_string(), format!("{amount:.2}")])?;
        }
        w.flush()?;
        self.written.push(path);
        Ok(())
    }

    /// Path for `name` that no earlier file of this write has taken.
    ///
    /// Names that sanitize alike (`a/b`, `a_b`) get `-2`, `-3`, ... suffixes.
    fn unique_path(&self, name: &str) -> PathBuf {
        let stem = sanitize(name);
        let mut path = self.dir.join(format!("{stem}.csv"));
        let mut n = 2;
        while self.written.contains(&path) {
            path = self.dir.join(format!("{stem}-{n}.csv"));
            n += 1;
        }
        path
    }

    fn write_records(&mut self, name: &str, records: &[&Transaction], with_total: bool) -> Result<()> {
        let path = self.unique_path(name);
        let mut w = csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
        for t in records {
            w.serialize(RecordRow::from(*t))?;
        }
        if with_total {
            let total: f64 = records.iter().map(|t| t.amount).sum();
            let amount = format!("{total:.2}");
            w.write_record(["", "", TOTAL_LABEL, amount.as_str(), "", "", "", "", "", ""])?;
        }
        w.flush()?;
        self.written.push(path);
        Ok(())
    }
}

impl ReportSink for CsvReportSink {
    fn write(&mut self, records: &[Transaction], summary: &Summary) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {}", self.dir.display()))?;
        self.written.clear();
        self.write_summary(summary)?;

        let spending: Vec<&Transaction> = records.iter().filter(|t| t.is_expense() && !t.is_ignored()).collect();

        let mut by_month: BTreeMap<YearMonth, Vec<&Transaction>> = BTreeMap::new();
        let mut by_category: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for &t in &spending {
            by_month.entry(t.period()).or_default().push(t);
            by_category.entry(t.category.as_str()).or_default().push(t);
        }
        for (month, group) in &by_month {
            self.write_records(&format!("month-{month}"), group, true)?;
        }
        for (category, group) in &by_category {
            self.write_records(&format!("category-{category}"), group, true)?;
        }

        let ignored: Vec<&Transaction> = records.iter().filter(|t| t.is_ignored()).collect();
        if !ignored.is_empty() {
            self.write_records("ignore", &ignored, false)?;
        }

        info!(dir = %self.dir.display(), files = self.written.len(), "report written");
        Ok(())
    }
}

/// Keep file names portable
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect()
}

/// Output directory helper mirroring the sink's layout
pub fn summary_path(dir: &Path) -> PathBuf {
    dir.join("summary.csv")
}
