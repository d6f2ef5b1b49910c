//! Platform-specific adapters from raw export rows to canonical transactions.

pub mod alipay;
pub mod jd;
pub mod wechat;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use ledgerflow_core::{Source, Transaction};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::reader::RawRow;

/// What to do with a JD amount cell that matches neither known form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmountPolicy {
    /// Keep the row with amount 0 (it is later excluded as zero-valued)
    #[default]
    Zero,
    /// Drop the row
    Skip,
    /// Abort the import
    Fail,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    #[serde(default)]
    pub jd_unparseable_amount: AmountPolicy,
}

/// Parse one export from any reader.
pub fn parse_export<R: Read>(source: Source, reader: R, opts: &IngestOptions) -> Result<Vec<Transaction>> {
    match source {
        Source::Alipay => alipay::parse_alipay(reader),
        Source::WeChat => wechat::parse_wechat(reader),
        Source::Jd => jd::parse_jd(reader, opts.jd_unparseable_amount),
    }
}

/// Parse one export file from disk.
pub fn parse_export_file(source: Source, path: impl AsRef<Path>, opts: &IngestOptions) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_export(source, file, opts).with_context(|| format!("parsing {} export {}", source, path.display()))
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

/// Parse a full timestamp in any of the layouts the platforms emit.
pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub(crate) fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Gross minus refund, rejecting refunds that would make the amount negative.
pub(crate) fn net_of_refund(gross: f64, refund: f64) -> Result<f64> {
    if refund > gross {
        bail!("refund {:.2} exceeds gross amount {:.2}", refund, gross);
    }
    Ok(gross - refund)
}

pub(crate) fn into_transaction(source: Source, row: RawRow, date: NaiveDateTime, amount: f64) -> Transaction {
    Transaction::new(
        source,
        date,
        row.kind,
        amount,
        row.counterparty,
        row.description,
        row.payment_method,
        row.status,
    )
}

/// Shared strict path for sources whose exports are assumed clean.
pub(crate) fn strict_date(source: Source, row: &RawRow) -> Result<NaiveDateTime> {
    parse_timestamp(&row.date)
        .with_context(|| format!("{} line {}: unparseable date '{}'", source, row.line, row.date))
}
