//! JD (京东) CSV export parser
//!
//! 21 preamble lines, then:
//!   交易时间,商户名称,交易说明,金额,收/付款方式,交易状态,收/支,交易分类,交易订单号,商家订单号,备注
//!
//! JD exports are the messiest of the three: cells are padded with tabs,
//! refunds are folded into the amount cell as "80.00(已退款30.00)", and the
//! date cell can carry trailing noise. Rows that cannot be dated are dropped.

use anyhow::{bail, Result};
use ledgerflow_core::{Source, Transaction};
use regex::Regex;
use std::io::Read;
use tracing::warn;

use crate::parsers::{into_transaction, net_of_refund, parse_timestamp, AmountPolicy};
use crate::reader::read_export;
use crate::schema::SourceSchema;

/// Compiled patterns for JD's amount and date cells
pub struct JdPatterns {
    amount: Regex,
    timestamp: Regex,
}

impl JdPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            amount: Regex::new(r"^(\d+(?:\.\d+)?)(?:\(已退款(\d+(?:\.\d+)?)\))?")?,
            timestamp: Regex::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}")?,
        })
    }

    /// Parse the amount cell.
    ///
    /// `"<gross>(已退款<refund>)"` yields `gross - refund`; a bare decimal is
    /// returned unchanged. Anything else, or a refund above the gross, is an
    /// error for the caller's [`AmountPolicy`] to settle.
    pub fn amount(&self, raw: &str) -> Result<f64> {
        let raw = raw.trim();
        let Some(caps) = self.amount.captures(raw) else {
            bail!("unparseable amount '{}'", raw);
        };
        let gross: f64 = caps[1].parse()?;
        match caps.get(2) {
            Some(refund) => net_of_refund(gross, refund.as_str().parse()?),
            None => Ok(gross),
        }
    }

    /// First `YYYY-MM-DD HH:MM:SS` substring of the cell
    pub fn timestamp<'a>(&self, raw: &'a str) -> Option<&'a str> {
        self.timestamp.find(raw).map(|m| m.as_str())
    }
}

pub fn parse_jd<R: Read>(reader: R, policy: AmountPolicy) -> Result<Vec<Transaction>> {
    let schema = SourceSchema::for_source(Source::Jd);
    let patterns = JdPatterns::new()?;
    let rows = read_export(reader, schema)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let date = match patterns.timestamp(&row.date).and_then(parse_timestamp) {
            Some(d) => d,
            None => {
                warn!(line = row.line, date = %row.date, counterparty = %row.counterparty, "JD row has invalid date, dropping");
                continue;
            }
        };

        let amount = match patterns.amount(&row.amount) {
            Ok(a) => a,
            Err(e) => match policy {
                AmountPolicy::Zero => {
                    warn!(line = row.line, error = %e, "JD amount unusable, treating as 0");
                    0.0
                }
                AmountPolicy::Skip => {
                    warn!(line = row.line, error = %e, "JD amount unusable, dropping");
                    continue;
                }
                AmountPolicy::Fail => bail!("JD line {}: {}", row.line, e),
            },
        };

        out.push(into_transaction(Source::Jd, row, date, amount));
    }
    Ok(out)
}
