//! WeChat Pay CSV export parser
//!
//! 16 preamble lines, then:
//!   交易时间,交易类型,交易对方,商品,收/支,金额(元),支付方式,当前状态,交易单号,商户单号,备注
//!
//! Amounts carry a currency prefix ("¥25.00"). Partial refunds stay on the
//! original row and are only visible in the status text, e.g. "已退款(￥20.00)".

use anyhow::{bail, Context, Result};
use ledgerflow_core::{Source, Transaction};
use regex::Regex;
use std::io::Read;

use crate::parsers::{into_transaction, net_of_refund, parse_decimal, strict_date};
use crate::reader::read_export;
use crate::schema::SourceSchema;

/// Status marker for a partial refund
pub const REFUND_MARKER: &str = "已退款";

const CURRENCY_PREFIXES: [char; 2] = ['¥', '￥'];

pub fn parse_wechat<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let schema = SourceSchema::for_source(Source::WeChat);
    let refund_re = Regex::new(r"[¥￥](\d+(?:\.\d+)?)")?;
    let rows = read_export(reader, schema)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let gross = parse_wechat_amount(&row.amount)
            .with_context(|| format!("WeChat line {}: bad amount '{}'", row.line, row.amount))?;
        let amount = adjust_for_refund(gross, &row.status, &refund_re)
            .with_context(|| format!("WeChat line {}", row.line))?;
        let date = strict_date(Source::WeChat, &row)?;
        out.push(into_transaction(Source::WeChat, row, date, amount));
    }
    Ok(out)
}

/// Strip the currency prefix and parse the rest.
pub fn parse_wechat_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_start_matches(CURRENCY_PREFIXES);
    parse_decimal(trimmed).filter(|a| *a >= 0.0)
}

/// Subtract the refunded amount named in `status`, if any.
///
/// Uses the first currency amount in the status text.
fn adjust_for_refund(gross: f64, status: &str, refund_re: &Regex) -> Result<f64> {
    if !status.contains(REFUND_MARKER) {
        return Ok(gross);
    }
    let Some(caps) = refund_re.captures(status) else {
        bail!("refund status '{}' carries no amount", status);
    };
    let refund: f64 = caps[1].parse()?;
    net_of_refund(gross, refund)
}
