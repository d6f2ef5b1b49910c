//! Alipay CSV export parser
//!
//! Exports are GBK-encoded with a 24-line preamble, then:
//!   交易时间,交易分类,交易对方,对方账号,商品说明,收/支,金额,收/付款方式,交易状态,...
//!
//! Refunds are already settled into the exported amount.

use anyhow::{Context, Result};
use ledgerflow_core::{Source, Transaction};
use std::io::Read;

use crate::parsers::{into_transaction, parse_decimal, strict_date};
use crate::reader::read_export;
use crate::schema::SourceSchema;

pub fn parse_alipay<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let schema = SourceSchema::for_source(Source::Alipay);
    let rows = read_export(reader, schema)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let amount = parse_decimal(&row.amount)
            .filter(|a| *a >= 0.0)
            .with_context(|| format!("Alipay line {}: bad amount '{}'", row.line, row.amount))?;
        let date = strict_date(Source::Alipay, &row)?;
        out.push(into_transaction(Source::Alipay, row, date, amount));
    }
    Ok(out)
}
