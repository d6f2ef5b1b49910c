//! Shared export reader: decode, skip the preamble, validate the header and
//! hand back scrubbed rows keyed by canonical field.

use anyhow::{bail, Context, Result};
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::io::Read;
use tracing::{debug, warn};

use crate::schema::{ColumnMap, Field, SourceSchema};

/// One data row with every canonical field extracted and scrubbed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the original file
    pub line: u64,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub counterparty: String,
    pub description: String,
    pub payment_method: String,
    pub status: String,
}

/// Read a full export into raw rows according to `schema`.
pub fn read_export<R: Read>(reader: R, schema: &SourceSchema) -> Result<Vec<RawRow>> {
    let mut decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(schema.encoding))
        .build(reader);
    let mut text = String::new();
    decoded
        .read_to_string(&mut text)
        .with_context(|| format!("decoding {} export as {}", schema.source, schema.encoding.name()))?;

    let body = skip_lines(&text, schema.skip_lines).with_context(|| {
        format!(
            "{} export should have {} preamble lines before the header",
            schema.source, schema.skip_lines
        )
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = rdr.headers().context("reading header row")?.clone();
    let columns = schema.resolve(&headers)?;

    let line_offset = schema.skip_lines as u64;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if schema.tolerate_malformed => {
                warn!(source = %schema.source, error = %e, "skipping unreadable row");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("reading {} export", schema.source)),
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0) + line_offset;

        // blank trailer lines
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        if record.len() != columns.width() {
            if schema.tolerate_malformed {
                warn!(
                    source = %schema.source,
                    line,
                    expected = columns.width(),
                    found = record.len(),
                    "skipping malformed row"
                );
                continue;
            }
            bail!(
                "{} export line {}: expected {} columns, found {}",
                schema.source,
                line,
                columns.width(),
                record.len()
            );
        }

        rows.push(extract(&record, &columns, schema, line));
    }

    debug!(source = %schema.source, rows = rows.len(), "read export");
    Ok(rows)
}

fn extract(record: &csv::StringRecord, columns: &ColumnMap, schema: &SourceSchema, line: u64) -> RawRow {
    let cell = |field: Field| schema.scrub(record.get(columns.index_of(field)).unwrap_or(""));
    RawRow {
        line,
        date: cell(Field::Date),
        kind: cell(Field::Kind),
        amount: cell(Field::Amount),
        counterparty: cell(Field::Counterparty),
        description: cell(Field::Description),
        payment_method: cell(Field::PaymentMethod),
        status: cell(Field::Status),
    }
}

/// Return the text after the first `n` lines.
fn skip_lines(text: &str, n: usize) -> Result<&str> {
    let mut rest = text;
    for i in 0..n {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => bail!("file ends after {} lines", i),
        }
    }
    Ok(rest)
}
