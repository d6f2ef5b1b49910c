//! Fixed per-source field mapping tables.
//!
//! Each platform export is described once: how many preamble lines precede
//! the header, which encoding the file uses, which characters get scrubbed
//! from every cell, and which column header feeds each canonical field.
//! Headers are checked against the table when a file is opened, so a renamed
//! column fails the import instead of producing empty fields.

use anyhow::{bail, Result};
use csv::StringRecord;
use encoding_rs::{Encoding, GBK, UTF_8};
use ledgerflow_core::Source;

/// Canonical fields every adapter extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Kind,
    Amount,
    Counterparty,
    Description,
    PaymentMethod,
    Status,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Kind => "type",
            Field::Amount => "amount",
            Field::Counterparty => "counterparty",
            Field::Description => "description",
            Field::PaymentMethod => "payment_method",
            Field::Status => "status",
        }
    }
}

/// Static description of one platform's export layout
#[derive(Debug, Clone, Copy)]
pub struct SourceSchema {
    pub source: Source,
    /// Preamble lines before the header row
    pub skip_lines: usize,
    pub encoding: &'static Encoding,
    /// Characters removed from every cell (masking asterisks, stray tabs)
    pub strip_chars: &'static [char],
    /// Malformed rows are logged and dropped instead of failing the file
    pub tolerate_malformed: bool,
    columns: Columns<&'static str>,
}

/// One value per canonical field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns<T> {
    date: T,
    kind: T,
    amount: T,
    counterparty: T,
    description: T,
    payment_method: T,
    status: T,
}

impl<T: Copy> Columns<T> {
    fn get(&self, field: Field) -> T {
        match field {
            Field::Date => self.date,
            Field::Kind => self.kind,
            Field::Amount => self.amount,
            Field::Counterparty => self.counterparty,
            Field::Description => self.description,
            Field::PaymentMethod => self.payment_method,
            Field::Status => self.status,
        }
    }

    fn try_map<U>(&self, mut f: impl FnMut(Field, T) -> Result<U>) -> Result<Columns<U>> {
        Ok(Columns {
            date: f(Field::Date, self.date)?,
            kind: f(Field::Kind, self.kind)?,
            amount: f(Field::Amount, self.amount)?,
            counterparty: f(Field::Counterparty, self.counterparty)?,
            description: f(Field::Description, self.description)?,
            payment_method: f(Field::PaymentMethod, self.payment_method)?,
            status: f(Field::Status, self.status)?,
        })
    }
}

static ALIPAY: SourceSchema = SourceSchema {
    source: Source::Alipay,
    skip_lines: 24,
    encoding: GBK,
    strip_chars: &['*'],
    tolerate_malformed: false,
    columns: Columns {
        date: "交易时间",
        kind: "收/支",
        amount: "金额",
        counterparty: "交易对方",
        description: "商品说明",
        payment_method: "收/付款方式",
        status: "交易状态",
    },
};

static WECHAT: SourceSchema = SourceSchema {
    source: Source::WeChat,
    skip_lines: 16,
    encoding: UTF_8,
    strip_chars: &['*'],
    tolerate_malformed: false,
    columns: Columns {
        date: "交易时间",
        kind: "收/支",
        amount: "金额(元)",
        counterparty: "交易对方",
        description: "商品",
        payment_method: "支付方式",
        status: "当前状态",
    },
};

static JD: SourceSchema = SourceSchema {
    source: Source::Jd,
    skip_lines: 21,
    encoding: UTF_8,
    strip_chars: &['*', '\t'],
    tolerate_malformed: true,
    columns: Columns {
        date: "交易时间",
        kind: "收/支",
        amount: "金额",
        counterparty: "商户名称",
        description: "交易说明",
        payment_method: "收/付款方式",
        status: "交易状态",
    },
};

impl SourceSchema {
    pub fn for_source(source: Source) -> &'static SourceSchema {
        match source {
            Source::Alipay => &ALIPAY,
            Source::WeChat => &WECHAT,
            Source::Jd => &JD,
        }
    }

    /// Source column header that feeds `field`
    pub fn header_for(&self, field: Field) -> &'static str {
        self.columns.get(field)
    }

    pub fn scrub(&self, cell: &str) -> String {
        cell.chars()
            .filter(|c| !self.strip_chars.contains(c))
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Resolve column positions against an actual header row.
    ///
    /// Fails on the first canonical field whose header is missing.
    pub fn resolve(&self, headers: &StringRecord) -> Result<ColumnMap> {
        let cleaned: Vec<String> = headers.iter().map(|h| self.scrub(h)).collect();
        let indices = self.columns.try_map(|field, wanted| match cleaned.iter().position(|h| h == wanted) {
            Some(i) => Ok(i),
            None => bail!(
                "{} export is missing column '{}' (for {}); found: [{}]",
                self.source,
                wanted,
                field.name(),
                cleaned.join(", ")
            ),
        })?;
        Ok(ColumnMap {
            indices,
            width: cleaned.len(),
        })
    }
}

/// Column positions resolved from a validated header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: Columns<usize>,
    width: usize,
}

impl ColumnMap {
    pub fn index_of(&self, field: Field) -> usize {
        self.indices.get(field)
    }

    /// Number of columns in the header row
    pub fn width(&self) -> usize {
        self.width
    }
}
