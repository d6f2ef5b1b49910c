//! Canonical transaction record shared by every source adapter

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::period::YearMonth;

/// Category every record starts with until a keyword rule claims it
pub const DEFAULT_CATEGORY: &str = "其他";

/// Reserved category for records excluded from spending analysis
pub const IGNORE_CATEGORY: &str = "ignore";

/// Direction label the platforms use for outgoing money
pub const EXPENSE_KIND: &str = "支出";

/// Separator between counterparty and description in the matching key
pub const DETAINED_SEPARATOR: &str = "_";

/// Payment platform a record was exported from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    #[serde(rename = "Alipay")]
    Alipay,
    #[serde(rename = "WeChat")]
    WeChat,
    #[serde(rename = "JD")]
    Jd,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Alipay, Source::WeChat, Source::Jd];

    pub fn label(&self) -> &'static str {
        match self {
            Source::Alipay => "Alipay",
            Source::WeChat => "WeChat",
            Source::Jd => "JD",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized record after source-specific parsing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Transaction timestamp (day + time)
    pub date: NaiveDateTime,
    /// Direction label as given by the platform ("支出", "收入", "不计收支", "/")
    pub kind: String,
    /// Non-negative, refund-adjusted amount
    pub amount: f64,
    pub counterparty: String,
    pub description: String,
    pub payment_method: String,
    pub status: String,
    pub source: Source,
    /// Classification tag; starts as [`DEFAULT_CATEGORY`]
    pub category: String,
    /// Period key, filled in when datasets are merged
    pub month: Option<YearMonth>,
}

impl Transaction {
    /// Create a record with the default category and no period key yet
    pub fn new(
        source: Source,
        date: NaiveDateTime,
        kind: impl Into<String>,
        amount: f64,
        counterparty: impl Into<String>,
        description: impl Into<String>,
        payment_method: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            date,
            kind: kind.into(),
            amount,
            counterparty: counterparty.into(),
            description: description.into(),
            payment_method: payment_method.into(),
            status: status.into(),
            source,
            category: DEFAULT_CATEGORY.to_string(),
            month: None,
        }
    }

    /// Composite matching key used by keyword rules: `counterparty_description`
    pub fn detained(&self) -> String {
        format!("{}{}{}", self.counterparty, DETAINED_SEPARATOR, self.description)
    }

    /// Period key, derived from the date when the merger has not stamped one
    pub fn period(&self) -> YearMonth {
        self.month.unwrap_or_else(|| YearMonth::from(self.date))
    }

    pub fn is_expense(&self) -> bool {
        self.kind == EXPENSE_KIND
    }

    pub fn is_ignored(&self) -> bool {
        self.category == IGNORE_CATEGORY
    }
}
