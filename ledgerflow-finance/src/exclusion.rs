//! Exclusion overlay: forces records that are not real spending to `ignore`.
//!
//! Runs after the keyword pass. Each condition is checked independently and
//! can only set `ignore`, never clear it.

use anyhow::{Context, Result};
use ledgerflow_core::{Source, Transaction, IGNORE_CATEGORY};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// WeChat description marker for payments that settle a JD order
pub const JD_ORDER_MARKER: &str = "京东-订单编号";
const NOT_COUNTED_KIND: &str = "不计收支";
const PLACEHOLDER_KIND: &str = "/";
const EXCLUDED_STATUSES: [&str; 3] = ["交易关闭", "对方已退还", "已全额退款"];

/// Counterparties treated as internal transfers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyAccounts {
    names: HashSet<String>,
}

impl FamilyAccounts {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading family accounts {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let names = text
            .trim_start_matches('\u{feff}')
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Self { names }
    }

    pub fn contains(&self, counterparty: &str) -> bool {
        self.names.contains(counterparty)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Exclusion conditions, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExclusionReason {
    /// WeChat leg of a JD purchase, counted under JD instead
    JdOrderPassThrough,
    /// Direction label says the record does not count
    NotCounted,
    /// Closed, fully refunded, or returned by the counterparty
    ClosedOrRefunded,
    ZeroAmount,
    FamilyTransfer,
}

impl ExclusionReason {
    pub const ALL: [ExclusionReason; 5] = [
        ExclusionReason::JdOrderPassThrough,
        ExclusionReason::NotCounted,
        ExclusionReason::ClosedOrRefunded,
        ExclusionReason::ZeroAmount,
        ExclusionReason::FamilyTransfer,
    ];

    pub fn applies(&self, txn: &Transaction, family: &FamilyAccounts) -> bool {
        match self {
            ExclusionReason::JdOrderPassThrough => {
                txn.source == Source::WeChat && txn.description.contains(JD_ORDER_MARKER)
            }
            ExclusionReason::NotCounted => txn.kind.contains(NOT_COUNTED_KIND) || txn.kind == PLACEHOLDER_KIND,
            ExclusionReason::ClosedOrRefunded => EXCLUDED_STATUSES.iter().any(|s| txn.status.contains(s)),
            ExclusionReason::ZeroAmount => txn.amount == 0.0,
            ExclusionReason::FamilyTransfer => family.contains(&txn.counterparty),
        }
    }
}

/// First condition that excludes `txn`, if any
pub fn exclusion_reason(txn: &Transaction, family: &FamilyAccounts) -> Option<ExclusionReason> {
    ExclusionReason::ALL.into_iter().find(|r| r.applies(txn, family))
}

/// Apply the overlay, returning how many records each reason caught first.
pub fn apply_exclusions(txns: &mut [Transaction], family: &FamilyAccounts) -> BTreeMap<ExclusionReason, usize> {
    let mut counts = BTreeMap::new();
    for txn in txns.iter_mut() {
        if let Some(reason) = exclusion_reason(txn, family) {
            txn.category = IGNORE_CATEGORY.to_string();
            *counts.entry(reason).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerflow_core::DEFAULT_CATEGORY;

    fn txn(source: Source, kind: &str, amount: f64, counterparty: &str, description: &str, status: &str) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let mut t = Transaction::new(source, date, kind, amount, counterparty, description, "零钱", status);
        t.category = "餐饮".into();
        t
    }

    #[test]
    fn test_jd_marker_only_on_wechat() {
        let family = FamilyAccounts::default();
        let wechat = txn(Source::WeChat, "支出", 10.0, "京东", "京东-订单编号123", "支付成功");
        let alipay = txn(Source::Alipay, "支出", 10.0, "京东", "京东-订单编号123", "交易成功");
        assert_eq!(exclusion_reason(&wechat, &family), Some(ExclusionReason::JdOrderPassThrough));
        assert_eq!(exclusion_reason(&alipay, &family), None);
    }

    #[test]
    fn test_not_counted_kinds() {
        let family = FamilyAccounts::default();
        let neutral = txn(Source::Alipay, "不计收支", 10.0, "余额宝", "收益", "交易成功");
        let slash = txn(Source::WeChat, "/", 10.0, "零钱通", "转入", "支付成功");
        let slashy = txn(Source::WeChat, "/支出", 10.0, "某店", "x", "支付成功");
        assert!(ExclusionReason::NotCounted.applies(&neutral, &family));
        assert!(ExclusionReason::NotCounted.applies(&slash, &family));
        assert!(!ExclusionReason::NotCounted.applies(&slashy, &family));
    }

    #[test]
    fn test_status_and_zero_amount() {
        let family = FamilyAccounts::default();
        for status in ["交易关闭", "对方已退还", "已全额退款"] {
            let t = txn(Source::WeChat, "支出", 10.0, "店", "货", status);
            assert_eq!(exclusion_reason(&t, &family), Some(ExclusionReason::ClosedOrRefunded));
        }
        let zero = txn(Source::Jd, "支出", 0.0, "店", "货", "交易成功");
        assert_eq!(exclusion_reason(&zero, &family), Some(ExclusionReason::ZeroAmount));
    }

    #[test]
    fn test_family_list_parsing_and_match() {
        let family = FamilyAccounts::parse("\u{feff}妈妈\n\n  爸爸  \n");
        assert_eq!(family.len(), 2);
        let t = txn(Source::Alipay, "支出", 500.0, "爸爸", "生活费", "交易成功");
        assert_eq!(exclusion_reason(&t, &family), Some(ExclusionReason::FamilyTransfer));
        // exact match only
        let partial = txn(Source::Alipay, "支出", 500.0, "爸爸的店", "生活费", "交易成功");
        assert_eq!(exclusion_reason(&partial, &family), None);
    }

    #[test]
    fn test_apply_is_monotonic() {
        let family = FamilyAccounts::parse("妈妈");
        let mut txns = vec![
            txn(Source::Alipay, "支出", 0.0, "妈妈", "x", "交易关闭"),
            txn(Source::Alipay, "支出", 10.0, "店", "x", "交易成功"),
        ];
        txns[0].category = IGNORE_CATEGORY.into();
        let counts = apply_exclusions(&mut txns, &family);
        assert!(txns[0].is_ignored());
        assert_eq!(txns[1].category, "餐饮");
        assert_eq!(counts.get(&ExclusionReason::ClosedOrRefunded), Some(&1));

        // a second pass never clears anything
        apply_exclusions(&mut txns, &FamilyAccounts::default());
        assert!(txns[0].is_ignored());
        assert_ne!(txns[1].category, DEFAULT_CATEGORY);
    }
}
