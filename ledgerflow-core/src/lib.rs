//! ledgerflow-core: canonical transaction types shared by ingestion and analysis

pub mod period;
pub mod transaction;

pub use period::YearMonth;
pub use transaction::{
    Source, Transaction, DEFAULT_CATEGORY, DETAINED_SEPARATOR, EXPENSE_KIND, IGNORE_CATEGORY,
};
