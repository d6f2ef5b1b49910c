//! ledgerflow-ingest: platform export schemas, the shared export reader and
//! per-source adapters producing canonical transactions.

pub mod parsers;
pub mod reader;
pub mod scan;
pub mod schema;

pub use parsers::{parse_export, parse_export_file, AmountPolicy, IngestOptions};
pub use scan::read_source_dir;
pub use schema::{Field, SourceSchema};
