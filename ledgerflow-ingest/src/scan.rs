//! Directory scanning: every `*.csv` in a source's directory, concatenated.

use anyhow::{Context, Result};
use ledgerflow_core::{Source, Transaction};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::parsers::{parse_export_file, IngestOptions};

/// List `*.csv` files in `dir`, sorted by name.
pub fn list_exports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every export of `source` found in `dir`.
///
/// A missing directory is not an error: the source simply contributes nothing.
pub fn read_source_dir(dir: impl AsRef<Path>, source: Source, opts: &IngestOptions) -> Result<Vec<Transaction>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        warn!(source = %source, dir = %dir.display(), "input directory not found, skipping source");
        return Ok(Vec::new());
    }

    let mut all = Vec::new();
    for path in list_exports(dir)? {
        let txns = parse_export_file(source, &path, opts)?;
        debug!(source = %source, file = %path.display(), count = txns.len(), "parsed export");
        all.extend(txns);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn jd_export(row: &str) -> String {
        let mut text: String = (0..21).map(|i| format!("# {i}\n")).collect();
        text.push_str("交易时间,商户名称,交易说明,金额,收/付款方式,交易状态,收/支\n");
        text.push_str(row);
        text.push('\n');
        text
    }

    #[test]
    fn test_missing_dir_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let txns = read_source_dir(tmp.path().join("nope"), Source::Jd, &IngestOptions::default()).unwrap();
        assert!(txns.is_empty());
    }

    #[test]
    fn test_reads_only_csv_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.csv"), jd_export("2024-06-02 10:00:00,京东,鼠标,59.00,白条,交易成功,支出")).unwrap();
        fs::write(tmp.path().join("a.CSV"), jd_export("2024-06-01 10:00:00,京东,键盘,199.00,白条,交易成功,支出")).unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let files = list_exports(tmp.path()).unwrap();
        assert_eq!(files.len(), 2);

        let txns = read_source_dir(tmp.path(), Source::Jd, &IngestOptions::default()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "键盘");
        assert_eq!(txns[1].amount, 59.0);
    }
}
