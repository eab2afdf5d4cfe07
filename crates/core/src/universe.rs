//! Symbol universe loading.
//!
//! The universe is a static input: a text file with one symbol per line,
//! `#` comments allowed. Order is preserved and duplicates are dropped so a
//! symbol is attempted at most once per run.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Reads the symbol universe from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains no symbols.
pub fn load_universe(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read universe file {}", path.display()))?;

    let symbols = parse_universe(&contents);
    if symbols.is_empty() {
        bail!("universe file {} contains no symbols", path.display());
    }

    tracing::info!(
        file = %path.display(),
        count = symbols.len(),
        "Loaded symbol universe"
    );

    Ok(symbols)
}

/// Parses universe file contents: trims lines, skips blanks and `#` comments,
/// keeps first occurrence of each symbol.
#[must_use]
pub fn parse_universe(contents: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let contents = "# NIFTY constituents\nRELIANCE\n\n  TCS  \n# trailer\nINFY\n";
        assert_eq!(parse_universe(contents), vec!["RELIANCE", "TCS", "INFY"]);
    }

    #[test]
    fn test_parse_preserves_order_and_dedupes() {
        let contents = "AAA\nBBB\nAAA\nCCC\nBBB\n";
        assert_eq!(parse_universe(contents), vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HDFCBANK\nICICIBANK").unwrap();

        let symbols = load_universe(file.path()).unwrap();
        assert_eq!(symbols, vec!["HDFCBANK", "ICICIBANK"]);
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# only comments here").unwrap();

        assert!(load_universe(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_universe("no/such/universe.txt").is_err());
    }
}
