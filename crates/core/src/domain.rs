//! Domain types shared across the workspace.
//!
//! A run produces two symbol-keyed collections: financial statement snapshots
//! scraped from the metrics source, and daily price series from the chart API.
//! Both are immutable once fetched and serialize into snapshot artifacts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The two external sources a run draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Financial statement tables (scraped).
    Financials,
    /// Historical daily OHLCV (chart API).
    Prices,
}

impl SourceKind {
    /// Short label used in logs and the run manifest.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Financials => "financials",
            SourceKind::Prices => "prices",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell of a scraped financial table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Numeric value; percent suffixes are stripped during parsing.
    Number(f64),
    /// Anything that did not parse as a number.
    Text(String),
    /// Blank cell.
    Empty,
}

impl Cell {
    /// Returns the numeric value, if this cell holds one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A single table: named columns and rows of cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    /// True if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One `<h2>`-delimited section of a company page and its tables
/// (e.g. "Profit & Loss", "Balance Sheet").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub header: String,
    pub tables: Vec<DataTable>,
}

/// Full financial statement snapshot for one symbol as of one fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub sections: Vec<Section>,
}

impl FinancialSnapshot {
    /// Total number of tables across all sections.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.sections.iter().map(|s| s.tables.len()).sum()
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Date-ordered daily price history for one symbol over the lookback window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// True if no bars were returned for the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// First and last bar dates, if any bars exist.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_source_kind_labels() {
        assert_eq!(SourceKind::Financials.as_str(), "financials");
        assert_eq!(SourceKind::Prices.as_str(), "prices");
        assert_eq!(format!("{}", SourceKind::Prices), "prices");
    }

    #[test]
    fn test_cell_as_number() {
        assert_eq!(Cell::Number(12.5).as_number(), Some(12.5));
        assert_eq!(Cell::Text("n/a".to_string()).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn test_table_count() {
        let snapshot = FinancialSnapshot {
            sections: vec![
                Section {
                    header: "Profit & Loss".to_string(),
                    tables: vec![DataTable::default(), DataTable::default()],
                },
                Section {
                    header: "Balance Sheet".to_string(),
                    tables: vec![DataTable::default()],
                },
            ],
        };
        assert_eq!(snapshot.table_count(), 3);
    }

    #[test]
    fn test_price_series_date_range() {
        let series = PriceSeries {
            bars: vec![bar(2020, 1, 2, 100.0), bar(2020, 1, 3, 101.0)],
        };
        let (first, last) = series.date_range().unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2020, 1, 3).unwrap());

        assert!(PriceSeries::default().date_range().is_none());
        assert!(PriceSeries::default().is_empty());
    }

    #[test]
    fn test_domain_types_json_round_trip() {
        let snapshot = FinancialSnapshot {
            sections: vec![Section {
                header: "Quarterly Results".to_string(),
                tables: vec![DataTable {
                    columns: vec!["Metric".to_string(), "Mar 2024".to_string()],
                    rows: vec![vec![
                        Cell::Text("Sales".to_string()),
                        Cell::Number(1234.5),
                    ]],
                }],
            }],
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: FinancialSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
