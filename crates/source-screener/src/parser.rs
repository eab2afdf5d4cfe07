//! Company-page parsing.
//!
//! A company page is a sequence of `<h2>`-headed sections ("Quarterly
//! Results", "Profit & Loss", ...), each containing zero or more HTML tables.
//! The parser walks sibling elements between consecutive headers, lifts every
//! table into a [`DataTable`], and keeps cell text that does not read as a
//! number. Layout knowledge stays behind the [`FinancialPageParser`] seam so
//! the adapter never touches markup directly.

use equity_snap_core::domain::{Cell, DataTable, FinancialSnapshot, Section};
use equity_snap_core::traits::FinancialPageParser;
use scraper::{ElementRef, Html, Selector};

/// Parser for the financial-metrics company page layout.
pub struct ScreenerPageParser {
    header_sel: Selector,
    table_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
}

impl ScreenerPageParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            header_sel: Selector::parse("h2").expect("valid selector"),
            table_sel: Selector::parse("table").expect("valid selector"),
            row_sel: Selector::parse("tr").expect("valid selector"),
            cell_sel: Selector::parse("th, td").expect("valid selector"),
        }
    }

    /// Collects every table between `header` and the next `<h2>`.
    fn section_tables(&self, header: ElementRef<'_>) -> Vec<DataTable> {
        let mut tables = Vec::new();

        let mut node = header.next_sibling();
        while let Some(current) = node {
            if let Some(element) = ElementRef::wrap(current) {
                if element.value().name() == "h2" {
                    break;
                }
                if element.value().name() == "table" {
                    tables.push(self.parse_table(element));
                } else {
                    for table in element.select(&self.table_sel) {
                        tables.push(self.parse_table(table));
                    }
                }
            }
            node = current.next_sibling();
        }

        tables
    }

    fn parse_table(&self, table: ElementRef<'_>) -> DataTable {
        let mut rows = table.select(&self.row_sel);

        let columns = rows
            .next()
            .map(|first| {
                first
                    .select(&self.cell_sel)
                    .map(|cell| element_text(cell))
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows
            .map(|row| {
                row.select(&self.cell_sel)
                    .map(|cell| parse_cell(&element_text(cell)))
                    .collect()
            })
            .collect();

        DataTable { columns, rows }
    }
}

impl Default for ScreenerPageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialPageParser for ScreenerPageParser {
    fn parse(&self, body: &str) -> Result<FinancialSnapshot, String> {
        let document = Html::parse_document(body);

        let sections: Vec<Section> = document
            .select(&self.header_sel)
            .map(|header| Section {
                header: element_text(header),
                tables: self.section_tables(header),
            })
            .collect();

        if sections.is_empty() {
            return Err("no recognizable sections in page".to_string());
        }

        Ok(FinancialSnapshot { sections })
    }
}

/// Concatenated, whitespace-normalized text content of an element.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Interprets one cell: numbers may carry thousands separators and a percent
/// suffix; `NaN` and blanks are empty.
fn parse_cell(text: &str) -> Cell {
    let text = text.trim();
    if text.is_empty() || text == "NaN" {
        return Cell::Empty;
    }

    let cleaned = text.trim_end_matches('%').replace(',', "");
    match cleaned.trim().parse::<f64>() {
        Ok(number) => Cell::Number(number),
        Err(_) => Cell::Text(text.to_string()),
    }
}
