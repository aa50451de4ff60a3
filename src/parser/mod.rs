//! Tabular parser: reduces both source encodings (delimited text and the
//! structured visualization table) to the row mapper, then groups accepted
//! rows into per-company series.

pub mod row;

use crate::error::ParseError;
use crate::models::{CompanySeries, CompanyTicker, GvizTable, QuarterlyRecord};
use tracing::debug;

use self::row::map_row;

/// Parse delimited text with a header line into company series.
///
/// Blank lines are discarded. The header line is split on plain commas; data
/// lines go through the quote-aware splitter. Individual malformed rows are
/// dropped; the parse as a whole fails only when fewer than two non-blank
/// lines remain.
pub fn parse_delimited(text: &str) -> Result<Vec<CompanySeries>, ParseError> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(ParseError::NoDataRows);
    }

    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut grouped = Grouper::default();
    for line in &lines[1..] {
        let values = split_quoted_line(line);
        if let Some((ticker, record)) = map_row(&headers, &values) {
            grouped.push(ticker, record);
        }
    }

    Ok(grouped.finish())
}

/// Parse a structured table response (column labels + nullable typed cells)
/// through the same row-mapping contract.
pub fn parse_table(table: &GvizTable) -> Vec<CompanySeries> {
    let headers: Vec<String> = table.cols.iter().map(|c| c.label.to_lowercase()).collect();

    let mut grouped = Grouper::default();
    for row in &table.rows {
        let values: Vec<String> = row
            .c
            .iter()
            .map(|cell| {
                cell.as_ref()
                    .and_then(|c| c.v.as_ref())
                    .map(|v| v.to_text())
                    .unwrap_or_default()
            })
            .collect();

        if let Some((ticker, record)) = map_row(&headers, &values) {
            grouped.push(ticker, record);
        }
    }

    grouped.finish()
}

/// Split one data line on commas, except inside double-quoted spans.
/// Quote state is a simple toggle; escaped quotes are not supported.
fn split_quoted_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    values.push(current.trim().to_string());
    values
}

/// Accumulates accepted rows per ticker, preserving first-seen company order.
/// A duplicate (year, quarter) within one company is replaced — last parsed
/// wins.
#[derive(Default)]
struct Grouper {
    series: Vec<CompanySeries>,
}

impl Grouper {
    fn push(&mut self, ticker: CompanyTicker, record: QuarterlyRecord) {
        let idx = match self.series.iter().position(|s| s.ticker == ticker) {
            Some(i) => i,
            None => {
                self.series.push(CompanySeries {
                    ticker,
                    records: Vec::new(),
                });
                self.series.len() - 1
            }
        };
        let entry = &mut self.series[idx];

        if let Some(existing) = entry
            .records
            .iter_mut()
            .find(|r| r.year == record.year && r.quarter_number == record.quarter_number)
        {
            *existing = record;
        } else {
            entry.records.push(record);
        }
    }

    /// Sort each series ascending by (year, quarter number) and hand it over.
    fn finish(mut self) -> Vec<CompanySeries> {
        for series in &mut self.series {
            series
                .records
                .sort_by(|a, b| a.year.cmp(&b.year).then(a.quarter_number.cmp(&b.quarter_number)));
            debug!("{}: {} quarters", series.ticker, series.records.len());
        }
        self.series
    }
}
