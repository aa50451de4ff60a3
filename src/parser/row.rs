//! Row mapper: one header/value pair → one canonical quarterly record.

use crate::models::{CompanyTicker, QuarterlyRecord};
use crate::normalize::{normalize_quarter, normalize_ticker, parse_billions, parse_percentage, parse_quarter};

/// Candidate header substrings per semantic field, tried in priority order.
/// First header containing (or equal to) a candidate wins; ties break by
/// header position.
const TICKER_KEYS: [&str; 4] = ["ticker", "symbol", "company", "stock"];
const QUARTER_KEYS: [&str; 3] = ["quarter", "period", "date"];
const REVENUE_KEYS: [&str; 2] = ["revenue", "total revenue"];
const NET_INCOME_KEYS: [&str; 3] = ["net income", "netincome", "profit"];
const GROSS_MARGIN_KEYS: [&str; 3] = ["gross margin", "grossmargin", "gm"];

/// Resolve a field's column index against already-lowercased headers.
fn resolve_header(headers: &[String], candidates: &[&str]) -> Option<usize> {
    for key in candidates {
        if let Some(idx) = headers.iter().position(|h| h.contains(key)) {
            return Some(idx);
        }
    }
    None
}

fn field<'a>(headers: &[String], values: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    let idx = resolve_header(headers, candidates)?;
    values.get(idx).map(String::as_str)
}

/// Map a single row to `(ticker, record)`, or reject it.
///
/// Ticker and quarter are mandatory: an unresolvable header or a value that
/// fails normalization rejects the row (a silent drop, not an error). The
/// three financial fields default to 0 when missing or unparseable.
pub fn map_row(headers: &[String], values: &[String]) -> Option<(CompanyTicker, QuarterlyRecord)> {
    let ticker = field(headers, values, &TICKER_KEYS).and_then(normalize_ticker)?;

    let quarter = field(headers, values, &QUARTER_KEYS).and_then(normalize_quarter)?;
    // The normalized label must re-match the canonical shape; 3-digit years
    // survive normalization but die here.
    let parts = parse_quarter(&quarter)?;

    let revenue = field(headers, values, &REVENUE_KEYS)
        .and_then(parse_billions)
        .unwrap_or(0.0);
    let net_income = field(headers, values, &NET_INCOME_KEYS)
        .and_then(parse_billions)
        .unwrap_or(0.0);
    let gross_margin = field(headers, values, &GROSS_MARGIN_KEYS)
        .and_then(parse_percentage)
        .unwrap_or(0.0);

    Some((
        ticker,
        QuarterlyRecord {
            quarter,
            year: parts.year,
            quarter_number: parts.quarter,
            revenue,
            net_income,
            gross_margin,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(h: &[&str]) -> Vec<String> {
        h.iter().map(|s| s.to_lowercase()).collect()
    }

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_map_basic_row() {
        let (ticker, record) = map_row(
            &headers(&["Ticker", "Quarter", "Revenue"]),
            &values(&["AAPL", "Q1 2024", "111.44"]),
        )
        .unwrap();

        assert_eq!(ticker, CompanyTicker::Aapl);
        assert_eq!(record.quarter, "Q1 2024");
        assert_eq!(record.year, 2024);
        assert_eq!(record.quarter_number, 1);
        assert_eq!(record.revenue, 111.44);
        assert_eq!(record.net_income, 0.0);
        assert_eq!(record.gross_margin, 0.0);
    }

    #[test]
    fn test_map_fuzzy_headers_and_units() {
        let (ticker, record) = map_row(
            &headers(&["Company Name", "Fiscal Period", "Total Revenue ($)", "Net Income", "GM %"]),
            &values(&["Microsoft", "3Q24", "$65,590,000,000", "24.67", "69.4%"]),
        )
        .unwrap();

        assert_eq!(ticker, CompanyTicker::Msft);
        assert_eq!(record.quarter, "Q3 2024");
        assert!((record.revenue - 65.59).abs() < 1e-9);
        assert_eq!(record.net_income, 24.67);
        assert_eq!(record.gross_margin, 69.4);
    }

    #[test]
    fn test_header_priority_first_candidate_wins() {
        // "quarter" outranks "date" even though date appears first.
        let (_, record) = map_row(
            &headers(&["Date", "Quarter", "Ticker", "Revenue"]),
            &values(&["2024-01-31", "Q1 2024", "AAPL", "119.58"]),
        )
        .unwrap();
        assert_eq!(record.quarter, "Q1 2024");
    }

    #[test]
    fn test_reject_bad_ticker_or_quarter() {
        let h = headers(&["Ticker", "Quarter", "Revenue"]);
        assert!(map_row(&h, &values(&["ZZZZ", "Q1 2024", "1.0"])).is_none());
        assert!(map_row(&h, &values(&["AAPL", "sometime", "1.0"])).is_none());
        // Missing quarter header entirely.
        assert!(map_row(
            &headers(&["Ticker", "Revenue"]),
            &values(&["AAPL", "1.0"])
        )
        .is_none());
        // 3-digit year survives normalization but fails the canonical re-check.
        assert!(map_row(&h, &values(&["AAPL", "Q1 202", "1.0"])).is_none());
    }

    #[test]
    fn test_financials_default_to_zero() {
        let (_, record) = map_row(
            &headers(&["Ticker", "Quarter", "Revenue", "Profit"]),
            &values(&["TSLA", "Q2 2024", "not-a-number", ""]),
        )
        .unwrap();
        assert_eq!(record.revenue, 0.0);
        assert_eq!(record.net_income, 0.0);
    }
}
